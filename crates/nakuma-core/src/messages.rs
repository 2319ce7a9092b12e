//! Sparse partial-update messages, one per entity kind.
//!
//! Every field is optional so that a frame missing its entity ID still
//! decodes; the handler turns that case into a validation failure instead of
//! a protocol error. Empty strings count as absent (see [`present`]).

use serde::{Deserialize, Serialize};

/// Treat `Some("")` like `None`.
pub fn present(value: Option<&String>) -> Option<&str> {
    value.map(String::as_str).filter(|s| !s.is_empty())
}

/// Edit of a workspace.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditWorkspace {
    /// Target workspace.
    pub workspace_id: Option<String>,
    /// New display name.
    pub name: Option<String>,
    /// User to add as member.
    pub add_member: Option<String>,
    /// User to remove from members.
    pub remove_member: Option<String>,
}

/// Edit of a team.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditTeam {
    /// Target team.
    pub team_id: Option<String>,
    /// New display name.
    pub name: Option<String>,
    /// User to add as member.
    pub add_member: Option<String>,
    /// User to remove; clears the leader slot when it held this user.
    pub remove_member: Option<String>,
    /// User to make leader.
    pub leader: Option<String>,
}

/// Edit of a project.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
#[allow(missing_docs)]
pub struct EditProject {
    /// Target project.
    pub id: Option<String>,
    pub name: Option<String>,
    pub leader_id: Option<String>,
    pub workspace_id: Option<String>,
    pub add_member: Option<String>,
    pub remove_member: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub label: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// Edit of an issue. Every field maps to `issue_updated`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
#[allow(missing_docs)]
pub struct EditIssue {
    pub id: Option<String>,
    pub title: Option<String>,
    pub status: Option<String>,
    pub team_id: Option<String>,
    pub owner_id: Option<String>,
    pub assignee: Option<String>,
    pub priority: Option<String>,
    pub content: Option<String>,
    pub project_id: Option<String>,
    pub label: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// Edit of a saved view.
///
/// A present `group_bys` (even an empty one) triggers a full
/// rematerialization of the view's issue membership.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditView {
    /// Target view.
    pub id: Option<String>,
    /// New display name.
    pub name: Option<String>,
    /// Team whose issues the view lists.
    pub team_id: Option<String>,
    /// Ordered group-by dimension names.
    pub group_bys: Option<Vec<String>>,
}
