//! Outbound event names and the wire envelope.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::room::EntityKind;

/// What happened to a field, independent of which entity it belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldChange {
    /// Display name changed.
    Renamed,
    /// A member was added.
    MemberAdded,
    /// A member was removed.
    MemberRemoved,
    /// Leader (or owner) assigned.
    LeaderSet,
    /// Any other column changed.
    Updated,
}

/// Every event the hub can publish.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventName {
    /// `workspace_renamed`
    WorkspaceRenamed,
    /// `workspace_member_added`
    WorkspaceMemberAdded,
    /// `workspace_member_removed`
    WorkspaceMemberRemoved,
    /// `team_renamed`
    TeamRenamed,
    /// `team_member_added`
    TeamMemberAdded,
    /// `team_member_removed`
    TeamMemberRemoved,
    /// `team_leader_set`
    TeamLeaderSet,
    /// `project_renamed`
    ProjectRenamed,
    /// `project_member_added`
    ProjectMemberAdded,
    /// `project_member_removed`
    ProjectMemberRemoved,
    /// `project_leader_set`
    ProjectLeaderSet,
    /// `project_updated`
    ProjectUpdated,
    /// `issue_updated`
    IssueUpdated,
    /// `view_updated`
    ViewUpdated,
}

impl EventName {
    /// Map `(entity, change)` to the event that announces it.
    ///
    /// Returns `None` for combinations the entity does not support, e.g. a
    /// workspace has no leader. Issues and views collapse every change into
    /// their single `*_updated` event.
    pub fn derive(kind: EntityKind, change: FieldChange) -> Option<Self> {
        use EntityKind as K;
        use FieldChange as C;
        let name = match (kind, change) {
            (K::Workspace, C::Renamed) => Self::WorkspaceRenamed,
            (K::Workspace, C::MemberAdded) => Self::WorkspaceMemberAdded,
            (K::Workspace, C::MemberRemoved) => Self::WorkspaceMemberRemoved,
            (K::Team, C::Renamed) => Self::TeamRenamed,
            (K::Team, C::MemberAdded) => Self::TeamMemberAdded,
            (K::Team, C::MemberRemoved) => Self::TeamMemberRemoved,
            (K::Team, C::LeaderSet) => Self::TeamLeaderSet,
            (K::Project, C::Renamed) => Self::ProjectRenamed,
            (K::Project, C::MemberAdded) => Self::ProjectMemberAdded,
            (K::Project, C::MemberRemoved) => Self::ProjectMemberRemoved,
            (K::Project, C::LeaderSet) => Self::ProjectLeaderSet,
            (K::Project, C::Updated) => Self::ProjectUpdated,
            (K::Issue, _) => Self::IssueUpdated,
            (K::View, C::Renamed | C::Updated) => Self::ViewUpdated,
            _ => return None,
        };
        Some(name)
    }

    /// Wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::WorkspaceRenamed => "workspace_renamed",
            Self::WorkspaceMemberAdded => "workspace_member_added",
            Self::WorkspaceMemberRemoved => "workspace_member_removed",
            Self::TeamRenamed => "team_renamed",
            Self::TeamMemberAdded => "team_member_added",
            Self::TeamMemberRemoved => "team_member_removed",
            Self::TeamLeaderSet => "team_leader_set",
            Self::ProjectRenamed => "project_renamed",
            Self::ProjectMemberAdded => "project_member_added",
            Self::ProjectMemberRemoved => "project_member_removed",
            Self::ProjectLeaderSet => "project_leader_set",
            Self::ProjectUpdated => "project_updated",
            Self::IssueUpdated => "issue_updated",
            Self::ViewUpdated => "view_updated",
        }
    }
}

impl fmt::Display for EventName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outbound frame: `{"type": <event>, "data": <payload>}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// Event name.
    #[serde(rename = "type")]
    pub event: EventName,
    /// Event-specific payload.
    pub data: Value,
}

impl Envelope {
    /// Wrap a payload.
    pub fn new(event: EventName, data: Value) -> Self {
        Self { event, data }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
