//! The persistence port consumed by the mutation handlers and the view
//! materializer.
//!
//! Each method is one independent unit of work. Nothing here spans a
//! transaction across calls; a handler that issues three calls may see the
//! first succeed and the second fail.

use async_trait::async_trait;
use nakuma_core::{
    Dimension, IssueField, IssueId, ProjectField, ProjectId, TeamId, UserId, ViewId, WorkspaceId,
};

use crate::errors::Result;

/// Async persistence port.
///
/// Updates that address a row which does not exist return
/// [`StoreError::NotFound`](crate::StoreError::NotFound).
#[async_trait]
pub trait Store: Send + Sync {
    // ── workspace ───────────────────────────────────────────────────────

    /// Set a workspace's display name.
    async fn rename_workspace(&self, id: &WorkspaceId, name: &str) -> Result<()>;
    /// Add a member. Adding an existing member is a no-op success.
    async fn add_workspace_member(&self, id: &WorkspaceId, user: &UserId) -> Result<()>;
    /// Remove a member. Fails with `NotFound` if the user was not a member.
    async fn remove_workspace_member(&self, id: &WorkspaceId, user: &UserId) -> Result<()>;

    // ── team ────────────────────────────────────────────────────────────

    /// Set a team's display name.
    async fn rename_team(&self, id: &TeamId, name: &str) -> Result<()>;
    /// Add a member.
    async fn add_team_member(&self, id: &TeamId, user: &UserId) -> Result<()>;
    /// Remove a member, clearing the leader slot if it held this user.
    async fn remove_team_member(&self, id: &TeamId, user: &UserId) -> Result<()>;
    /// Make `user` the team leader.
    async fn set_team_leader(&self, id: &TeamId, user: &UserId) -> Result<()>;

    // ── project ─────────────────────────────────────────────────────────

    /// Set a project's display name.
    async fn rename_project(&self, id: &ProjectId, name: &str) -> Result<()>;
    /// Make `user` the project leader.
    async fn set_project_leader(&self, id: &ProjectId, user: &UserId) -> Result<()>;
    /// Add a member.
    async fn add_project_member(&self, id: &ProjectId, user: &UserId) -> Result<()>;
    /// Remove a member.
    async fn remove_project_member(&self, id: &ProjectId, user: &UserId) -> Result<()>;
    /// Overwrite one generic project column.
    async fn set_project_field(&self, id: &ProjectId, field: ProjectField, value: &str)
    -> Result<()>;

    // ── issue ───────────────────────────────────────────────────────────

    /// Overwrite one issue column.
    async fn set_issue_field(&self, id: &IssueId, field: IssueField, value: &str) -> Result<()>;
    /// Add an assignee.
    async fn add_issue_assignee(&self, id: &IssueId, user: &UserId) -> Result<()>;

    // ── view ────────────────────────────────────────────────────────────

    /// Set a view's display name.
    async fn rename_view(&self, id: &ViewId, name: &str) -> Result<()>;
    /// Point a view at a team.
    async fn set_view_team(&self, id: &ViewId, team: &TeamId) -> Result<()>;
    /// Team a view lists issues from.
    async fn view_team(&self, id: &ViewId) -> Result<TeamId>;
    /// Delete every persisted group-by row of a view.
    async fn clear_view_group_bys(&self, id: &ViewId) -> Result<()>;
    /// Delete every membership row of a view.
    async fn clear_view_issues(&self, id: &ViewId) -> Result<()>;
    /// Persist one group-by at `position` (0-based).
    async fn add_view_group_by(&self, id: &ViewId, dimension: Dimension, position: usize)
    -> Result<()>;
    /// Attach an issue to a view. Attaching twice is a no-op success.
    async fn attach_issue_to_view(&self, id: &ViewId, issue: &IssueId) -> Result<()>;

    // ── materializer queries ────────────────────────────────────────────

    /// Distinct value tuples for `dimensions` over the team's issues, in
    /// dimension order. `None` marks an issue without a value.
    ///
    /// With no dimensions the result is a single empty tuple when the team
    /// has any issues, and empty otherwise.
    async fn group_combinations(
        &self,
        team: &TeamId,
        dimensions: &[Dimension],
    ) -> Result<Vec<Vec<Option<String>>>>;

    /// Team issues whose columns equal every `(dimension, value)` pair.
    async fn issues_matching(
        &self,
        team: &TeamId,
        filter: &[(Dimension, String)],
    ) -> Result<Vec<IssueId>>;
}
