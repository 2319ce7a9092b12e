//! [`SqliteStore`]: the pooled `SQLite` implementation of [`Store`].

use async_trait::async_trait;
use nakuma_core::{
    Dimension, IssueField, IssueId, ProjectField, ProjectId, TeamId, UserId, ViewId, WorkspaceId,
};
use rusqlite::Connection;
use tokio::task;

use super::connection::ConnectionPool;
use super::migrations::run_migrations;
use super::repositories::{IssueRepo, ProjectRepo, TeamRepo, ViewRepo, WorkspaceRepo};
use crate::errors::{Result, StoreError};
use crate::port::Store;

/// Pooled `SQLite` store.
#[derive(Clone)]
pub struct SqliteStore {
    pool: ConnectionPool,
}

impl SqliteStore {
    /// Wrap a pool. Call [`SqliteStore::migrate`] before serving traffic.
    pub fn new(pool: ConnectionPool) -> Self {
        Self { pool }
    }

    /// The underlying pool, for seeding and inspection.
    pub fn pool(&self) -> &ConnectionPool {
        &self.pool
    }

    /// Apply pending schema migrations. Returns how many ran.
    pub fn migrate(&self) -> Result<u32> {
        let conn = self.pool.get()?;
        run_migrations(&conn)
    }

    async fn with_conn<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
    {
        let pool = self.pool.clone();
        task::spawn_blocking(move || {
            let conn = pool.get()?;
            f(&conn)
        })
        .await
        .map_err(|e| StoreError::Internal(format!("blocking task failed: {e}")))?
    }
}

#[async_trait]
impl Store for SqliteStore {
    async fn rename_workspace(&self, id: &WorkspaceId, name: &str) -> Result<()> {
        let (id, name) = (id.clone(), name.to_owned());
        self.with_conn(move |c| WorkspaceRepo::rename(c, id.as_str(), &name)).await
    }

    async fn add_workspace_member(&self, id: &WorkspaceId, user: &UserId) -> Result<()> {
        let (id, user) = (id.clone(), user.clone());
        self.with_conn(move |c| WorkspaceRepo::add_member(c, id.as_str(), user.as_str()))
            .await
    }

    async fn remove_workspace_member(&self, id: &WorkspaceId, user: &UserId) -> Result<()> {
        let (id, user) = (id.clone(), user.clone());
        self.with_conn(move |c| WorkspaceRepo::remove_member(c, id.as_str(), user.as_str()))
            .await
    }

    async fn rename_team(&self, id: &TeamId, name: &str) -> Result<()> {
        let (id, name) = (id.clone(), name.to_owned());
        self.with_conn(move |c| TeamRepo::rename(c, id.as_str(), &name)).await
    }

    async fn add_team_member(&self, id: &TeamId, user: &UserId) -> Result<()> {
        let (id, user) = (id.clone(), user.clone());
        self.with_conn(move |c| TeamRepo::add_member(c, id.as_str(), user.as_str()))
            .await
    }

    async fn remove_team_member(&self, id: &TeamId, user: &UserId) -> Result<()> {
        let (id, user) = (id.clone(), user.clone());
        self.with_conn(move |c| TeamRepo::remove_member(c, id.as_str(), user.as_str()))
            .await
    }

    async fn set_team_leader(&self, id: &TeamId, user: &UserId) -> Result<()> {
        let (id, user) = (id.clone(), user.clone());
        self.with_conn(move |c| TeamRepo::set_leader(c, id.as_str(), user.as_str()))
            .await
    }

    async fn rename_project(&self, id: &ProjectId, name: &str) -> Result<()> {
        let (id, name) = (id.clone(), name.to_owned());
        self.with_conn(move |c| ProjectRepo::rename(c, id.as_str(), &name)).await
    }

    async fn set_project_leader(&self, id: &ProjectId, user: &UserId) -> Result<()> {
        let (id, user) = (id.clone(), user.clone());
        self.with_conn(move |c| ProjectRepo::set_leader(c, id.as_str(), user.as_str()))
            .await
    }

    async fn add_project_member(&self, id: &ProjectId, user: &UserId) -> Result<()> {
        let (id, user) = (id.clone(), user.clone());
        self.with_conn(move |c| ProjectRepo::add_member(c, id.as_str(), user.as_str()))
            .await
    }

    async fn remove_project_member(&self, id: &ProjectId, user: &UserId) -> Result<()> {
        let (id, user) = (id.clone(), user.clone());
        self.with_conn(move |c| ProjectRepo::remove_member(c, id.as_str(), user.as_str()))
            .await
    }

    async fn set_project_field(
        &self,
        id: &ProjectId,
        field: ProjectField,
        value: &str,
    ) -> Result<()> {
        let (id, value) = (id.clone(), value.to_owned());
        self.with_conn(move |c| ProjectRepo::set_field(c, id.as_str(), field, &value))
            .await
    }

    async fn set_issue_field(&self, id: &IssueId, field: IssueField, value: &str) -> Result<()> {
        let (id, value) = (id.clone(), value.to_owned());
        self.with_conn(move |c| IssueRepo::set_field(c, id.as_str(), field, &value))
            .await
    }

    async fn add_issue_assignee(&self, id: &IssueId, user: &UserId) -> Result<()> {
        let (id, user) = (id.clone(), user.clone());
        self.with_conn(move |c| IssueRepo::add_assignee(c, id.as_str(), user.as_str()))
            .await
    }

    async fn rename_view(&self, id: &ViewId, name: &str) -> Result<()> {
        let (id, name) = (id.clone(), name.to_owned());
        self.with_conn(move |c| ViewRepo::rename(c, id.as_str(), &name)).await
    }

    async fn set_view_team(&self, id: &ViewId, team: &TeamId) -> Result<()> {
        let (id, team) = (id.clone(), team.clone());
        self.with_conn(move |c| ViewRepo::set_team(c, id.as_str(), team.as_str()))
            .await
    }

    async fn view_team(&self, id: &ViewId) -> Result<TeamId> {
        let id = id.clone();
        self.with_conn(move |c| ViewRepo::team(c, id.as_str()).map(TeamId::from))
            .await
    }

    async fn clear_view_group_bys(&self, id: &ViewId) -> Result<()> {
        let id = id.clone();
        self.with_conn(move |c| ViewRepo::clear_group_bys(c, id.as_str())).await
    }

    async fn clear_view_issues(&self, id: &ViewId) -> Result<()> {
        let id = id.clone();
        self.with_conn(move |c| ViewRepo::clear_issues(c, id.as_str())).await
    }

    async fn add_view_group_by(
        &self,
        id: &ViewId,
        dimension: Dimension,
        position: usize,
    ) -> Result<()> {
        let id = id.clone();
        self.with_conn(move |c| ViewRepo::add_group_by(c, id.as_str(), dimension, position))
            .await
    }

    async fn attach_issue_to_view(&self, id: &ViewId, issue: &IssueId) -> Result<()> {
        let (id, issue) = (id.clone(), issue.clone());
        self.with_conn(move |c| ViewRepo::attach_issue(c, id.as_str(), issue.as_str()))
            .await
    }

    async fn group_combinations(
        &self,
        team: &TeamId,
        dimensions: &[Dimension],
    ) -> Result<Vec<Vec<Option<String>>>> {
        let (team, dims) = (team.clone(), dimensions.to_vec());
        self.with_conn(move |c| IssueRepo::group_combinations(c, team.as_str(), &dims))
            .await
    }

    async fn issues_matching(
        &self,
        team: &TeamId,
        filter: &[(Dimension, String)],
    ) -> Result<Vec<IssueId>> {
        let (team, filter) = (team.clone(), filter.to_vec());
        self.with_conn(move |c| {
            let ids = IssueRepo::matching(c, team.as_str(), &filter)?;
            Ok(ids.into_iter().map(IssueId::from).collect())
        })
        .await
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
