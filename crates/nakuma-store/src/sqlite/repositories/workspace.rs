//! Workspace repository: `workspaces` and `workspace_members`.

use rusqlite::{Connection, OptionalExtension, params};

use super::{require_change, strings};
use crate::errors::Result;

/// Row in `workspaces`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WorkspaceRow {
    /// Workspace ID.
    pub id: String,
    /// Display name.
    pub name: String,
}

/// Workspace repository.
pub struct WorkspaceRepo;

impl WorkspaceRepo {
    /// Insert a workspace.
    pub fn create(conn: &Connection, id: &str, name: &str) -> Result<()> {
        let _ = conn.execute(
            "INSERT INTO workspaces (id, name) VALUES (?1, ?2)",
            params![id, name],
        )?;
        Ok(())
    }

    /// Fetch by ID.
    pub fn get(conn: &Connection, id: &str) -> Result<Option<WorkspaceRow>> {
        let row = conn
            .query_row(
                "SELECT id, name FROM workspaces WHERE id = ?1",
                params![id],
                |row| {
                    Ok(WorkspaceRow {
                        id: row.get(0)?,
                        name: row.get(1)?,
                    })
                },
            )
            .optional()?;
        Ok(row)
    }

    /// Set the display name.
    pub fn rename(conn: &Connection, id: &str, name: &str) -> Result<()> {
        let changed = conn.execute(
            "UPDATE workspaces SET name = ?1 WHERE id = ?2",
            params![name, id],
        )?;
        require_change(changed, "workspace", id)
    }

    /// Add a member; existing membership is left alone.
    pub fn add_member(conn: &Connection, id: &str, user: &str) -> Result<()> {
        let _ = conn.execute(
            "INSERT OR IGNORE INTO workspace_members (workspace_id, user_id) VALUES (?1, ?2)",
            params![id, user],
        )?;
        Ok(())
    }

    /// Remove a member.
    pub fn remove_member(conn: &Connection, id: &str, user: &str) -> Result<()> {
        let changed = conn.execute(
            "DELETE FROM workspace_members WHERE workspace_id = ?1 AND user_id = ?2",
            params![id, user],
        )?;
        require_change(changed, "workspace member", &format!("{id}/{user}"))
    }

    /// Member user IDs, sorted.
    pub fn members(conn: &Connection, id: &str) -> Result<Vec<String>> {
        strings(
            conn,
            "SELECT user_id FROM workspace_members WHERE workspace_id = ?1 ORDER BY user_id",
            params![id],
        )
    }
}
