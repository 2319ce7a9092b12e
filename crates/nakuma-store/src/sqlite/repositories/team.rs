//! Team repository: `teams` and `team_members`.

use rusqlite::{Connection, OptionalExtension, params};

use super::{require_change, strings};
use crate::errors::Result;

/// Row in `teams`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TeamRow {
    /// Team ID.
    pub id: String,
    /// Owning workspace.
    pub workspace_id: String,
    /// Display name.
    pub name: String,
    /// Current leader, if any.
    pub leader_id: Option<String>,
}

/// Team repository.
pub struct TeamRepo;

impl TeamRepo {
    /// Insert a team.
    pub fn create(conn: &Connection, id: &str, workspace_id: &str, name: &str) -> Result<()> {
        let _ = conn.execute(
            "INSERT INTO teams (id, workspace_id, name) VALUES (?1, ?2, ?3)",
            params![id, workspace_id, name],
        )?;
        Ok(())
    }

    /// Fetch by ID.
    pub fn get(conn: &Connection, id: &str) -> Result<Option<TeamRow>> {
        let row = conn
            .query_row(
                "SELECT id, workspace_id, name, leader_id FROM teams WHERE id = ?1",
                params![id],
                |row| {
                    Ok(TeamRow {
                        id: row.get(0)?,
                        workspace_id: row.get(1)?,
                        name: row.get(2)?,
                        leader_id: row.get(3)?,
                    })
                },
            )
            .optional()?;
        Ok(row)
    }

    /// Set the display name.
    pub fn rename(conn: &Connection, id: &str, name: &str) -> Result<()> {
        let changed = conn.execute("UPDATE teams SET name = ?1 WHERE id = ?2", params![name, id])?;
        require_change(changed, "team", id)
    }

    /// Assign the leader.
    pub fn set_leader(conn: &Connection, id: &str, user: &str) -> Result<()> {
        let changed = conn.execute(
            "UPDATE teams SET leader_id = ?1 WHERE id = ?2",
            params![user, id],
        )?;
        require_change(changed, "team", id)
    }

    /// Add a member; existing membership is left alone.
    pub fn add_member(conn: &Connection, id: &str, user: &str) -> Result<()> {
        let _ = conn.execute(
            "INSERT OR IGNORE INTO team_members (team_id, user_id) VALUES (?1, ?2)",
            params![id, user],
        )?;
        Ok(())
    }

    /// Remove a member and, atomically, vacate the leader slot if they held it.
    pub fn remove_member(conn: &Connection, id: &str, user: &str) -> Result<()> {
        let tx = conn.unchecked_transaction()?;
        let changed = tx.execute(
            "DELETE FROM team_members WHERE team_id = ?1 AND user_id = ?2",
            params![id, user],
        )?;
        require_change(changed, "team member", &format!("{id}/{user}"))?;
        let _ = tx.execute(
            "UPDATE teams SET leader_id = NULL WHERE id = ?1 AND leader_id = ?2",
            params![id, user],
        )?;
        tx.commit()?;
        Ok(())
    }

    /// Member user IDs, sorted.
    pub fn members(conn: &Connection, id: &str) -> Result<Vec<String>> {
        strings(
            conn,
            "SELECT user_id FROM team_members WHERE team_id = ?1 ORDER BY user_id",
            params![id],
        )
    }
}
