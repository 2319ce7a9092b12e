//! Project repository: `projects` and `project_members`.

use nakuma_core::ProjectField;
use rusqlite::{Connection, OptionalExtension, params};

use super::{require_change, strings};
use crate::errors::Result;

/// Row in `projects`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[allow(missing_docs)]
pub struct ProjectRow {
    pub id: String,
    pub workspace_id: String,
    pub name: String,
    pub leader_id: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub label: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// Project repository.
pub struct ProjectRepo;

impl ProjectRepo {
    /// Insert a project.
    pub fn create(conn: &Connection, id: &str, workspace_id: &str, name: &str) -> Result<()> {
        let _ = conn.execute(
            "INSERT INTO projects (id, workspace_id, name) VALUES (?1, ?2, ?3)",
            params![id, workspace_id, name],
        )?;
        Ok(())
    }

    /// Fetch by ID.
    pub fn get(conn: &Connection, id: &str) -> Result<Option<ProjectRow>> {
        let row = conn
            .query_row(
                "SELECT id, workspace_id, name, leader_id, status, priority, label,
                        start_date, end_date
                 FROM projects WHERE id = ?1",
                params![id],
                |row| {
                    Ok(ProjectRow {
                        id: row.get(0)?,
                        workspace_id: row.get(1)?,
                        name: row.get(2)?,
                        leader_id: row.get(3)?,
                        status: row.get(4)?,
                        priority: row.get(5)?,
                        label: row.get(6)?,
                        start_date: row.get(7)?,
                        end_date: row.get(8)?,
                    })
                },
            )
            .optional()?;
        Ok(row)
    }

    /// Set the display name.
    pub fn rename(conn: &Connection, id: &str, name: &str) -> Result<()> {
        Self::set_column(conn, id, "name", name)
    }

    /// Assign the leader.
    pub fn set_leader(conn: &Connection, id: &str, user: &str) -> Result<()> {
        Self::set_column(conn, id, "leader_id", user)
    }

    /// Overwrite one generic column.
    pub fn set_field(conn: &Connection, id: &str, field: ProjectField, value: &str) -> Result<()> {
        Self::set_column(conn, id, field.column(), value)
    }

    // `column` is always one of the fixed names above.
    fn set_column(conn: &Connection, id: &str, column: &str, value: &str) -> Result<()> {
        let changed = conn.execute(
            &format!("UPDATE projects SET {column} = ?1 WHERE id = ?2"),
            params![value, id],
        )?;
        require_change(changed, "project", id)
    }

    /// Add a member; existing membership is left alone.
    pub fn add_member(conn: &Connection, id: &str, user: &str) -> Result<()> {
        let _ = conn.execute(
            "INSERT OR IGNORE INTO project_members (project_id, user_id) VALUES (?1, ?2)",
            params![id, user],
        )?;
        Ok(())
    }

    /// Remove a member.
    pub fn remove_member(conn: &Connection, id: &str, user: &str) -> Result<()> {
        let changed = conn.execute(
            "DELETE FROM project_members WHERE project_id = ?1 AND user_id = ?2",
            params![id, user],
        )?;
        require_change(changed, "project member", &format!("{id}/{user}"))
    }

    /// Member user IDs, sorted.
    pub fn members(conn: &Connection, id: &str) -> Result<Vec<String>> {
        strings(
            conn,
            "SELECT user_id FROM project_members WHERE project_id = ?1 ORDER BY user_id",
            params![id],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::StoreError;
    use crate::sqlite::repositories::test_db::seeded;
    use assert_matches::assert_matches;

    #[test]
    fn generic_fields_land_in_their_columns() {
        let conn = seeded();
        ProjectRepo::create(&conn, "p", "ws", "Launch").unwrap();
        ProjectRepo::set_field(&conn, "p", ProjectField::Status, "active").unwrap();
        ProjectRepo::set_field(&conn, "p", ProjectField::EndDate, "2025-01-31").unwrap();
        ProjectRepo::set_leader(&conn, "p", "carol").unwrap();

        let p = ProjectRepo::get(&conn, "p").unwrap().unwrap();
        assert_eq!(p.status.as_deref(), Some("active"));
        assert_eq!(p.end_date.as_deref(), Some("2025-01-31"));
        assert_eq!(p.leader_id.as_deref(), Some("carol"));
        assert_eq!(p.priority, None);
    }

    #[test]
    fn moving_to_unknown_workspace_fails() {
        let conn = seeded();
        ProjectRepo::create(&conn, "p", "ws", "Launch").unwrap();
        assert_matches!(
            ProjectRepo::set_field(&conn, "p", ProjectField::WorkspaceId, "ghost"),
            Err(StoreError::Sqlite(_))
        );
    }

    #[test]
    fn members_round_trip() {
        let conn = seeded();
        ProjectRepo::create(&conn, "p", "ws", "Launch").unwrap();
        ProjectRepo::add_member(&conn, "p", "b").unwrap();
        ProjectRepo::add_member(&conn, "p", "a").unwrap();
        assert_eq!(ProjectRepo::members(&conn, "p").unwrap(), vec!["a", "b"]);
        ProjectRepo::remove_member(&conn, "p", "a").unwrap();
        assert_eq!(ProjectRepo::members(&conn, "p").unwrap(), vec!["b"]);
    }

    #[test]
    fn rename_missing_is_not_found() {
        let conn = seeded();
        assert_matches!(
            ProjectRepo::rename(&conn, "nope", "x"),
            Err(StoreError::NotFound { kind: "project", .. })
        );
    }
}
