//! View repository: `views`, their ordered `view_group_bys`, and the
//! materialized `view_issues` membership.

use nakuma_core::Dimension;
use rusqlite::{Connection, OptionalExtension, params};

use super::{require_change, strings};
use crate::errors::{Result, StoreError};

/// Row in `views`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ViewRow {
    /// View ID.
    pub id: String,
    /// Team the view lists issues from.
    pub team_id: Option<String>,
    /// Display name.
    pub name: String,
}

/// View repository.
pub struct ViewRepo;

impl ViewRepo {
    /// Insert a view.
    pub fn create(conn: &Connection, id: &str, team_id: Option<&str>, name: &str) -> Result<()> {
        let _ = conn.execute(
            "INSERT INTO views (id, team_id, name) VALUES (?1, ?2, ?3)",
            params![id, team_id, name],
        )?;
        Ok(())
    }

    /// Fetch by ID.
    pub fn get(conn: &Connection, id: &str) -> Result<Option<ViewRow>> {
        let row = conn
            .query_row(
                "SELECT id, team_id, name FROM views WHERE id = ?1",
                params![id],
                |row| {
                    Ok(ViewRow {
                        id: row.get(0)?,
                        team_id: row.get(1)?,
                        name: row.get(2)?,
                    })
                },
            )
            .optional()?;
        Ok(row)
    }

    /// Set the display name.
    pub fn rename(conn: &Connection, id: &str, name: &str) -> Result<()> {
        let changed = conn.execute("UPDATE views SET name = ?1 WHERE id = ?2", params![name, id])?;
        require_change(changed, "view", id)
    }

    /// Point the view at a team.
    pub fn set_team(conn: &Connection, id: &str, team_id: &str) -> Result<()> {
        let changed = conn.execute(
            "UPDATE views SET team_id = ?1 WHERE id = ?2",
            params![team_id, id],
        )?;
        require_change(changed, "view", id)
    }

    /// Team of a view. Missing view or unset team are both `NotFound`.
    pub fn team(conn: &Connection, id: &str) -> Result<String> {
        let team: Option<Option<String>> = conn
            .query_row(
                "SELECT team_id FROM views WHERE id = ?1",
                params![id],
                |row| row.get(0),
            )
            .optional()?;
        match team {
            Some(Some(team)) => Ok(team),
            Some(None) => Err(StoreError::not_found("view team", id)),
            None => Err(StoreError::not_found("view", id)),
        }
    }

    /// Delete all group-by rows.
    pub fn clear_group_bys(conn: &Connection, id: &str) -> Result<()> {
        let _ = conn.execute("DELETE FROM view_group_bys WHERE view_id = ?1", params![id])?;
        Ok(())
    }

    /// Delete all membership rows.
    pub fn clear_issues(conn: &Connection, id: &str) -> Result<()> {
        let _ = conn.execute("DELETE FROM view_issues WHERE view_id = ?1", params![id])?;
        Ok(())
    }

    /// Persist one group-by at `position`.
    pub fn add_group_by(conn: &Connection, id: &str, dimension: Dimension, position: usize) -> Result<()> {
        let position = i64::try_from(position)
            .map_err(|_| StoreError::Internal(format!("group-by position out of range: {position}")))?;
        let _ = conn.execute(
            "INSERT INTO view_group_bys (view_id, position, dimension) VALUES (?1, ?2, ?3)",
            params![id, position, dimension.column()],
        )?;
        Ok(())
    }

    /// Ordered group-by names.
    pub fn group_bys(conn: &Connection, id: &str) -> Result<Vec<String>> {
        strings(
            conn,
            "SELECT dimension FROM view_group_bys WHERE view_id = ?1 ORDER BY position",
            params![id],
        )
    }

    /// Attach an issue; duplicates are ignored.
    pub fn attach_issue(conn: &Connection, id: &str, issue_id: &str) -> Result<()> {
        let _ = conn.execute(
            "INSERT OR IGNORE INTO view_issues (view_id, issue_id) VALUES (?1, ?2)",
            params![id, issue_id],
        )?;
        Ok(())
    }

    /// Member issue IDs, sorted.
    pub fn issues(conn: &Connection, id: &str) -> Result<Vec<String>> {
        strings(
            conn,
            "SELECT issue_id FROM view_issues WHERE view_id = ?1 ORDER BY issue_id",
            params![id],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sqlite::repositories::IssueRepo;
    use crate::sqlite::repositories::test_db::seeded;
    use assert_matches::assert_matches;

    #[test]
    fn group_bys_keep_their_order() {
        let conn = seeded();
        ViewRepo::create(&conn, "v", Some("t"), "Board").unwrap();
        ViewRepo::add_group_by(&conn, "v", Dimension::Priority, 0).unwrap();
        ViewRepo::add_group_by(&conn, "v", Dimension::Status, 1).unwrap();
        assert_eq!(ViewRepo::group_bys(&conn, "v").unwrap(), vec!["priority", "status"]);

        ViewRepo::clear_group_bys(&conn, "v").unwrap();
        assert!(ViewRepo::group_bys(&conn, "v").unwrap().is_empty());
    }

    #[test]
    fn attach_is_idempotent_and_clear_empties() {
        let conn = seeded();
        ViewRepo::create(&conn, "v", Some("t"), "Board").unwrap();
        IssueRepo::create(&conn, "i1", "t", "a").unwrap();
        ViewRepo::attach_issue(&conn, "v", "i1").unwrap();
        ViewRepo::attach_issue(&conn, "v", "i1").unwrap();
        assert_eq!(ViewRepo::issues(&conn, "v").unwrap(), vec!["i1"]);

        ViewRepo::clear_issues(&conn, "v").unwrap();
        assert!(ViewRepo::issues(&conn, "v").unwrap().is_empty());
    }

    #[test]
    fn team_lookup_distinguishes_missing_view_from_unset_team() {
        let conn = seeded();
        ViewRepo::create(&conn, "v", None, "Loose").unwrap();
        assert_matches!(
            ViewRepo::team(&conn, "v"),
            Err(StoreError::NotFound { kind: "view team", .. })
        );
        assert_matches!(
            ViewRepo::team(&conn, "ghost"),
            Err(StoreError::NotFound { kind: "view", .. })
        );
        ViewRepo::set_team(&conn, "v", "t").unwrap();
        assert_eq!(ViewRepo::team(&conn, "v").unwrap(), "t");
    }
}
