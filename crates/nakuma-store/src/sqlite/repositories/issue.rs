//! Issue repository: `issues` and `issue_assignees`, plus the grouping
//! queries views are materialized from.

use nakuma_core::{Dimension, IssueField};
use rusqlite::{Connection, OptionalExtension, params, params_from_iter};

use super::{require_change, strings};
use crate::errors::Result;

/// Row in `issues`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[allow(missing_docs)]
pub struct IssueRow {
    pub id: String,
    pub team_id: String,
    pub project_id: Option<String>,
    pub title: String,
    pub content: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub label: Option<String>,
    pub owner_id: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// Issue repository.
pub struct IssueRepo;

impl IssueRepo {
    /// Insert an issue with only its required columns.
    pub fn create(conn: &Connection, id: &str, team_id: &str, title: &str) -> Result<()> {
        let _ = conn.execute(
            "INSERT INTO issues (id, team_id, title) VALUES (?1, ?2, ?3)",
            params![id, team_id, title],
        )?;
        Ok(())
    }

    /// Fetch by ID.
    pub fn get(conn: &Connection, id: &str) -> Result<Option<IssueRow>> {
        let row = conn
            .query_row(
                "SELECT id, team_id, project_id, title, content, status, priority, label,
                        owner_id, start_date, end_date
                 FROM issues WHERE id = ?1",
                params![id],
                |row| {
                    Ok(IssueRow {
                        id: row.get(0)?,
                        team_id: row.get(1)?,
                        project_id: row.get(2)?,
                        title: row.get(3)?,
                        content: row.get(4)?,
                        status: row.get(5)?,
                        priority: row.get(6)?,
                        label: row.get(7)?,
                        owner_id: row.get(8)?,
                        start_date: row.get(9)?,
                        end_date: row.get(10)?,
                    })
                },
            )
            .optional()?;
        Ok(row)
    }

    /// Overwrite one column.
    pub fn set_field(conn: &Connection, id: &str, field: IssueField, value: &str) -> Result<()> {
        let changed = conn.execute(
            &format!("UPDATE issues SET {} = ?1 WHERE id = ?2", field.column()),
            params![value, id],
        )?;
        require_change(changed, "issue", id)
    }

    /// Add an assignee; an existing assignment is left alone.
    pub fn add_assignee(conn: &Connection, id: &str, user: &str) -> Result<()> {
        let _ = conn.execute(
            "INSERT OR IGNORE INTO issue_assignees (issue_id, user_id) VALUES (?1, ?2)",
            params![id, user],
        )?;
        Ok(())
    }

    /// Assignee user IDs, sorted.
    pub fn assignees(conn: &Connection, id: &str) -> Result<Vec<String>> {
        strings(
            conn,
            "SELECT user_id FROM issue_assignees WHERE issue_id = ?1 ORDER BY user_id",
            params![id],
        )
    }

    /// Distinct value tuples of `dims` across the team's issues.
    pub fn group_combinations(
        conn: &Connection,
        team_id: &str,
        dims: &[Dimension],
    ) -> Result<Vec<Vec<Option<String>>>> {
        if dims.is_empty() {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM issues WHERE team_id = ?1",
                params![team_id],
                |row| row.get(0),
            )?;
            return Ok(if count > 0 { vec![Vec::new()] } else { Vec::new() });
        }

        let cols = dims.iter().map(|d| d.column()).collect::<Vec<_>>().join(", ");
        let sql = format!(
            "SELECT {cols} FROM issues WHERE team_id = ?1 GROUP BY {cols} ORDER BY {cols}"
        );
        let mut stmt = conn.prepare(&sql)?;
        let width = dims.len();
        let rows = stmt
            .query_map(params![team_id], |row| {
                (0..width)
                    .map(|i| row.get::<_, Option<String>>(i))
                    .collect::<rusqlite::Result<Vec<_>>>()
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    /// Team issues whose columns equal every `(dimension, value)` pair.
    pub fn matching(
        conn: &Connection,
        team_id: &str,
        filter: &[(Dimension, String)],
    ) -> Result<Vec<String>> {
        let mut sql = String::from("SELECT id FROM issues WHERE team_id = ?1");
        for (i, (dim, _)) in filter.iter().enumerate() {
            sql.push_str(&format!(" AND {} = ?{}", dim.column(), i + 2));
        }
        sql.push_str(" ORDER BY id");
        let values = std::iter::once(team_id).chain(filter.iter().map(|(_, v)| v.as_str()));
        strings(conn, &sql, params_from_iter(values))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::StoreError;
    use crate::sqlite::repositories::TeamRepo;
    use crate::sqlite::repositories::test_db::seeded;
    use assert_matches::assert_matches;

    fn issue(conn: &Connection, id: &str, status: Option<&str>, priority: Option<&str>) {
        IssueRepo::create(conn, id, "t", id).unwrap();
        if let Some(s) = status {
            IssueRepo::set_field(conn, id, IssueField::Status, s).unwrap();
        }
        if let Some(p) = priority {
            IssueRepo::set_field(conn, id, IssueField::Priority, p).unwrap();
        }
    }

    #[test]
    fn set_field_and_assignees() {
        let conn = seeded();
        issue(&conn, "i1", None, None);
        IssueRepo::set_field(&conn, "i1", IssueField::Title, "Fix login").unwrap();
        IssueRepo::set_field(&conn, "i1", IssueField::OwnerId, "dave").unwrap();
        IssueRepo::add_assignee(&conn, "i1", "erin").unwrap();
        IssueRepo::add_assignee(&conn, "i1", "erin").unwrap();

        let row = IssueRepo::get(&conn, "i1").unwrap().unwrap();
        assert_eq!(row.title, "Fix login");
        assert_eq!(row.owner_id.as_deref(), Some("dave"));
        assert_eq!(IssueRepo::assignees(&conn, "i1").unwrap(), vec!["erin"]);
    }

    #[test]
    fn set_field_on_missing_issue_is_not_found() {
        let conn = seeded();
        assert_matches!(
            IssueRepo::set_field(&conn, "ghost", IssueField::Label, "bug"),
            Err(StoreError::NotFound { kind: "issue", .. })
        );
    }

    #[test]
    fn combinations_include_null_marker() {
        let conn = seeded();
        issue(&conn, "i1", Some("open"), Some("high"));
        issue(&conn, "i2", Some("open"), Some("high"));
        issue(&conn, "i3", Some("done"), None);

        let combos =
            IssueRepo::group_combinations(&conn, "t", &[Dimension::Status, Dimension::Priority])
                .unwrap();
        assert_eq!(
            combos,
            vec![
                vec![Some("done".to_owned()), None],
                vec![Some("open".to_owned()), Some("high".to_owned())],
            ]
        );
    }

    #[test]
    fn combinations_without_dimensions() {
        let conn = seeded();
        assert!(IssueRepo::group_combinations(&conn, "t", &[]).unwrap().is_empty());
        issue(&conn, "i1", None, None);
        assert_eq!(
            IssueRepo::group_combinations(&conn, "t", &[]).unwrap(),
            vec![Vec::<Option<String>>::new()]
        );
    }

    #[test]
    fn matching_filters_by_team_and_values() {
        let conn = seeded();
        TeamRepo::create(&conn, "t2", "ws", "Other").unwrap();
        issue(&conn, "i1", Some("open"), Some("high"));
        issue(&conn, "i2", Some("open"), Some("low"));
        IssueRepo::create(&conn, "x1", "t2", "elsewhere").unwrap();
        IssueRepo::set_field(&conn, "x1", IssueField::Status, "open").unwrap();

        let open = IssueRepo::matching(&conn, "t", &[(Dimension::Status, "open".into())]).unwrap();
        assert_eq!(open, vec!["i1", "i2"]);

        let open_high = IssueRepo::matching(
            &conn,
            "t",
            &[
                (Dimension::Status, "open".into()),
                (Dimension::Priority, "high".into()),
            ],
        )
        .unwrap();
        assert_eq!(open_high, vec!["i1"]);

        let all = IssueRepo::matching(&conn, "t", &[]).unwrap();
        assert_eq!(all, vec!["i1", "i2"]);
    }
}
