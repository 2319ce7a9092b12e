//! Stateless repositories, one per entity. Every method takes `&Connection`.

pub mod issue;
pub mod project;
pub mod team;
pub mod view;
pub mod workspace;

pub use issue::{IssueRepo, IssueRow};
pub use project::{ProjectRepo, ProjectRow};
pub use team::{TeamRepo, TeamRow};
pub use view::{ViewRepo, ViewRow};
pub use workspace::{WorkspaceRepo, WorkspaceRow};

use crate::errors::{Result, StoreError};

/// Turn an affected-row count of zero into `NotFound`.
pub(crate) fn require_change(changed: usize, kind: &'static str, id: &str) -> Result<()> {
    if changed == 0 {
        return Err(StoreError::not_found(kind, id));
    }
    Ok(())
}

/// Collect a single-column string query.
pub(crate) fn strings(
    conn: &rusqlite::Connection,
    sql: &str,
    params: impl rusqlite::Params,
) -> Result<Vec<String>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params, |row| row.get(0))?
        .collect::<std::result::Result<Vec<String>, _>>()?;
    Ok(rows)
}

#[cfg(test)]
pub(crate) mod test_db {
    use rusqlite::Connection;

    use crate::sqlite::migrations::run_migrations;

    use super::{TeamRepo, WorkspaceRepo};

    /// Migrated in-memory database with workspace `ws` and team `t`.
    pub fn seeded() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("PRAGMA foreign_keys = ON;").unwrap();
        let _ = run_migrations(&conn).unwrap();
        WorkspaceRepo::create(&conn, "ws", "Acme").unwrap();
        TeamRepo::create(&conn, "t", "ws", "Core").unwrap();
        conn
    }
}
