//! Schema migration runner.
//!
//! Migrations are embedded with [`include_str!`] and applied in version
//! order, each inside its own transaction. Applied versions are recorded in
//! `schema_version`; re-running is a no-op.

use rusqlite::Connection;
use tracing::{debug, info};

use crate::errors::{Result, StoreError};

struct Migration {
    version: u32,
    description: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    description: "workspaces, teams, projects, issues, views",
    sql: include_str!("v001_schema.sql"),
}];

fn migration_err(message: String) -> StoreError {
    StoreError::Migration { message }
}

/// Apply every pending migration. Returns how many ran.
pub fn run_migrations(conn: &Connection) -> Result<u32> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
           version     INTEGER PRIMARY KEY,
           applied_at  TEXT    NOT NULL,
           description TEXT
         );",
    )
    .map_err(|e| migration_err(format!("failed to create schema_version table: {e}")))?;

    let current = current_version(conn)?;
    let mut applied = 0;
    for migration in MIGRATIONS.iter().filter(|m| m.version > current) {
        info!(version = migration.version, description = migration.description, "applying migration");
        apply(conn, migration)?;
        applied += 1;
    }
    if applied == 0 {
        debug!(current, "schema up to date");
    }
    Ok(applied)
}

/// Highest applied version, or 0.
pub fn current_version(conn: &Connection) -> Result<u32> {
    conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |row| row.get(0),
    )
    .map_err(|e| migration_err(format!("failed to read schema_version: {e}")))
}

/// Latest version defined in code.
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map_or(0, |m| m.version)
}

fn apply(conn: &Connection, migration: &Migration) -> Result<()> {
    let v = migration.version;
    let tx = conn
        .unchecked_transaction()
        .map_err(|e| migration_err(format!("failed to begin v{v}: {e}")))?;
    tx.execute_batch(migration.sql)
        .map_err(|e| migration_err(format!("v{v} ({}) failed: {e}", migration.description)))?;
    let _ = tx
        .execute(
            "INSERT INTO schema_version (version, applied_at, description) VALUES (?1, datetime('now'), ?2)",
            rusqlite::params![v, migration.description],
        )
        .map_err(|e| migration_err(format!("failed to record v{v}: {e}")))?;
    tx.commit()
        .map_err(|e| migration_err(format!("failed to commit v{v}: {e}")))
}
