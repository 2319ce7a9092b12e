//! `SQLite` connection pool with WAL mode and foreign keys enabled.
//!
//! Every connection handed out by the pool has passed through
//! [`PragmaCustomizer`], so repositories can rely on foreign keys being
//! enforced.

use std::time::Duration;

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::Connection;

use crate::errors::Result;

/// Alias for the connection pool type.
pub type ConnectionPool = Pool<SqliteConnectionManager>;

/// Pool tuning.
#[derive(Clone, Debug)]
pub struct ConnectionConfig {
    /// Maximum pool size (default: 8). Ignored for in-memory pools.
    pub pool_size: u32,
    /// Busy timeout in milliseconds (default: 5000).
    pub busy_timeout_ms: u32,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            pool_size: 8,
            busy_timeout_ms: 5_000,
        }
    }
}

#[derive(Debug)]
struct PragmaCustomizer {
    busy_timeout_ms: u32,
}

impl r2d2::CustomizeConnection<Connection, rusqlite::Error> for PragmaCustomizer {
    fn on_acquire(&self, conn: &mut Connection) -> std::result::Result<(), rusqlite::Error> {
        conn.execute_batch(&format!(
            "PRAGMA busy_timeout = {};\
             PRAGMA journal_mode = WAL;\
             PRAGMA foreign_keys = ON;\
             PRAGMA synchronous = NORMAL;",
            self.busy_timeout_ms
        ))
    }
}

fn build(manager: SqliteConnectionManager, max_size: u32, busy_timeout_ms: u32) -> Result<ConnectionPool> {
    let pool = Pool::builder()
        .max_size(max_size)
        .connection_timeout(Duration::from_secs(5))
        .connection_customizer(Box::new(PragmaCustomizer { busy_timeout_ms }))
        .build(manager)?;
    Ok(pool)
}

/// In-memory pool for tests and ephemeral runs.
///
/// Each `SQLite` memory connection is its own database, so the pool is
/// pinned to a single connection.
pub fn new_in_memory(config: &ConnectionConfig) -> Result<ConnectionPool> {
    build(SqliteConnectionManager::memory(), 1, config.busy_timeout_ms)
}

/// File-backed pool.
pub fn new_file(path: &str, config: &ConnectionConfig) -> Result<ConnectionPool> {
    build(
        SqliteConnectionManager::file(path),
        config.pool_size.max(1),
        config.busy_timeout_ms,
    )
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
