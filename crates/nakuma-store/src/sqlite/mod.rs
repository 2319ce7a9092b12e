//! `SQLite` adapter for the [`Store`](crate::Store) port.
//!
//! - **[`connection`]**: `r2d2` pool with WAL and foreign-key pragmas.
//! - **[`migrations`]**: embedded, version-tracked schema.
//! - **[`repositories`]**: stateless per-entity SQL.
//! - **[`store`]**: [`SqliteStore`], which runs repository calls on the
//!   blocking pool.

pub mod connection;
pub mod migrations;
pub mod repositories;
pub mod store;

pub use connection::{ConnectionConfig, ConnectionPool, new_file, new_in_memory};
pub use migrations::{current_version, latest_version, run_migrations};
pub use store::SqliteStore;
