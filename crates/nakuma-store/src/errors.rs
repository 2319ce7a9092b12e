//! Error type for persistence operations.

use thiserror::Error;

/// Errors returned by [`Store`](crate::Store) implementations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// `SQLite` database error.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Connection pool error.
    #[error("connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    /// Schema migration failed.
    #[error("migration error: {message}")]
    Migration {
        /// Which migration failed and why.
        message: String,
    },

    /// The row an update targeted does not exist.
    #[error("{kind} not found: {id}")]
    NotFound {
        /// Entity or relation name, e.g. `team` or `team member`.
        kind: &'static str,
        /// Key that missed.
        id: String,
    },

    /// Blocking task panicked or was cancelled.
    #[error("internal error: {0}")]
    Internal(String),
}

impl StoreError {
    pub(crate) fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            id: id.into(),
        }
    }
}

/// Convenience alias for store results.
pub type Result<T> = std::result::Result<T, StoreError>;
