//! Error taxonomy of the hub.
//!
//! Nothing here is ever sent back to a client: every variant ends in a log
//! line and a metric, and the read loop carries on.

use nakuma_core::DomainError;
use nakuma_store::StoreError;
use thiserror::Error;

/// Failure writing to or reading from a connection.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    /// Outbound buffer is full; the client is not keeping up.
    #[error("outbound buffer full")]
    Full,
    /// Connection already closed.
    #[error("connection closed")]
    Closed,
    /// Reading the next inbound frame failed.
    #[error("read failed: {0}")]
    Read(String),
}

/// Every way handling a frame can fail.
#[derive(Debug, Error)]
pub enum HubError {
    /// Frame is not JSON, or its body does not fit the declared type.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Required ID missing, bad dimension, bad date range.
    #[error("validation error: {0}")]
    Validation(#[from] DomainError),

    /// A persistence port call failed.
    #[error("persistence error: {0}")]
    Persistence(#[from] StoreError),

    /// A send or read on a connection failed.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
}

impl HubError {
    /// Stable label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Protocol(_) => "protocol",
            Self::Validation(_) => "validation",
            Self::Persistence(_) => "persistence",
            Self::Transport(_) => "transport",
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
