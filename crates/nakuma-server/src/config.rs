//! Server configuration.

use nakuma_settings::ServerSettings;
use serde::{Deserialize, Serialize};

/// Runtime configuration of [`HubServer`](crate::HubServer).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HubConfig {
    /// Host to bind (default `"127.0.0.1"`).
    pub host: String,
    /// Port to bind (default `0` for auto-assign).
    pub port: u16,
    /// Header carrying the authenticated user ID.
    pub identity_header: String,
    /// Per-connection outbound buffer, in frames.
    pub outbound_buffer: usize,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 0,
            identity_header: "x-user-id".into(),
            outbound_buffer: 256,
        }
    }
}

impl From<&ServerSettings> for HubConfig {
    fn from(s: &ServerSettings) -> Self {
        Self {
            host: s.host.clone(),
            port: s.port,
            identity_header: s.identity_header.to_ascii_lowercase(),
            outbound_buffer: s.outbound_buffer.max(1),
        }
    }
}
