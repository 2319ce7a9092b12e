//! Settings schema. Every section falls back to its defaults field by field.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Root settings object.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NakumaSettings {
    /// Network listener and WebSocket behavior.
    pub server: ServerSettings,
    /// `SQLite` location and pool.
    pub database: DatabaseSettings,
    /// Log output.
    pub logging: LoggingSettings,
}

/// Network listener and WebSocket behavior.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerSettings {
    /// Bind address.
    pub host: String,
    /// Bind port.
    pub port: u16,
    /// Request header carrying the authenticated user ID.
    pub identity_header: String,
    /// Per-connection outbound buffer, in frames.
    pub outbound_buffer: usize,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            identity_header: "x-user-id".to_string(),
            outbound_buffer: 256,
        }
    }
}

/// `SQLite` location and pool.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DatabaseSettings {
    /// Database file. Relative paths resolve against `~/.nakuma`;
    /// `:memory:` selects a throwaway in-memory database.
    pub path: String,
    /// Maximum pooled connections.
    pub pool_size: u32,
    /// `SQLite` busy timeout.
    pub busy_timeout_ms: u32,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            path: "nakuma.db".to_string(),
            pool_size: 8,
            busy_timeout_ms: 5_000,
        }
    }
}

impl DatabaseSettings {
    /// True when the database should live in memory.
    pub fn is_in_memory(&self) -> bool {
        self.path == ":memory:"
    }

    /// Absolute location of the database file.
    pub fn resolved_path(&self, home: &Path) -> PathBuf {
        let path = Path::new(&self.path);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            home.join(path)
        }
    }
}

/// Log output.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggingSettings {
    /// Default level filter; `RUST_LOG` takes precedence.
    pub level: String,
    /// Emit JSON lines instead of compact text.
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn defaults() {
        let s = NakumaSettings::default();
        assert_eq!(s.server.port, 8080);
        assert_eq!(s.server.identity_header, "x-user-id");
        assert_eq!(s.database.path, "nakuma.db");
        assert_eq!(s.logging.level, "info");
        assert!(!s.logging.json);
    }

    #[test]
    fn camel_case_keys() {
        let v = serde_json::to_value(NakumaSettings::default()).unwrap();
        assert!(v["server"].get("identityHeader").is_some());
        assert!(v["database"].get("busyTimeoutMs").is_some());
    }

    #[test]
    fn partial_section_keeps_other_defaults() {
        let s: NakumaSettings = serde_json::from_value(json!({"server": {"port": 9000}})).unwrap();
        assert_eq!(s.server.port, 9000);
        assert_eq!(s.server.host, "127.0.0.1");
        assert_eq!(s.database.pool_size, 8);
    }

    #[test]
    fn relative_db_path_resolves_under_home() {
        let db = DatabaseSettings::default();
        assert_eq!(
            db.resolved_path(Path::new("/home/a/.nakuma")),
            PathBuf::from("/home/a/.nakuma/nakuma.db")
        );
        let abs = DatabaseSettings {
            path: "/var/lib/nakuma.db".into(),
            ..Default::default()
        };
        assert_eq!(abs.resolved_path(Path::new("/x")), PathBuf::from("/var/lib/nakuma.db"));
    }

    #[test]
    fn memory_marker() {
        let db = DatabaseSettings {
            path: ":memory:".into(),
            ..Default::default()
        };
        assert!(db.is_in_memory());
        assert!(!DatabaseSettings::default().is_in_memory());
    }
}
