//! # nakuma-logging
//!
//! Installs the global `tracing` subscriber. Output goes to stderr, either
//! compact human-readable lines or one JSON object per event. `RUST_LOG`
//! overrides the configured level when set.

#![deny(unsafe_code)]

use tracing_subscriber::EnvFilter;

/// Line format for log output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Single-line human-readable text.
    #[default]
    Compact,
    /// Newline-delimited JSON with span context.
    Json,
}

impl LogFormat {
    /// `Json` when `json` is set, else `Compact`.
    pub fn from_json_flag(json: bool) -> Self {
        if json { Self::Json } else { Self::Compact }
    }
}

fn filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}

/// Install the global subscriber. Later calls are no-ops.
pub fn init_subscriber(level: &str, format: LogFormat) {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter(level))
        .with_target(true)
        .with_writer(std::io::stderr);

    // try_init fails only when a subscriber is already installed
    let _ = match format {
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Json => builder.json().with_current_span(true).try_init(),
    };
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
