//! Settings loading: defaults, then the JSON file, then environment.
//!
//! Merge rules for the file layer:
//! - objects merge recursively, file keys winning
//! - arrays and scalars are replaced
//! - `null` in the file keeps the default

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, warn};

use crate::errors::Result;
use crate::types::NakumaSettings;

/// `~/.nakuma`, falling back to `/tmp/.nakuma` without `HOME`.
pub fn nakuma_home() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(home).join(".nakuma")
}

/// Default settings file location.
pub fn settings_path() -> PathBuf {
    nakuma_home().join("settings.json")
}

/// Load from the default path.
pub fn load_settings() -> Result<NakumaSettings> {
    load_settings_from_path(&settings_path())
}

/// Load from `path`. A missing file yields defaults; malformed JSON is an error.
pub fn load_settings_from_path(path: &Path) -> Result<NakumaSettings> {
    let defaults = serde_json::to_value(NakumaSettings::default())?;
    let merged = if path.exists() {
        debug!(?path, "loading settings file");
        let user: Value = serde_json::from_str(&std::fs::read_to_string(path)?)?;
        deep_merge(defaults, user)
    } else {
        debug!(?path, "no settings file, using defaults");
        defaults
    };
    let mut settings: NakumaSettings = serde_json::from_value(merged)?;
    apply_env_overrides(&mut settings, |name| std::env::var(name).ok());
    Ok(settings)
}

/// Recursive JSON merge of `source` over `target`.
pub fn deep_merge(target: Value, source: Value) -> Value {
    match (target, source) {
        (Value::Object(mut into), Value::Object(from)) => {
            for (key, value) in from {
                if value.is_null() {
                    continue;
                }
                let merged = match into.remove(&key) {
                    Some(existing) => deep_merge(existing, value),
                    None => value,
                };
                let _ = into.insert(key, merged);
            }
            Value::Object(into)
        }
        (_, source) => source,
    }
}

/// Apply `NAKUMA_*` overrides read through `lookup`.
///
/// Invalid values are logged and skipped.
pub fn apply_env_overrides<F>(settings: &mut NakumaSettings, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let string = |name: &str| lookup(name).filter(|v| !v.is_empty());
    let ranged = |name: &str, min: u64, max: u64| -> Option<u64> {
        let raw = string(name)?;
        let value = parse_range(&raw, min, max);
        if value.is_none() {
            warn!(key = name, value = %raw, "invalid env override, ignoring");
        }
        value
    };

    if let Some(v) = string("NAKUMA_HOST") {
        settings.server.host = v;
    }
    if let Some(v) = ranged("NAKUMA_PORT", 1, 65_535) {
        settings.server.port = u16::try_from(v).unwrap_or(settings.server.port);
    }
    if let Some(v) = string("NAKUMA_IDENTITY_HEADER") {
        settings.server.identity_header = v.to_ascii_lowercase();
    }
    if let Some(v) = ranged("NAKUMA_OUTBOUND_BUFFER", 1, 65_536) {
        settings.server.outbound_buffer = usize::try_from(v).unwrap_or(settings.server.outbound_buffer);
    }
    if let Some(v) = string("NAKUMA_DB_PATH") {
        settings.database.path = v;
    }
    if let Some(v) = ranged("NAKUMA_DB_POOL_SIZE", 1, 64) {
        settings.database.pool_size = u32::try_from(v).unwrap_or(settings.database.pool_size);
    }
    if let Some(v) = string("NAKUMA_LOG_LEVEL") {
        settings.logging.level = v;
    }
    if let Some(v) = string("NAKUMA_LOG_FORMAT") {
        match parse_log_format(&v) {
            Some(json) => settings.logging.json = json,
            None => warn!(key = "NAKUMA_LOG_FORMAT", value = %v, "invalid env override, ignoring"),
        }
    }
}

// ── Pure parsers ────────────────────────────────────────────────────────────

/// Parse an unsigned integer within `[min, max]`.
pub fn parse_range(val: &str, min: u64, max: u64) -> Option<u64> {
    let n: u64 = val.trim().parse().ok()?;
    (min..=max).contains(&n).then_some(n)
}

/// `json` → `true`, `compact`/`text` → `false`.
pub fn parse_log_format(val: &str) -> Option<bool> {
    match val.to_ascii_lowercase().as_str() {
        "json" => Some(true),
        "compact" | "text" => Some(false),
        _ => None,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
