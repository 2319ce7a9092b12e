//! # nakuma-settings
//!
//! Configuration for the nakuma hub, resolved in three layers:
//! compiled defaults, then `~/.nakuma/settings.json` (deep-merged), then
//! `NAKUMA_*` environment variables.

#![deny(unsafe_code)]

pub mod errors;
pub mod loader;
pub mod types;

pub use errors::{Result, SettingsError};
pub use loader::{deep_merge, load_settings, load_settings_from_path, nakuma_home, settings_path};
pub use types::{DatabaseSettings, LoggingSettings, NakumaSettings, ServerSettings};
