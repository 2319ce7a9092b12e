//! Nakuma hub binary: loads settings, opens the store and serves the
//! WebSocket hub until ctrl-c.

#![deny(unsafe_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use nakuma_logging::{LogFormat, init_subscriber};
use nakuma_server::{Hub, HubConfig, HubServer};
use nakuma_settings::{DatabaseSettings, NakumaSettings};
use nakuma_store::SqliteStore;
use nakuma_store::sqlite::{ConnectionConfig, ConnectionPool, new_file, new_in_memory};

#[derive(Parser, Debug)]
#[command(name = "nakuma", about = "Nakuma real-time collaboration hub")]
struct Cli {
    /// Settings file (default: ~/.nakuma/settings.json).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Host to bind to.
    #[arg(long)]
    host: Option<String>,

    /// Port to bind to (0 = OS-assigned).
    #[arg(long)]
    port: Option<u16>,

    /// Database path, or `:memory:`.
    #[arg(long)]
    db_path: Option<String>,

    /// Emit JSON log lines.
    #[arg(long)]
    json_logs: bool,
}

impl Cli {
    /// Command-line flags win over the settings file and environment.
    fn apply(&self, settings: &mut NakumaSettings) {
        if let Some(host) = &self.host {
            settings.server.host.clone_from(host);
        }
        if let Some(port) = self.port {
            settings.server.port = port;
        }
        if let Some(path) = &self.db_path {
            settings.database.path.clone_from(path);
        }
        if self.json_logs {
            settings.logging.json = true;
        }
    }
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    Ok(())
}

fn open_pool(db: &DatabaseSettings, home: &Path) -> Result<ConnectionPool> {
    let config = ConnectionConfig {
        pool_size: db.pool_size,
        busy_timeout_ms: db.busy_timeout_ms,
    };
    if db.is_in_memory() {
        return new_in_memory(&config).context("Failed to open in-memory database");
    }
    let path = db.resolved_path(home);
    ensure_parent_dir(&path)?;
    new_file(&path.to_string_lossy(), &config)
        .with_context(|| format!("Failed to open database: {}", path.display()))
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();

    let mut settings = match &args.config {
        Some(path) => nakuma_settings::load_settings_from_path(path),
        None => nakuma_settings::load_settings(),
    }
    .context("Failed to load settings")?;
    args.apply(&mut settings);

    init_subscriber(
        &settings.logging.level,
        LogFormat::from_json_flag(settings.logging.json),
    );

    let pool = open_pool(&settings.database, &nakuma_settings::nakuma_home())?;
    let store = SqliteStore::new(pool);
    let applied = store.migrate().context("Failed to run migrations")?;
    tracing::debug!(applied, "migrations complete");

    let metrics = match nakuma_server::metrics::install_recorder() {
        Ok(handle) => Some(handle),
        Err(e) => {
            tracing::warn!(error = %e, "metrics recorder unavailable");
            None
        }
    };

    let hub = Arc::new(Hub::new(Arc::new(store)));
    let server = HubServer::new(HubConfig::from(&settings.server), hub, metrics);
    let (addr, handle) = server.listen().await.context("Failed to bind server")?;
    tracing::info!("nakuma hub listening on ws://{addr}/ws");

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for ctrl-c")?;

    tracing::info!("Shutting down...");
    if server.shutdown().drain(handle, None).await {
        tracing::info!("Shutdown complete");
    } else {
        tracing::warn!(
            sessions = server.shutdown().active_sessions(),
            "Shutdown incomplete, exiting anyway"
        );
    }
    Ok(())
}
