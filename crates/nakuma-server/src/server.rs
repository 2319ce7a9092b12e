//! `HubServer`: Axum HTTP + WebSocket server.

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::Router;
use axum::extract::ws::WebSocketUpgrade;
use axum::extract::{Extension, State};
use axum::middleware::from_fn_with_state;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::get;
use metrics_exporter_prometheus::PrometheusHandle;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::config::HubConfig;
use crate::health::{self, HealthResponse};
use crate::hub::Hub;
use crate::identity::{Identity, IdentityHeader, require_identity};
use crate::metrics as hub_metrics;
use crate::shutdown::Shutdown;
use crate::websocket::session::run_ws_session;

/// Shared state accessible from Axum handlers.
#[derive(Clone)]
pub struct AppState {
    /// Real-time hub.
    pub hub: Arc<Hub>,
    /// Listener token and session tracker.
    pub shutdown: Arc<Shutdown>,
    /// Prometheus handle for `/metrics`, when a recorder is installed.
    pub metrics: Option<PrometheusHandle>,
    /// When the server started.
    pub start_time: Instant,
    /// Per-connection outbound buffer, in frames.
    pub outbound_buffer: usize,
}

/// The nakuma hub server.
pub struct HubServer {
    config: HubConfig,
    hub: Arc<Hub>,
    metrics: Option<PrometheusHandle>,
    shutdown: Arc<Shutdown>,
    start_time: Instant,
}

impl HubServer {
    /// Create a new server around `hub`.
    pub fn new(config: HubConfig, hub: Arc<Hub>, metrics: Option<PrometheusHandle>) -> Self {
        Self {
            config,
            hub,
            metrics,
            shutdown: Arc::new(Shutdown::new()),
            start_time: Instant::now(),
        }
    }

    /// Build the Axum router with all routes.
    pub fn router(&self) -> Router {
        let state = AppState {
            hub: Arc::clone(&self.hub),
            shutdown: Arc::clone(&self.shutdown),
            metrics: self.metrics.clone(),
            start_time: self.start_time,
            outbound_buffer: self.config.outbound_buffer,
        };
        let identity = IdentityHeader::new(&self.config.identity_header);

        let ws = Router::new()
            .route("/ws", get(ws_handler))
            .route_layer(from_fn_with_state(identity, require_identity));

        Router::new()
            .route("/health", get(health_handler))
            .route("/metrics", get(metrics_handler))
            .merge(ws)
            .with_state(state)
            .layer(TraceLayer::new_for_http())
    }

    /// Bind and serve in the background until the shutdown token fires.
    /// Returns the bound address and the serve task; pass the latter to
    /// [`Shutdown::drain`].
    pub async fn listen(&self) -> io::Result<(SocketAddr, JoinHandle<()>)> {
        let listener = TcpListener::bind((self.config.host.as_str(), self.config.port)).await?;
        let addr = listener.local_addr()?;
        let router = self.router();
        let token = self.shutdown.token();

        info!(%addr, "nakuma hub listening");
        let handle = tokio::spawn(async move {
            let result = axum::serve(listener, router)
                .with_graceful_shutdown(async move { token.cancelled().await })
                .await;
            if let Err(e) = result {
                error!(error = %e, "server exited with error");
            }
        });
        Ok((addr, handle))
    }

    /// The real-time hub.
    pub fn hub(&self) -> &Arc<Hub> {
        &self.hub
    }

    /// Listener token and live sessions.
    pub fn shutdown(&self) -> &Arc<Shutdown> {
        &self.shutdown
    }

    /// Get the server configuration.
    pub fn config(&self) -> &HubConfig {
        &self.config
    }
}

/// GET /health
async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(health::health_check(
        state.start_time,
        state.hub.connection_count(),
        state.hub.registry().room_count(),
    ))
}

/// GET /metrics
async fn metrics_handler(State(state): State<AppState>) -> String {
    state
        .metrics
        .as_ref()
        .map(hub_metrics::render)
        .unwrap_or_default()
}

/// GET /ws
async fn ws_handler(
    ws: WebSocketUpgrade,
    Extension(Identity(user)): Extension<Identity>,
    State(state): State<AppState>,
) -> Response {
    let hub = Arc::clone(&state.hub);
    let shutdown = Arc::clone(&state.shutdown);
    let cancel = shutdown.session_token();
    let buffer = state.outbound_buffer;
    ws.on_upgrade(move |socket| {
        shutdown.track(run_ws_session(socket, user, hub, buffer, cancel))
    })
    .into_response()
}
