//! Prometheus metrics recorder and `/metrics` endpoint handler.

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use tracing::info;

/// Install the Prometheus metrics recorder (global).
///
/// Returns the `PrometheusHandle` used to render the `/metrics` endpoint.
/// Fails if a recorder is already installed.
pub fn install_recorder() -> Result<PrometheusHandle, BuildError> {
    let handle = PrometheusBuilder::new().install_recorder()?;
    info!("prometheus metrics recorder installed");
    Ok(handle)
}

/// Render Prometheus text format from the installed recorder.
pub fn render(handle: &PrometheusHandle) -> String {
    handle.render()
}

/// WebSocket connections opened total (counter).
pub const WS_CONNECTIONS_TOTAL: &str = "ws_connections_total";
/// WebSocket disconnections total (counter).
pub const WS_DISCONNECTIONS_TOTAL: &str = "ws_disconnections_total";
/// Active WebSocket connections (gauge).
pub const WS_CONNECTIONS_ACTIVE: &str = "ws_connections_active";
/// WebSocket connection lifetime seconds (histogram).
pub const WS_CONNECTION_DURATION_SECONDS: &str = "ws_connection_duration_seconds";
/// Inbound frames total (counter, labels: type).
pub const HUB_FRAMES_TOTAL: &str = "hub_frames_total";
/// Frame handling errors total (counter, labels: kind).
pub const HUB_ERRORS_TOTAL: &str = "hub_errors_total";
/// Rooms with at least one subscriber (gauge).
pub const HUB_ROOMS_ACTIVE: &str = "hub_rooms_active";
/// Subscribe requests total (counter).
pub const HUB_SUBSCRIBES_TOTAL: &str = "hub_subscribes_total";
/// Unsubscribe requests total (counter).
pub const HUB_UNSUBSCRIBES_TOTAL: &str = "hub_unsubscribes_total";
/// Publishes total (counter, labels: event).
pub const HUB_BROADCASTS_TOTAL: &str = "hub_broadcasts_total";
/// Frames delivered to a connection (counter).
pub const HUB_DELIVERIES_TOTAL: &str = "hub_deliveries_total";
/// Connections pruned after a failed send (counter).
pub const HUB_PRUNED_TOTAL: &str = "hub_pruned_total";
/// View rematerializations total (counter).
pub const HUB_VIEW_REBUILDS_TOTAL: &str = "hub_view_rebuilds_total";
/// View rematerialization duration seconds (histogram).
pub const HUB_VIEW_REBUILD_DURATION_SECONDS: &str = "hub_view_rebuild_duration_seconds";
