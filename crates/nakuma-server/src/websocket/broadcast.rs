//! Room fan-out.
//!
//! A publish serializes the envelope once, snapshots the room, and writes to
//! each subscriber. A failed write closes that connection and removes it
//! from the room before `publish` returns. No retry, no queue.

use std::sync::Arc;

use metrics::counter;
use nakuma_core::{Envelope, EventName, RoomKey};
use serde_json::Value;
use tracing::{debug, warn};

use super::registry::ConnectionRegistry;
use crate::metrics::{HUB_BROADCASTS_TOTAL, HUB_DELIVERIES_TOTAL, HUB_PRUNED_TOTAL};

/// Publishes envelopes to rooms.
pub struct Dispatcher {
    registry: Arc<ConnectionRegistry>,
}

impl Dispatcher {
    /// Dispatcher over `registry`.
    pub fn new(registry: Arc<ConnectionRegistry>) -> Self {
        Self { registry }
    }

    /// Registry this dispatcher reads from and prunes.
    pub fn registry(&self) -> &Arc<ConnectionRegistry> {
        &self.registry
    }

    /// Send `{type: event, data: payload}` to every subscriber of `room`.
    ///
    /// Returns the number of successful deliveries.
    pub fn publish(&self, room: &RoomKey, event: EventName, payload: Value) -> usize {
        let frame: Arc<str> = match serde_json::to_string(&Envelope::new(event, payload)) {
            Ok(json) => Arc::from(json),
            Err(e) => {
                warn!(%room, %event, error = %e, "failed to serialize envelope");
                return 0;
            }
        };
        counter!(HUB_BROADCASTS_TOTAL, "event" => event.as_str()).increment(1);

        let subscribers = self.registry.lookup(room);
        let mut delivered = 0;
        for (user, conn) in &subscribers {
            match conn.send(Arc::clone(&frame)) {
                Ok(()) => delivered += 1,
                Err(e) => {
                    warn!(
                        %room,
                        user_id = %user,
                        connection_id = %conn.id(),
                        error = %e,
                        "send failed, pruning connection"
                    );
                    conn.close();
                    let _ = self.registry.unregister_connection(user, room, conn.id());
                    counter!(HUB_PRUNED_TOTAL).increment(1);
                }
            }
        }
        counter!(HUB_DELIVERIES_TOTAL).increment(delivered as u64);
        debug!(%room, %event, recipients = subscribers.len(), delivered, "published");
        delivered
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
