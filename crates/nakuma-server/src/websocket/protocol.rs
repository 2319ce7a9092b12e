//! Per-connection read loop.
//!
//! ```text
//! CONNECTED ──subscribe/unsubscribe/update_*──▶ (same) ──read ends──▶ CLOSED
//! ```
//!
//! Frames are handled one at a time on the connection's task. No frame,
//! however malformed, ends the loop; only the source running dry or failing
//! does. On the way out every room still in the connection's active set is
//! unregistered.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use metrics::counter;
use nakuma_core::{RoomKey, UserId};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use super::connection::Connection;
use crate::errors::{HubError, TransportError};
use crate::hub::Hub;
use crate::metrics::{
    HUB_ERRORS_TOTAL, HUB_FRAMES_TOTAL, HUB_SUBSCRIBES_TOTAL, HUB_UNSUBSCRIBES_TOTAL,
};

const SUBSCRIBE: &str = "subscribe";
const UNSUBSCRIBE: &str = "unsubscribe";

/// Decoded inbound frame.
///
/// `{"type": "subscribe", "rooms": {"team": ["t1"]}}` or
/// `{"type": "update_team", "data": {...}}`. `event` is accepted in place of
/// `type`.
#[derive(Clone, Debug, Deserialize)]
pub struct InboundFrame {
    /// Frame type.
    #[serde(rename = "type", alias = "event")]
    pub kind: String,
    /// Room type → entity IDs, for subscribe/unsubscribe.
    #[serde(default)]
    pub rooms: BTreeMap<String, Vec<String>>,
    /// Edit body, for `update_*`.
    #[serde(default)]
    pub data: Option<Value>,
}

impl InboundFrame {
    fn room_keys(&self) -> impl Iterator<Item = RoomKey> + '_ {
        self.rooms.iter().flat_map(|(room_type, ids)| {
            ids.iter()
                .filter(|id| !id.is_empty())
                .map(move |id| RoomKey::new(room_type.as_str(), id.as_str()))
        })
    }
}

/// Where raw inbound frames come from.
#[async_trait]
pub trait FrameSource: Send {
    /// Next text frame. `None` on clean end of stream.
    async fn next_frame(&mut self) -> Option<Result<String, TransportError>>;
}

/// Drive one connection until its source ends, then tear down its
/// subscriptions.
#[instrument(skip_all, fields(user_id = %user, connection_id = %conn.id()))]
pub async fn run_protocol<S: FrameSource>(
    mut source: S,
    user: UserId,
    conn: Arc<dyn Connection>,
    hub: &Hub,
) {
    let mut active: HashSet<RoomKey> = HashSet::new();

    loop {
        let raw = match source.next_frame().await {
            Some(Ok(raw)) => raw,
            Some(Err(e)) => {
                let err = HubError::from(e);
                debug!(error = %err, "read failed, closing");
                counter!(HUB_ERRORS_TOTAL, "kind" => err.kind()).increment(1);
                break;
            }
            None => break,
        };
        if let Err(err) = handle_frame(&raw, &user, &conn, hub, &mut active).await {
            warn!(error = %err, kind = err.kind(), "frame dropped");
            counter!(HUB_ERRORS_TOTAL, "kind" => err.kind()).increment(1);
        }
    }

    teardown(&user, conn.as_ref(), hub, &active);
}

async fn handle_frame(
    raw: &str,
    user: &UserId,
    conn: &Arc<dyn Connection>,
    hub: &Hub,
    active: &mut HashSet<RoomKey>,
) -> Result<(), HubError> {
    let frame: InboundFrame =
        serde_json::from_str(raw).map_err(|e| HubError::Protocol(format!("invalid frame: {e}")))?;

    match frame.kind.as_str() {
        SUBSCRIBE => {
            counter!(HUB_FRAMES_TOTAL, "type" => SUBSCRIBE).increment(1);
            for room in frame.room_keys() {
                hub.registry().register(user, Arc::clone(conn), &room);
                counter!(HUB_SUBSCRIBES_TOTAL).increment(1);
                let _ = active.insert(room);
            }
            debug!(rooms = active.len(), "subscribed");
            Ok(())
        }
        UNSUBSCRIBE => {
            counter!(HUB_FRAMES_TOTAL, "type" => UNSUBSCRIBE).increment(1);
            for room in frame.room_keys() {
                let _ = hub.registry().unregister_connection(user, &room, conn.id());
                counter!(HUB_UNSUBSCRIBES_TOTAL).increment(1);
                let _ = active.remove(&room);
            }
            debug!(rooms = active.len(), "unsubscribed");
            Ok(())
        }
        kind if hub.handlers().contains(kind) => {
            counter!(HUB_FRAMES_TOTAL, "type" => kind.to_owned()).increment(1);
            let data = frame.data.unwrap_or(Value::Null);
            let _ = hub.handlers().dispatch(kind, data, hub.context()).await?;
            Ok(())
        }
        other => {
            counter!(HUB_FRAMES_TOTAL, "type" => "unknown").increment(1);
            Err(HubError::Protocol(format!("unrecognized frame type: {other}")))
        }
    }
}

fn teardown(user: &UserId, conn: &dyn Connection, hub: &Hub, active: &HashSet<RoomKey>) {
    let removed = active
        .iter()
        .filter(|room| hub.registry().unregister_connection(user, room, conn.id()))
        .count();
    debug!(rooms = active.len(), removed, "subscriptions torn down");
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
