//! WebSocket session lifecycle: one connected client from upgrade through
//! disconnect.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::extract::ws::{Message, WebSocket};
use futures::stream::SplitStream;
use futures::{SinkExt, StreamExt};
use metrics::{counter, gauge, histogram};
use nakuma_core::UserId;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument};

use super::connection::{ClientConnection, Connection};
use super::protocol::{FrameSource, run_protocol};
use crate::errors::TransportError;
use crate::hub::Hub;
use crate::metrics::{
    WS_CONNECTION_DURATION_SECONDS, WS_CONNECTIONS_ACTIVE, WS_CONNECTIONS_TOTAL,
    WS_DISCONNECTIONS_TOTAL,
};

/// How long the writer gets to flush queued frames after the read loop ends.
const WRITER_DRAIN_TIMEOUT: Duration = Duration::from_secs(2);

/// Inbound half of the socket. Ends when the client closes, the read
/// fails, or the connection is closed from the hub side.
struct WsFrameSource {
    rx: SplitStream<WebSocket>,
    cancel: CancellationToken,
}

#[async_trait]
impl FrameSource for WsFrameSource {
    async fn next_frame(&mut self) -> Option<Result<String, TransportError>> {
        loop {
            let msg = tokio::select! {
                () = self.cancel.cancelled() => return None,
                msg = self.rx.next() => msg?,
            };
            match msg {
                Ok(Message::Text(text)) => return Some(Ok(text.to_string())),
                // Some clients send JSON in binary frames.
                Ok(Message::Binary(data)) => {
                    return Some(Ok(String::from_utf8_lossy(&data).into_owned()));
                }
                Ok(Message::Close(_)) => {
                    debug!("client sent close frame");
                    return None;
                }
                Ok(Message::Ping(_) | Message::Pong(_)) => {}
                Err(e) => return Some(Err(TransportError::Read(e.to_string()))),
            }
        }
    }
}

/// Run a WebSocket session for an authenticated client.
///
/// 1. Wraps the socket's write half in a [`ClientConnection`] fed by a
///    bounded channel
/// 2. Runs the protocol loop on the read half
/// 3. Closes the connection and lets the writer drain
///
/// `cancel` closes the session from the server side; the connection closing
/// itself cancels it too.
#[instrument(skip_all, fields(user_id = %user))]
pub async fn run_ws_session(
    ws: WebSocket,
    user: UserId,
    hub: Arc<Hub>,
    outbound_buffer: usize,
    cancel: CancellationToken,
) {
    let (mut ws_tx, ws_rx) = ws.split();
    let (send_tx, mut send_rx) = mpsc::channel::<Arc<str>>(outbound_buffer.max(1));
    let connection = Arc::new(ClientConnection::new(send_tx, cancel.clone()));

    info!(connection_id = %connection.id(), "client connected");
    counter!(WS_CONNECTIONS_TOTAL).increment(1);
    gauge!(WS_CONNECTIONS_ACTIVE).increment(1.0);
    hub.connection_opened();

    let writer_cancel = cancel.clone();
    let mut outbound = tokio::spawn(async move {
        loop {
            tokio::select! {
                biased;
                frame = send_rx.recv() => {
                    let Some(frame) = frame else { break };
                    if ws_tx.send(Message::Text(frame.to_string().into())).await.is_err() {
                        break;
                    }
                }
                () = writer_cancel.cancelled() => {
                    let _ = ws_tx.send(Message::Close(None)).await;
                    break;
                }
            }
        }
        // A dead writer means a dead connection.
        writer_cancel.cancel();
    });

    let source = WsFrameSource {
        rx: ws_rx,
        cancel: cancel.clone(),
    };
    let conn: Arc<dyn Connection> = connection.clone();
    run_protocol(source, user, conn, &hub).await;

    connection.close();
    if tokio::time::timeout(WRITER_DRAIN_TIMEOUT, &mut outbound)
        .await
        .is_err()
    {
        outbound.abort();
    }

    info!(
        connection_id = %connection.id(),
        dropped_frames = connection.drop_count(),
        "client disconnected"
    );
    counter!(WS_DISCONNECTIONS_TOTAL).increment(1);
    gauge!(WS_CONNECTIONS_ACTIVE).decrement(1.0);
    histogram!(WS_CONNECTION_DURATION_SECONDS).record(connection.age().as_secs_f64());
    hub.connection_closed();
}
