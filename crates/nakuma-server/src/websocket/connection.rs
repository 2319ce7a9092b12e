//! Connection capability and the live WebSocket client behind it.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use nakuma_core::ConnectionId;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio_util::sync::CancellationToken;

use crate::errors::TransportError;

/// What the hub needs from a duplex channel: an identity, a non-blocking
/// send, and a way to close it. Reading is the protocol loop's concern.
pub trait Connection: Send + Sync {
    /// Stable identity of this connection.
    fn id(&self) -> &ConnectionId;

    /// Enqueue one serialized frame.
    fn send(&self, frame: Arc<str>) -> Result<(), TransportError>;

    /// Close the connection. Idempotent. The read loop observes it and tears
    /// down the connection's subscriptions.
    fn close(&self);
}

/// A connected WebSocket client.
///
/// Frames are enqueued into a bounded channel drained by the session's
/// writer task; [`send`](Connection::send) never waits.
pub struct ClientConnection {
    id: ConnectionId,
    tx: mpsc::Sender<Arc<str>>,
    cancel: CancellationToken,
    connected_at: Instant,
    dropped: AtomicU64,
}

impl ClientConnection {
    /// Wrap the writer channel. `cancel` fires when the connection closes.
    pub fn new(tx: mpsc::Sender<Arc<str>>, cancel: CancellationToken) -> Self {
        Self {
            id: ConnectionId::new(),
            tx,
            cancel,
            connected_at: Instant::now(),
            dropped: AtomicU64::new(0),
        }
    }

    /// Frames that could not be enqueued.
    pub fn drop_count(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Connection age.
    pub fn age(&self) -> Duration {
        self.connected_at.elapsed()
    }
}

impl Connection for ClientConnection {
    fn id(&self) -> &ConnectionId {
        &self.id
    }

    fn send(&self, frame: Arc<str>) -> Result<(), TransportError> {
        if self.cancel.is_cancelled() {
            return Err(TransportError::Closed);
        }
        self.tx.try_send(frame).map_err(|e| {
            let _ = self.dropped.fetch_add(1, Ordering::Relaxed);
            match e {
                TrySendError::Full(_) => TransportError::Full,
                TrySendError::Closed(_) => TransportError::Closed,
            }
        })
    }

    fn close(&self) {
        self.cancel.cancel();
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn make(capacity: usize) -> (ClientConnection, mpsc::Receiver<Arc<str>>) {
        let (tx, rx) = mpsc::channel(capacity);
        let conn = ClientConnection::new(tx, CancellationToken::new());
        (conn, rx)
    }

    #[tokio::test]
    async fn send_enqueues() {
        let (conn, mut rx) = make(4);
        conn.send(Arc::from("hello")).unwrap();
        assert_eq!(&*rx.recv().await.unwrap(), "hello");
    }

    #[test]
    fn full_buffer_is_an_error() {
        let (conn, _rx) = make(1);
        conn.send(Arc::from("a")).unwrap();
        assert_eq!(conn.send(Arc::from("b")), Err(TransportError::Full));
        assert_eq!(conn.drop_count(), 1);
    }

    #[test]
    fn dropped_receiver_is_closed() {
        let (conn, rx) = make(4);
        drop(rx);
        assert_eq!(conn.send(Arc::from("a")), Err(TransportError::Closed));
    }

    #[test]
    fn close_is_idempotent_and_refuses_sends() {
        let (tx, _rx) = mpsc::channel(4);
        let token = CancellationToken::new();
        let conn = ClientConnection::new(tx, token.clone());
        conn.close();
        conn.close();
        assert!(token.is_cancelled());
        assert_eq!(conn.send(Arc::from("late")), Err(TransportError::Closed));
    }

    #[test]
    fn ids_are_unique() {
        let (a, _ra) = make(1);
        let (b, _rb) = make(1);
        assert_ne!(a.id(), b.id());
    }
}
