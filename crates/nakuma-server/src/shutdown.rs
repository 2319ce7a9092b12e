//! Server shutdown.
//!
//! One token stops `axum::serve` from accepting; each WebSocket session runs
//! under a child of it and is tracked, so [`Shutdown::drain`] returns only
//! once every session has torn down its subscriptions and flushed its writer.

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tokio_util::task::task_tracker::TrackedFuture;
use tracing::{info, warn};

/// How long [`Shutdown::drain`] waits when no timeout is given.
const DEFAULT_DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

/// Listener token plus the set of live session tasks.
pub struct Shutdown {
    token: CancellationToken,
    sessions: TaskTracker,
}

impl Shutdown {
    /// Nothing cancelled, no sessions.
    pub fn new() -> Self {
        Self {
            token: CancellationToken::new(),
            sessions: TaskTracker::new(),
        }
    }

    /// Token the listener stops on.
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Token for one session. Cancelling it closes only that session.
    pub fn session_token(&self) -> CancellationToken {
        self.token.child_token()
    }

    /// Wrap a session future so [`drain`](Self::drain) waits for it.
    pub fn track<F: Future>(&self, session: F) -> TrackedFuture<F> {
        self.sessions.track_future(session)
    }

    /// Sessions still running.
    pub fn active_sessions(&self) -> usize {
        self.sessions.len()
    }

    /// Cancel the listener and every session without waiting.
    pub fn trigger(&self) {
        self.token.cancel();
    }

    /// Trigger, then wait for the serve task and every tracked session.
    /// Returns `false` if `timeout` (default 10s) elapsed first.
    pub async fn drain(&self, serve: JoinHandle<()>, timeout: Option<Duration>) -> bool {
        let timeout = timeout.unwrap_or(DEFAULT_DRAIN_TIMEOUT);
        self.trigger();
        let _ = self.sessions.close();
        info!(
            sessions = self.sessions.len(),
            timeout_secs = timeout.as_secs(),
            "draining"
        );

        let sessions = self.sessions.wait();
        let drained = tokio::time::timeout(timeout, async {
            let _ = serve.await;
            sessions.await;
        })
        .await
        .is_ok();
        if !drained {
            warn!(
                remaining = self.sessions.len(),
                "drain timed out after {timeout:?}"
            );
        }
        drained
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}
