//! The hub: one registry, one dispatcher, the handler table and the store,
//! constructed once and shared by every connection.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use nakuma_store::Store;

use crate::handlers::{HandlerRegistry, HubContext};
use crate::websocket::broadcast::Dispatcher;
use crate::websocket::registry::ConnectionRegistry;

/// Shared real-time state.
pub struct Hub {
    registry: Arc<ConnectionRegistry>,
    handlers: HandlerRegistry,
    ctx: HubContext,
    connections: AtomicUsize,
}

impl Hub {
    /// Hub over `store` with the default entity handlers.
    pub fn new(store: Arc<dyn Store>) -> Self {
        let registry = Arc::new(ConnectionRegistry::new());
        let dispatcher = Arc::new(Dispatcher::new(Arc::clone(&registry)));
        Self {
            registry,
            handlers: HandlerRegistry::with_defaults(),
            ctx: HubContext::new(store, dispatcher),
            connections: AtomicUsize::new(0),
        }
    }

    /// Room subscriptions.
    pub fn registry(&self) -> &Arc<ConnectionRegistry> {
        &self.registry
    }

    /// Room fan-out.
    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.ctx.dispatcher
    }

    /// Mutation frame handlers.
    pub fn handlers(&self) -> &HandlerRegistry {
        &self.handlers
    }

    /// Context handed to mutation handlers.
    pub fn context(&self) -> &HubContext {
        &self.ctx
    }

    /// Record a new live connection.
    pub fn connection_opened(&self) {
        let _ = self.connections.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a connection ending.
    pub fn connection_closed(&self) {
        let _ = self.connections.fetch_sub(1, Ordering::Relaxed);
    }

    /// Live connections.
    pub fn connection_count(&self) -> usize {
        self.connections.load(Ordering::Relaxed)
    }
}
