//! # nakuma-server
//!
//! Real-time core of the nakuma project tracker.
//!
//! - **Registry**: room key → one connection per subscribed user
//! - **Dispatcher**: serialize-once fan-out with pruning of dead connections
//! - **Protocol**: per-connection read loop for subscribe/unsubscribe and
//!   entity edits, with guaranteed teardown
//! - **Handlers**: sparse partial updates for workspaces, teams, projects,
//!   issues and views, each field persisted and announced independently
//! - **Materializer**: full rebuild of a view's issue membership from its
//!   group-by dimensions
//! - **Transport**: Axum WebSocket endpoint, `/health`, `/metrics`, graceful
//!   shutdown

#![deny(unsafe_code)]

pub mod config;
pub mod errors;
pub mod handlers;
pub mod health;
pub mod hub;
pub mod identity;
pub mod metrics;
pub mod server;
pub mod shutdown;
pub mod websocket;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use config::HubConfig;
pub use errors::{HubError, TransportError};
pub use hub::Hub;
pub use server::HubServer;
