//! WebSocket transport: connections, room registry, fan-out, and the
//! per-connection protocol loop.

pub mod broadcast;
pub mod connection;
pub mod protocol;
pub mod registry;
pub mod session;

pub use broadcast::Dispatcher;
pub use connection::{ClientConnection, Connection};
pub use protocol::{FrameSource, InboundFrame, run_protocol};
pub use registry::ConnectionRegistry;
