//! Self-healing WebSocket stream of order-lifecycle events.
//!
//! Maintains one authenticated subscription to the account order-update
//! channel and keeps it alive indefinitely:
//! - expired subscription signatures are renewed in place
//! - closed or failed sockets are rebuilt after a fixed delay, forever
//!
//! Recognized events are delivered into an `mpsc` channel; the single
//! consumer on the other end is what serializes fill handling.

pub mod connection;
pub mod error;

pub use connection::{OrderEventStream, StreamConfig, StreamState};
pub use error::{StreamError, StreamResult};
