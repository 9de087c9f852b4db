//! Grid order-management engine.
//!
//! Holds the in-memory price ladder, performs the initial placement, and
//! applies the replacement rule on every fill: a bid fill converts the
//! level above into an ask, an ask fill converts the level below into a
//! bid, keeping the ladder populated as price moves through it.
//!
//! The engine reaches the exchange only through the [`OrderGateway`]
//! trait, so it can be driven by the real REST client or a test double.

pub mod engine;
pub mod error;
pub mod gateway;
pub mod ladder;

pub use engine::{GridConfig, GridEngine};
pub use error::{EngineError, EngineResult};
pub use gateway::{BoxFuture, GridOrder, OrderGateway};
pub use ladder::{GridLadder, GridSlot};
