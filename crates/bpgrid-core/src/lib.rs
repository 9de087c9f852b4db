//! Core domain types for the Backpack grid trading bot.
//!
//! This crate provides fundamental types used throughout the system:
//! - `Price`, `Qty`: precision-safe numeric types
//! - `Side`: order side (Bid/Ask) as the exchange spells it
//! - `OrderUpdate`: typed order-lifecycle events decoded from the wire

pub mod decimal;
pub mod error;
pub mod event;
pub mod order;

pub use decimal::{Price, Qty};
pub use error::{CoreError, Result};
pub use event::{FillEvent, OrderUpdate};
pub use order::{OrderType, Side, TimeInForce};
