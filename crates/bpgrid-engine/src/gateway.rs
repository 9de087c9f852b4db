//! Exchange gateway trait for the grid engine.
//!
//! Trait-based abstraction over the handful of exchange operations the
//! engine needs. This allows:
//! - dependency injection for testing
//! - keeping the engine free of transport concerns

use crate::error::EngineResult;
use bpgrid_core::{Price, Qty, Side};
use std::pin::Pin;

/// Boxed future for dyn-compatible async trait methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn std::future::Future<Output = T> + Send + 'a>>;

/// A limit order the engine asks the gateway to place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridOrder {
    /// Slot index, doubling as the exchange client order id.
    pub client_id: i64,
    pub side: Side,
    pub price: Price,
    pub quantity: Qty,
}

/// Exchange operations the grid engine depends on.
pub trait OrderGateway: Send + Sync {
    /// Last traded price for the symbol.
    fn last_price<'a>(&'a self, symbol: &'a str) -> BoxFuture<'a, EngineResult<Price>>;

    /// Cancel every resting order on the symbol. Must be idempotent.
    fn cancel_all<'a>(&'a self, symbol: &'a str) -> BoxFuture<'a, EngineResult<()>>;

    /// Whether an order with this client id is resting at the exchange.
    fn has_open_order<'a>(
        &'a self,
        symbol: &'a str,
        client_id: i64,
    ) -> BoxFuture<'a, EngineResult<bool>>;

    /// Place a limit order.
    fn place_limit<'a>(
        &'a self,
        symbol: &'a str,
        order: &'a GridOrder,
    ) -> BoxFuture<'a, EngineResult<()>>;
}
