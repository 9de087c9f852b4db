//! The grid engine: initial placement and the fill-replacement rule.

use crate::error::{EngineError, EngineResult};
use crate::gateway::{GridOrder, OrderGateway};
use crate::ladder::{GridLadder, GridSlot};
use bpgrid_core::{FillEvent, OrderUpdate, Price, Qty, Side};
use futures_util::future::join_all;
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};

/// Grid strategy configuration.
#[derive(Debug, Clone)]
pub struct GridConfig {
    pub symbol: String,
    pub lower_price: Price,
    pub upper_price: Price,
    pub grid_count: usize,
    /// Quantity placed at every slot.
    pub quantity: Qty,
    /// How long to wait after the bulk cancel before placing, so a cancel
    /// and a placement for the same client id are never in flight
    /// together.
    pub settle_delay_ms: u64,
}

impl GridConfig {
    pub fn validate(&self) -> EngineResult<()> {
        if self.symbol.is_empty() {
            return Err(EngineError::InvalidConfig("symbol must be set".to_string()));
        }
        if !self.quantity.is_positive() {
            return Err(EngineError::InvalidConfig(format!(
                "quantity per grid must be positive, got {}",
                self.quantity
            )));
        }
        Ok(())
    }
}

/// Grid order-management state machine.
///
/// The slot array is written by `initialize` (once) and by the fill
/// handler; a lock makes the single-writer assumption explicit instead of
/// relying on the runtime never overlapping handlers.
pub struct GridEngine {
    config: GridConfig,
    gateway: Arc<dyn OrderGateway>,
    ladder: RwLock<GridLadder>,
}

impl GridEngine {
    pub fn new(config: GridConfig, gateway: Arc<dyn OrderGateway>) -> EngineResult<Self> {
        config.validate()?;
        let ladder = GridLadder::build(config.lower_price, config.upper_price, config.grid_count)?;
        Ok(Self {
            config,
            gateway,
            ladder: RwLock::new(ladder),
        })
    }

    /// Snapshot of the slot array.
    pub fn slots(&self) -> Vec<GridSlot> {
        self.ladder.read().slots().to_vec()
    }

    /// Wipe the book for the symbol and lay out the full ladder.
    ///
    /// Failures here are fatal to the caller: without an initial ladder
    /// there is nothing for the strategy to do.
    pub async fn initialize(&self) -> EngineResult<()> {
        let symbol = self.config.symbol.as_str();

        info!(%symbol, "Cancelling resting orders before initial placement");
        self.gateway.cancel_all(symbol).await?;
        // The venue applies the bulk cancel asynchronously; give it time
        // before the same client ids are reused.
        tokio::time::sleep(Duration::from_millis(self.config.settle_delay_ms)).await;

        let market = self.gateway.last_price(symbol).await?;

        let orders: Vec<GridOrder> = {
            let mut ladder = self.ladder.write();
            ladder
                .slots_mut()
                .iter_mut()
                .map(|slot| {
                    let side = if slot.price < market {
                        Side::Bid
                    } else {
                        Side::Ask
                    };
                    slot.side = Some(side);
                    GridOrder {
                        client_id: slot.index as i64,
                        side,
                        price: slot.price,
                        quantity: self.config.quantity,
                    }
                })
                .collect()
        };

        info!(%symbol, %market, slots = orders.len(), "Placing initial grid");
        // Placements are independent (distinct client ids), so fire them
        // concurrently; each call retries on its own.
        let results = join_all(
            orders
                .iter()
                .map(|order| self.gateway.place_limit(symbol, order)),
        )
        .await;

        for (order, result) in orders.iter().zip(results) {
            result?;
            info!(
                %symbol,
                side = %order.side,
                price = %order.price,
                quantity = %order.quantity,
                client_id = order.client_id,
                "Grid order placed"
            );
        }
        Ok(())
    }

    /// Handle one stream event.
    ///
    /// Never propagates an error: a single failed rebalance must not take
    /// down the event loop or block subsequent fills.
    pub async fn handle_event(&self, event: OrderUpdate) {
        let fill = match event {
            OrderUpdate::Fill(fill) => fill,
            // Other lifecycle tags are observed but carry no behavior.
            _ => return,
        };

        if let Err(err) = self.replace_after_fill(&fill).await {
            error!(symbol = %self.config.symbol, error = %err, "Rebalance after fill failed");
        }
    }

    /// The replacement rule: a bid fill converts the level above into an
    /// ask, an ask fill converts the level below into a bid.
    async fn replace_after_fill(&self, fill: &FillEvent) -> EngineResult<()> {
        let index = fill.client_id.unwrap_or(-1);
        let count = self.config.grid_count as i64;

        // The outermost slot on each end is never replaced; the grid does
        // not extend past its configured bounds.
        if index < 1 || index >= count - 1 {
            debug!(index, "Fill outside replaceable range, ignoring");
            return Ok(());
        }

        // One grid level in the direction price just moved through.
        let neighbor = match fill.side {
            Side::Bid => index + 1,
            Side::Ask => index - 1,
        };

        let symbol = self.config.symbol.as_str();
        // The existence check is the only duplicate guard; it is not
        // atomic with the placement, so two near-simultaneous fills aimed
        // at the same neighbor can still race past it.
        if self.gateway.has_open_order(symbol, neighbor).await? {
            debug!(neighbor, "Neighbor slot already has a resting order");
            return Ok(());
        }

        let order = {
            let mut ladder = self.ladder.write();
            let Some(slot) = ladder.slot_mut(neighbor as usize) else {
                return Ok(());
            };
            let side = fill.side.opposite();
            slot.side = Some(side);
            GridOrder {
                client_id: neighbor,
                side,
                price: slot.price,
                quantity: self.config.quantity,
            }
        };

        self.gateway.place_limit(symbol, &order).await?;
        info!(
            %symbol,
            side = %order.side,
            price = %order.price,
            client_id = order.client_id,
            "Replacement order placed"
        );
        Ok(())
    }
}
