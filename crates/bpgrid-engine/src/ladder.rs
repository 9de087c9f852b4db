//! The grid price ladder.

use crate::error::{EngineError, EngineResult};
use bpgrid_core::{Price, Side};
use rust_decimal::Decimal;

/// One ladder position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridSlot {
    /// Stable identity, assigned in ascending price order; doubles as the
    /// exchange client order id.
    pub index: usize,
    /// Fixed for the slot's lifetime.
    pub price: Price,
    /// Side of the most recent placement at this slot; `None` until the
    /// first order goes out.
    pub side: Option<Side>,
}

/// Ordered slot array, price strictly increasing with index.
#[derive(Debug, Clone)]
pub struct GridLadder {
    slots: Vec<GridSlot>,
}

impl GridLadder {
    /// Build a ladder of `count` slots with prices
    /// `lower + i * (upper - lower) / count`.
    ///
    /// The upper bound itself is exclusive: `count` slots, not
    /// `count + 1`.
    pub fn build(lower: Price, upper: Price, count: usize) -> EngineResult<Self> {
        if count == 0 {
            return Err(EngineError::InvalidConfig(
                "grid count must be at least 1".to_string(),
            ));
        }
        if lower >= upper {
            return Err(EngineError::InvalidConfig(format!(
                "lower bound {lower} must be below upper bound {upper}"
            )));
        }

        let step = (upper - lower) / Decimal::from(count as u64);
        let slots = (0..count)
            .map(|index| GridSlot {
                index,
                price: lower + step * Decimal::from(index as u64),
                side: None,
            })
            .collect();

        Ok(Self { slots })
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn slots(&self) -> &[GridSlot] {
        &self.slots
    }

    pub fn slots_mut(&mut self) -> &mut [GridSlot] {
        &mut self.slots
    }

    pub fn slot(&self, index: usize) -> Option<&GridSlot> {
        self.slots.get(index)
    }

    pub fn slot_mut(&mut self, index: usize) -> Option<&mut GridSlot> {
        self.slots.get_mut(index)
    }
}
