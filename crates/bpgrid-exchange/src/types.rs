//! Typed request and response payloads for the instructions the strategy
//! actually uses. Everything else stays `serde_json::Value` through
//! `ExchangeClient::call`.

use bpgrid_core::{OrderType, Price, Qty, Side, TimeInForce};
use serde::Deserialize;
use std::collections::BTreeMap;

/// Subset of the ticker payload the strategy reads.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticker {
    pub last_price: Price,
}

/// A resting order as the exchange reports it.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenOrder {
    #[serde(default)]
    pub client_id: Option<i64>,
    pub side: Side,
    pub price: Price,
    pub quantity: Qty,
    #[serde(default)]
    pub status: Option<String>,
}

/// Parameters for a limit `orderExecute` call.
#[derive(Debug, Clone)]
pub struct OrderRequest {
    pub symbol: String,
    pub client_id: i64,
    pub side: Side,
    pub price: Price,
    pub quantity: Qty,
    /// Decimal places the market accepts for `price`.
    pub price_decimals: u32,
}

impl OrderRequest {
    /// Wire parameters; `BTreeMap` keeps them in canonical signing order.
    pub fn to_params(&self) -> BTreeMap<String, String> {
        let mut params = BTreeMap::new();
        params.insert("clientId".to_string(), self.client_id.to_string());
        params.insert("orderType".to_string(), OrderType::Limit.to_string());
        params.insert(
            "price".to_string(),
            self.price.format_fixed(self.price_decimals),
        );
        params.insert("quantity".to_string(), self.quantity.to_string());
        params.insert("side".to_string(), self.side.to_string());
        params.insert("symbol".to_string(), self.symbol.clone());
        params.insert(
            "timeInForce".to_string(),
            TimeInForce::GoodTilCancelled.to_string(),
        );
        params
    }
}
