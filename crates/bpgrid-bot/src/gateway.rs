//! REST-backed implementation of the engine's exchange gateway.
//!
//! Adapts `ExchangeClient` to the `OrderGateway` trait the engine is
//! written against, and owns the price formatting the wire expects.

use bpgrid_core::Price;
use bpgrid_engine::{BoxFuture, EngineError, EngineResult, GridOrder, OrderGateway};
use bpgrid_exchange::{ExchangeClient, ExchangeError, OrderRequest};
use std::sync::Arc;

pub struct RestGateway {
    client: Arc<ExchangeClient>,
    price_decimals: u32,
}

impl RestGateway {
    pub fn new(client: Arc<ExchangeClient>, price_decimals: u32) -> Self {
        Self {
            client,
            price_decimals,
        }
    }
}

impl OrderGateway for RestGateway {
    fn last_price<'a>(&'a self, symbol: &'a str) -> BoxFuture<'a, EngineResult<Price>> {
        Box::pin(async move {
            let ticker = self.client.ticker(symbol).await.map_err(to_engine_error)?;
            Ok(ticker.last_price)
        })
    }

    fn cancel_all<'a>(&'a self, symbol: &'a str) -> BoxFuture<'a, EngineResult<()>> {
        Box::pin(async move {
            self.client
                .order_cancel_all(symbol)
                .await
                .map_err(to_engine_error)
        })
    }

    fn has_open_order<'a>(
        &'a self,
        symbol: &'a str,
        client_id: i64,
    ) -> BoxFuture<'a, EngineResult<bool>> {
        Box::pin(async move {
            let order = self
                .client
                .order_query(symbol, client_id)
                .await
                .map_err(to_engine_error)?;
            Ok(order.is_some())
        })
    }

    fn place_limit<'a>(
        &'a self,
        symbol: &'a str,
        order: &'a GridOrder,
    ) -> BoxFuture<'a, EngineResult<()>> {
        Box::pin(async move {
            let request = OrderRequest {
                symbol: symbol.to_string(),
                client_id: order.client_id,
                side: order.side,
                price: order.price,
                quantity: order.quantity,
                price_decimals: self.price_decimals,
            };
            self.client
                .order_execute(&request)
                .await
                .map(|_| ())
                .map_err(to_engine_error)
        })
    }
}

fn to_engine_error(err: ExchangeError) -> EngineError {
    EngineError::Gateway(err.to_string())
}
