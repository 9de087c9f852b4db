//! Application wiring and lifecycle.
//!
//! Builds signer -> client -> gateway -> engine, lays out the initial
//! ladder (fatal on failure: there is nothing to run without it), then
//! keeps three tasks alive until ctrl-c:
//! - the order-update stream
//! - a single consumer draining stream events into the engine, which is
//!   what serializes fill handling over the slot array
//! - the periodic status notifier, when a Telegram token is configured

use crate::config::{BotConfig, Credentials, TelegramSettings};
use crate::error::AppResult;
use crate::gateway::RestGateway;
use crate::notifier::{run_status_loop, TelegramNotifier};
use bpgrid_core::{Price, Qty};
use bpgrid_engine::{GridConfig, GridEngine};
use bpgrid_exchange::{ClientConfig, ExchangeClient, RequestSigner};
use bpgrid_ws::{OrderEventStream, StreamConfig};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Capacity of the order-event channel between the stream and the engine.
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Main application.
pub struct Application {
    config: BotConfig,
}

impl Application {
    pub fn new(config: BotConfig) -> AppResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Run until ctrl-c.
    pub async fn run(&self) -> AppResult<()> {
        let config = &self.config;

        let credentials = Credentials::from_env()?;
        let signer = RequestSigner::new(credentials.api_key, &credentials.api_secret)?;

        let client = Arc::new(ExchangeClient::new(
            signer.clone(),
            ClientConfig {
                base_url: config.exchange.base_url.clone(),
                window_ms: config.exchange.window_ms,
                max_retries: config.exchange.max_retries,
                backoff_base_ms: config.exchange.backoff_base_ms,
            },
        )?);

        let gateway = Arc::new(RestGateway::new(client.clone(), config.price_decimals));
        let engine = Arc::new(GridEngine::new(
            GridConfig {
                symbol: config.symbol.clone(),
                lower_price: Price::new(config.lower_price),
                upper_price: Price::new(config.upper_price),
                grid_count: config.grid_count,
                quantity: Qty::new(config.quantity_per_grid),
                settle_delay_ms: config.exchange.settle_delay_ms,
            },
            gateway,
        )?);

        engine.initialize().await?;

        let shutdown = CancellationToken::new();
        let (event_tx, mut event_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);

        let stream = Arc::new(OrderEventStream::new(
            StreamConfig {
                url: config.exchange.ws_url.clone(),
                reconnect_delay_ms: config.exchange.reconnect_delay_ms,
                window_ms: config.exchange.window_ms,
            },
            Arc::new(signer),
            event_tx,
        ));

        let stream_task = tokio::spawn({
            let stream = stream.clone();
            async move { stream.run().await }
        });

        let engine_task = tokio::spawn({
            let engine = engine.clone();
            async move {
                while let Some(event) = event_rx.recv().await {
                    engine.handle_event(event).await;
                }
            }
        });

        if let Some(telegram) = TelegramSettings::from_env() {
            let notifier = Arc::new(TelegramNotifier::new(telegram.token, telegram.chat_id)?);
            tokio::spawn(run_status_loop(
                client.clone(),
                config.symbol.clone(),
                Duration::from_secs(config.notify.interval_secs),
                notifier,
                shutdown.clone(),
            ));
            info!("Status notifications enabled");
        } else {
            info!("No Telegram token configured, status notifications disabled");
        }

        info!(symbol = %config.symbol, grid_count = config.grid_count, "Grid bot running");
        tokio::signal::ctrl_c().await?;
        info!("Shutdown signal received");

        shutdown.cancel();
        stream.shutdown();
        let _ = stream_task.await;
        engine_task.abort();

        Ok(())
    }
}
