//! Periodic human-readable status notifications.
//!
//! A read-only observer: every interval it snapshots the last price and
//! live order counts and pushes one message to the sink. The strategy
//! never depends on this succeeding; every failure is logged and
//! swallowed.

use bpgrid_core::Side;
use bpgrid_engine::BoxFuture;
use bpgrid_exchange::ExchangeClient;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

const TELEGRAM_API_BASE: &str = "https://api.telegram.org";

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Notification endpoint returned HTTP {0}")]
    Http(u16),

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Snapshot query failed: {0}")]
    Snapshot(#[from] bpgrid_exchange::ExchangeError),
}

/// Outbound notification sink.
pub trait Notifier: Send + Sync {
    /// Deliver one formatted message.
    fn notify<'a>(&'a self, text: &'a str) -> BoxFuture<'a, Result<(), NotifyError>>;
}

/// Telegram sink using the bot `sendMessage` endpoint.
pub struct TelegramNotifier {
    http: reqwest::Client,
    token: String,
    chat_id: String,
}

impl TelegramNotifier {
    pub fn new(token: String, chat_id: String) -> Result<Self, NotifyError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            http,
            token,
            chat_id,
        })
    }
}

impl Notifier for TelegramNotifier {
    fn notify<'a>(&'a self, text: &'a str) -> BoxFuture<'a, Result<(), NotifyError>> {
        Box::pin(async move {
            let url = format!("{TELEGRAM_API_BASE}/bot{}/sendMessage", self.token);
            let params = serde_json::json!({
                "chat_id": self.chat_id,
                "text": text,
                "parse_mode": "HTML",
            });

            let response = self.http.post(&url).json(&params).send().await?;
            if !response.status().is_success() {
                return Err(NotifyError::Http(response.status().as_u16()));
            }
            Ok(())
        })
    }
}

/// Compose the status line from a snapshot.
pub fn format_status(symbol: &str, last_price: &str, bids: usize, asks: usize) -> String {
    format!("<b>[{symbol}] {last_price}</b>\nBid: {bids} | Ask: {asks}")
}

/// Run the periodic status loop until shutdown.
pub async fn run_status_loop(
    client: Arc<ExchangeClient>,
    symbol: String,
    interval: Duration,
    notifier: Arc<dyn Notifier>,
    shutdown: CancellationToken,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    // The first tick fires immediately; skip it so the opening placements
    // settle before the first report.
    ticker.tick().await;

    loop {
        tokio::select! {
            () = shutdown.cancelled() => return,
            _ = ticker.tick() => {
                if let Err(err) = send_status(&client, &symbol, notifier.as_ref()).await {
                    error!(%symbol, error = %err, "Status notification failed");
                }
            }
        }
    }
}

async fn send_status(
    client: &ExchangeClient,
    symbol: &str,
    notifier: &dyn Notifier,
) -> Result<(), NotifyError> {
    let ticker = client.ticker(symbol).await?;
    let orders = client.order_query_all(symbol).await?;

    let bids = orders.iter().filter(|o| o.side == Side::Bid).count();
    let asks = orders.len() - bids;

    let text = format_status(symbol, &ticker.last_price.to_string(), bids, asks);
    notifier.notify(&text).await?;
    info!(%symbol, bids, asks, "Status notification sent");
    Ok(())
}
