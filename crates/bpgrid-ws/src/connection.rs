//! Order-update stream connection lifecycle.
//!
//! One task owns the socket: it connects, sends a signed SUBSCRIBE for the
//! order-update channel, forwards recognized events, and on any session
//! end sleeps a fixed delay and reconnects. Ownership by a single loop is
//! what guarantees at most one live subscription: a socket is created,
//! used, and dropped inside one iteration, so a stale socket can never
//! deliver events after a restart.

use crate::error::{StreamError, StreamResult};
use bpgrid_core::OrderUpdate;
use bpgrid_exchange::RequestSigner;
use chrono::Utc;
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use parking_lot::RwLock;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

const DEFAULT_WS_URL: &str = "wss://ws.backpack.exchange";
const DEFAULT_RECONNECT_DELAY_MS: u64 = 10_000;
const DEFAULT_WINDOW_MS: u64 = 5_000;

/// Channel carrying account order-lifecycle events.
const ORDER_UPDATE_CHANNEL: &str = "account.orderUpdate";
/// Instruction name signed into the subscription payload.
const SUBSCRIBE_INSTRUCTION: &str = "subscribe";
/// Server error message meaning the subscription signature aged out and
/// a fresh one must be sent on the live socket.
const SIGNATURE_EXPIRED_MESSAGE: &str = "Signature expired";

type WsSink = SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, Message>;

/// Stream configuration.
#[derive(Debug, Clone)]
pub struct StreamConfig {
    /// WebSocket URL.
    pub url: String,
    /// Fixed delay before rebuilding a dead socket. No backoff growth and
    /// no retry ceiling: exchange-side disconnects are assumed transient.
    pub reconnect_delay_ms: u64,
    /// Signature validity window in milliseconds.
    pub window_ms: u64,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_WS_URL.to_string(),
            reconnect_delay_ms: DEFAULT_RECONNECT_DELAY_MS,
            window_ms: DEFAULT_WINDOW_MS,
        }
    }
}

/// Stream connection state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    Disconnected,
    Connecting,
    Subscribed,
}

/// Self-healing order-update subscription.
pub struct OrderEventStream {
    config: StreamConfig,
    signer: Arc<RequestSigner>,
    state: Arc<RwLock<StreamState>>,
    event_tx: mpsc::Sender<OrderUpdate>,
    shutdown_token: CancellationToken,
}

impl OrderEventStream {
    /// Create a new stream delivering events into `event_tx`.
    pub fn new(
        config: StreamConfig,
        signer: Arc<RequestSigner>,
        event_tx: mpsc::Sender<OrderUpdate>,
    ) -> Self {
        Self {
            config,
            signer,
            state: Arc::new(RwLock::new(StreamState::Disconnected)),
            event_tx,
            shutdown_token: CancellationToken::new(),
        }
    }

    /// Current connection state.
    pub fn state(&self) -> StreamState {
        *self.state.read()
    }

    /// Signal graceful shutdown; `run` exits after the current session.
    pub fn shutdown(&self) {
        info!("Order event stream shutdown requested");
        self.shutdown_token.cancel();
    }

    /// Run the stream until shutdown. Never gives up on its own: every
    /// session end is followed by a fixed-delay reconnect.
    pub async fn run(&self) {
        loop {
            if self.shutdown_token.is_cancelled() {
                *self.state.write() = StreamState::Disconnected;
                return;
            }

            *self.state.write() = StreamState::Connecting;
            match self.run_session().await {
                Ok(()) => info!("Order update session ended"),
                Err(e) => warn!(error = %e, "Order update session failed"),
            }
            *self.state.write() = StreamState::Disconnected;

            tokio::select! {
                () = tokio::time::sleep(Duration::from_millis(self.config.reconnect_delay_ms)) => {}
                () = self.shutdown_token.cancelled() => {
                    info!("Shutdown requested during reconnect delay");
                    return;
                }
            }
        }
    }

    /// One socket lifetime: connect, subscribe, pump messages until the
    /// peer closes or the transport fails.
    async fn run_session(&self) -> StreamResult<()> {
        info!(url = %self.config.url, "Connecting to order update stream");
        let (ws_stream, _response) = connect_async(&self.config.url).await?;
        let (mut write, mut read) = ws_stream.split();

        write
            .send(Message::Text(self.subscribe_message()))
            .await?;
        *self.state.write() = StreamState::Subscribed;
        info!(channel = ORDER_UPDATE_CHANNEL, "Subscription sent");

        loop {
            tokio::select! {
                () = self.shutdown_token.cancelled() => {
                    let _ = write.send(Message::Close(None)).await;
                    return Ok(());
                }

                msg = read.next() => {
                    match msg {
                        Some(Ok(Message::Text(text))) => {
                            self.handle_text(&text, &mut write).await?;
                        }
                        Some(Ok(Message::Ping(data))) => {
                            write.send(Message::Pong(data)).await?;
                        }
                        Some(Ok(Message::Close(frame))) => {
                            let (code, reason) = frame
                                .map(|f| (f.code.into(), f.reason.to_string()))
                                .unwrap_or((1000, "Normal close".to_string()));
                            warn!(code, %reason, "Order update stream closed by server");
                            return Err(StreamError::ConnectionClosed { code, reason });
                        }
                        Some(Err(e)) => {
                            // The transport error itself ends the session;
                            // the outer loop owns the reconnect.
                            return Err(e.into());
                        }
                        None => {
                            warn!("Order update stream ended");
                            return Ok(());
                        }
                        _ => {}
                    }
                }
            }
        }
    }

    async fn handle_text(&self, text: &str, write: &mut WsSink) -> StreamResult<()> {
        let frame: Value = match serde_json::from_str(text) {
            Ok(value) => value,
            Err(_) => {
                warn!(frame = %text, "Dropping non-JSON frame");
                return Ok(());
            }
        };

        if let Some(data) = frame.get("data") {
            match OrderUpdate::from_data(data) {
                Some(OrderUpdate::Unrecognized { kind }) => {
                    debug!(kind = %kind, "Ignoring unrecognized order event");
                }
                Some(event) => {
                    if self.event_tx.send(event).await.is_err() {
                        warn!("Order event receiver dropped");
                    }
                }
                None => {
                    warn!(frame = %text, "Dropping malformed order event");
                }
            }
        } else if let Some(error) = frame.get("error") {
            let message = error
                .get("message")
                .and_then(|m| m.as_str())
                .unwrap_or_default();
            if message == SIGNATURE_EXPIRED_MESSAGE {
                // Renew the subscription in place; no reconnect needed.
                warn!("Subscription signature expired, resubscribing");
                write
                    .send(Message::Text(self.subscribe_message()))
                    .await?;
            } else {
                warn!(%message, "Order update stream reported an error");
            }
        } else {
            warn!(frame = %text, "Dropping frame of unexpected shape");
        }

        Ok(())
    }

    /// Freshly signed SUBSCRIBE payload. Reuses the REST signing
    /// primitive with the literal `subscribe` instruction and no params.
    fn subscribe_message(&self) -> String {
        let timestamp = Utc::now().timestamp_millis();
        let signature = self.signer.sign(
            SUBSCRIBE_INSTRUCTION,
            &BTreeMap::new(),
            timestamp,
            self.config.window_ms,
        );

        json!({
            "method": "SUBSCRIBE",
            "params": [ORDER_UPDATE_CHANNEL],
            "signature": [
                self.signer.api_key(),
                signature,
                timestamp.to_string(),
                self.config.window_ms.to_string(),
            ],
        })
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};

    fn test_stream() -> (OrderEventStream, mpsc::Receiver<OrderUpdate>) {
        let signer =
            Arc::new(RequestSigner::new("test-api-key", &BASE64.encode([3u8; 32])).unwrap());
        let (tx, rx) = mpsc::channel(16);
        (
            OrderEventStream::new(StreamConfig::default(), signer, tx),
            rx,
        )
    }

    #[test]
    fn test_default_config() {
        let config = StreamConfig::default();
        assert_eq!(config.url, "wss://ws.backpack.exchange");
        assert_eq!(config.reconnect_delay_ms, 10_000);
        assert_eq!(config.window_ms, 5_000);
    }

    #[test]
    fn test_subscribe_message_shape() {
        let (stream, _rx) = test_stream();
        let message: Value = serde_json::from_str(&stream.subscribe_message()).unwrap();

        assert_eq!(message["method"], "SUBSCRIBE");
        assert_eq!(message["params"][0], "account.orderUpdate");

        let signature = message["signature"].as_array().unwrap();
        assert_eq!(signature.len(), 4);
        assert_eq!(signature[0], "test-api-key");
        // Timestamp and window travel as strings.
        assert!(signature[2].as_str().unwrap().parse::<i64>().is_ok());
        assert_eq!(signature[3], "5000");
    }

    #[test]
    fn test_initial_state_disconnected() {
        let (stream, _rx) = test_stream();
        assert_eq!(stream.state(), StreamState::Disconnected);
    }
}
