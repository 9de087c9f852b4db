//! WebSocket stream error types.
//!
//! These drive the reconnect loop internally and never reach the
//! strategy layer.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StreamError {
    #[error("Connection closed: code={code}, reason={reason}")]
    ConnectionClosed { code: u16, reason: String },

    #[error("Tungstenite error: {0}")]
    Tungstenite(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type StreamResult<T> = Result<T, StreamError>;
