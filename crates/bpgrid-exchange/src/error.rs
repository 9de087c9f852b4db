//! Error types for the exchange client.

use crate::signer::SignerError;
use thiserror::Error;

/// Exchange client errors.
#[derive(Debug, Error)]
pub enum ExchangeError {
    /// The exchange returned a structured error envelope.
    #[error("Exchange rejected request: {messages} (url={url}, body={body})")]
    Rejected {
        status: u16,
        messages: String,
        url: String,
        body: String,
    },

    /// The error envelope was present but carried no recognizable entries.
    #[error("Unknown exchange error (url={url})")]
    Unknown { url: String },

    /// Non-success HTTP status without a structured envelope.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Signer error: {0}")]
    Signer(#[from] SignerError),

    /// A call exhausted its retry budget; wraps the final failure.
    #[error("{instruction} failed after {attempts} attempt(s): {source}")]
    RequestFailed {
        instruction: &'static str,
        attempts: u32,
        #[source]
        source: Box<ExchangeError>,
    },
}

impl ExchangeError {
    /// Whether this failure is the exchange saying "no such resource".
    ///
    /// `orderQuery` uses this to report an absent order as an answer
    /// rather than a fault.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::Http { status: 404, .. } | Self::Rejected { status: 404, .. }
        )
    }
}

/// Result type alias for exchange operations.
pub type ExchangeResult<T> = Result<T, ExchangeError>;
