//! Engine error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid grid configuration: {0}")]
    InvalidConfig(String),

    /// Failure reported by the exchange gateway.
    #[error("Gateway error: {0}")]
    Gateway(String),
}

pub type EngineResult<T> = Result<T, EngineError>;
