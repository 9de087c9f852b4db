//! Application error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Signer error: {0}")]
    Signer(#[from] bpgrid_exchange::SignerError),

    #[error("Exchange error: {0}")]
    Exchange(#[from] bpgrid_exchange::ExchangeError),

    #[error("Engine error: {0}")]
    Engine(#[from] bpgrid_engine::EngineError),

    #[error("Notifier error: {0}")]
    Notify(#[from] crate::notifier::NotifyError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type AppResult<T> = Result<T, AppError>;
