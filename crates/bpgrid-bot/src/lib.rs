//! Backpack grid trading bot application.
//!
//! Wires the exchange client, the order-update stream, and the grid
//! engine together, and owns the ambient concerns: configuration,
//! credentials, logging, and the periodic status notifier.

pub mod app;
pub mod config;
pub mod error;
pub mod gateway;
pub mod logging;
pub mod notifier;

pub use app::Application;
pub use config::BotConfig;
pub use error::{AppError, AppResult};
