//! Signed REST client for the Backpack exchange.
//!
//! Provides:
//! - `RequestSigner`: Ed25519 request signing over the canonical
//!   instruction/parameter message
//! - `Instruction`: the fixed instruction -> (method, path) table, split
//!   into public and private calls
//! - `ExchangeClient`: the single network primitive with bounded retry,
//!   jittered backoff, and typed error envelope parsing

pub mod client;
pub mod error;
pub mod instruction;
pub mod signer;
pub mod types;

pub use client::{ApiResponse, ClientConfig, ExchangeClient};
pub use error::{ExchangeError, ExchangeResult};
pub use instruction::Instruction;
pub use signer::{RequestSigner, SignerError};
pub use types::{OpenOrder, OrderRequest, Ticker};
