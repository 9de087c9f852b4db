//! Application configuration.
//!
//! Strategy and connection tuning come from a TOML file; credentials come
//! from the environment only, so they never land in a config file or the
//! repository.

use crate::error::{AppError, AppResult};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Environment variable holding the account API key.
pub const API_KEY_ENV: &str = "BACKPACK_API_KEY";
/// Environment variable holding the base64-encoded Ed25519 seed.
pub const API_SECRET_ENV: &str = "BACKPACK_API_SECRET";

const TELEGRAM_TOKEN_ENV: &str = "TELEGRAM_BOT_API_TOKEN";
const TELEGRAM_CHAT_ENV: &str = "TELEGRAM_TARGET_CHAT_ID";

/// Bot configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotConfig {
    /// Market symbol, e.g. "SOL_USDC".
    pub symbol: String,
    /// Lower bound of the grid price range.
    pub lower_price: Decimal,
    /// Upper bound of the grid price range (exclusive: no slot sits on it).
    pub upper_price: Decimal,
    /// Decimal places the market accepts for prices.
    pub price_decimals: u32,
    /// Number of ladder slots.
    pub grid_count: usize,
    /// Quantity placed at every slot.
    pub quantity_per_grid: Decimal,
    /// Exchange connection tuning.
    #[serde(default)]
    pub exchange: ExchangeConfig,
    /// Status notification tuning.
    #[serde(default)]
    pub notify: NotifyConfig,
}

/// Exchange connection tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExchangeConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_ws_url")]
    pub ws_url: String,
    /// Signature validity window (ms).
    #[serde(default = "default_window_ms")]
    pub window_ms: u64,
    /// REST retries after the initial attempt.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Base REST backoff delay (ms); jittered to 1x-2x.
    #[serde(default = "default_backoff_base_ms")]
    pub backoff_base_ms: u64,
    /// Fixed WebSocket reconnect delay (ms).
    #[serde(default = "default_reconnect_delay_ms")]
    pub reconnect_delay_ms: u64,
    /// Wait after the bulk cancel before initial placement (ms).
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,
}

fn default_base_url() -> String {
    "https://api.backpack.exchange".to_string()
}

fn default_ws_url() -> String {
    "wss://ws.backpack.exchange".to_string()
}

fn default_window_ms() -> u64 {
    5_000
}

fn default_max_retries() -> u32 {
    3
}

fn default_backoff_base_ms() -> u64 {
    5_000
}

fn default_reconnect_delay_ms() -> u64 {
    10_000
}

fn default_settle_delay_ms() -> u64 {
    3_000
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            ws_url: default_ws_url(),
            window_ms: default_window_ms(),
            max_retries: default_max_retries(),
            backoff_base_ms: default_backoff_base_ms(),
            reconnect_delay_ms: default_reconnect_delay_ms(),
            settle_delay_ms: default_settle_delay_ms(),
        }
    }
}

/// Status notification tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifyConfig {
    /// Interval between status messages (seconds).
    #[serde(default = "default_notify_interval_secs")]
    pub interval_secs: u64,
}

fn default_notify_interval_secs() -> u64 {
    3_600
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_notify_interval_secs(),
        }
    }
}

impl BotConfig {
    /// Load from a specific file.
    pub fn from_file(path: &str) -> AppResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("Failed to read config {path}: {e}")))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| AppError::Config(format!("Failed to parse config {path}: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.symbol.is_empty() {
            return Err(AppError::Config("symbol must be set".to_string()));
        }
        if self.lower_price >= self.upper_price {
            return Err(AppError::Config(format!(
                "lower_price {} must be below upper_price {}",
                self.lower_price, self.upper_price
            )));
        }
        if self.grid_count == 0 {
            return Err(AppError::Config("grid_count must be at least 1".to_string()));
        }
        if self.quantity_per_grid <= Decimal::ZERO {
            return Err(AppError::Config(format!(
                "quantity_per_grid must be positive, got {}",
                self.quantity_per_grid
            )));
        }
        Ok(())
    }
}

/// Account credentials, environment-only.
#[derive(Clone)]
pub struct Credentials {
    pub api_key: String,
    pub api_secret: String,
}

impl Credentials {
    pub fn from_env() -> AppResult<Self> {
        let api_key = required_env(API_KEY_ENV)?;
        let api_secret = required_env(API_SECRET_ENV)?;
        Ok(Self {
            api_key,
            api_secret,
        })
    }
}

fn required_env(name: &str) -> AppResult<String> {
    match std::env::var(name) {
        Ok(value) if !value.is_empty() => Ok(value),
        _ => Err(AppError::Config(format!(
            "Environment variable {name} must be set"
        ))),
    }
}

/// Telegram notifier settings, environment-only.
///
/// `None` when no token is configured: notifications are simply disabled.
pub struct TelegramSettings {
    pub token: String,
    pub chat_id: String,
}

impl TelegramSettings {
    pub fn from_env() -> Option<Self> {
        let token = std::env::var(TELEGRAM_TOKEN_ENV)
            .ok()
            .filter(|t| !t.is_empty())?;
        let chat_id = std::env::var(TELEGRAM_CHAT_ENV).unwrap_or_default();
        Some(Self { token, chat_id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn minimal_toml() -> &'static str {
        r#"
            symbol = "SOL_USDC"
            lower_price = "90000"
            upper_price = "110000"
            price_decimals = 2
            grid_count = 4
            quantity_per_grid = "0.01"
        "#
    }

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config: BotConfig = toml::from_str(minimal_toml()).unwrap();
        config.validate().unwrap();

        assert_eq!(config.symbol, "SOL_USDC");
        assert_eq!(config.lower_price, dec!(90000));
        assert_eq!(config.exchange.base_url, "https://api.backpack.exchange");
        assert_eq!(config.exchange.ws_url, "wss://ws.backpack.exchange");
        assert_eq!(config.exchange.window_ms, 5_000);
        assert_eq!(config.exchange.reconnect_delay_ms, 10_000);
        assert_eq!(config.notify.interval_secs, 3_600);
    }

    #[test]
    fn test_overridden_sections() {
        let toml_str = format!(
            "{}\n[exchange]\nreconnect_delay_ms = 500\n\n[notify]\ninterval_secs = 60\n",
            minimal_toml()
        );
        let config: BotConfig = toml::from_str(&toml_str).unwrap();

        assert_eq!(config.exchange.reconnect_delay_ms, 500);
        // Unspecified keys inside an overridden section still default.
        assert_eq!(config.exchange.max_retries, 3);
        assert_eq!(config.notify.interval_secs, 60);
    }

    #[test]
    fn test_validation_rejects_bad_ranges() {
        let mut config: BotConfig = toml::from_str(minimal_toml()).unwrap();
        config.lower_price = dec!(110000);
        assert!(config.validate().is_err());

        let mut config: BotConfig = toml::from_str(minimal_toml()).unwrap();
        config.grid_count = 0;
        assert!(config.validate().is_err());

        let mut config: BotConfig = toml::from_str(minimal_toml()).unwrap();
        config.quantity_per_grid = dec!(0);
        assert!(config.validate().is_err());
    }
}
