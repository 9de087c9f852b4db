//! The exchange instruction table.
//!
//! Every REST operation is named by an instruction; the name is what gets
//! signed, and it maps to a fixed (HTTP method, path) pair. Public
//! instructions need no auth headers; private ones do.

use reqwest::Method;
use std::fmt;

/// A named exchange instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Instruction {
    // Public market data
    Assets,
    Markets,
    Ticker,
    Depth,
    Klines,
    Status,
    Ping,
    Time,
    Trades,
    // Private account and order operations
    BalanceQuery,
    DepositAddressQuery,
    DepositQueryAll,
    OrderHistoryQueryAll,
    FillHistoryQueryAll,
    OrderQuery,
    OrderExecute,
    OrderCancel,
    OrderQueryAll,
    OrderCancelAll,
    Withdraw,
    WithdrawalQueryAll,
}

impl Instruction {
    /// The signed instruction name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Assets => "assets",
            Self::Markets => "markets",
            Self::Ticker => "ticker",
            Self::Depth => "depth",
            Self::Klines => "klines",
            Self::Status => "status",
            Self::Ping => "ping",
            Self::Time => "time",
            Self::Trades => "trades",
            Self::BalanceQuery => "balanceQuery",
            Self::DepositAddressQuery => "depositAddressQuery",
            Self::DepositQueryAll => "depositQueryAll",
            Self::OrderHistoryQueryAll => "orderHistoryQueryAll",
            Self::FillHistoryQueryAll => "fillHistoryQueryAll",
            Self::OrderQuery => "orderQuery",
            Self::OrderExecute => "orderExecute",
            Self::OrderCancel => "orderCancel",
            Self::OrderQueryAll => "orderQueryAll",
            Self::OrderCancelAll => "orderCancelAll",
            Self::Withdraw => "withdraw",
            Self::WithdrawalQueryAll => "withdrawalQueryAll",
        }
    }

    /// HTTP method for this instruction.
    pub fn method(&self) -> Method {
        match self {
            Self::OrderExecute | Self::Withdraw => Method::POST,
            Self::OrderCancel | Self::OrderCancelAll => Method::DELETE,
            _ => Method::GET,
        }
    }

    /// Path relative to the REST base URL.
    pub fn path(&self) -> &'static str {
        match self {
            Self::Assets => "/api/v1/assets",
            Self::Markets => "/api/v1/markets",
            Self::Ticker => "/api/v1/ticker",
            Self::Depth => "/api/v1/depth",
            Self::Klines => "/api/v1/klines",
            Self::Status => "/api/v1/status",
            Self::Ping => "/api/v1/ping",
            Self::Time => "/api/v1/time",
            Self::Trades => "/api/v1/trades",
            Self::BalanceQuery => "/api/v1/capital",
            Self::DepositAddressQuery => "/wapi/v1/capital/deposit/address",
            Self::DepositQueryAll => "/wapi/v1/capital/deposits",
            Self::OrderHistoryQueryAll => "/wapi/v1/history/orders",
            Self::FillHistoryQueryAll => "/wapi/v1/history/fills",
            Self::OrderQuery | Self::OrderExecute | Self::OrderCancel => "/api/v1/order",
            Self::OrderQueryAll | Self::OrderCancelAll => "/api/v1/orders",
            Self::Withdraw | Self::WithdrawalQueryAll => "/wapi/v1/capital/withdrawals",
        }
    }

    /// Whether the instruction requires auth headers.
    pub fn is_private(&self) -> bool {
        !matches!(
            self,
            Self::Assets
                | Self::Markets
                | Self::Ticker
                | Self::Depth
                | Self::Klines
                | Self::Status
                | Self::Ping
                | Self::Time
                | Self::Trades
        )
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
