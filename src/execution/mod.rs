// Order execution module
pub mod paper;
pub mod sizing;

pub use paper::{PaperConfig, PaperGateway};
pub use sizing::OrderSizing;

use crate::market::MarketDataError;
use crate::models::{OpenPosition, Order, TradingSignal};
use async_trait::async_trait;

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error(transparent)]
    MarketData(#[from] MarketDataError),

    #[error("order rejected: {0}")]
    Rejected(String),
}

/// Venue that places orders and owns position state
#[async_trait]
pub trait ExecutionGateway: Send + Sync {
    /// Place a market order for the decision
    ///
    /// Applies the confidence gate and size limits; `Ok(None)` means the
    /// gateway chose not to trade.
    async fn execute_trade(&self, decision: &TradingSignal) -> Result<Option<Order>, GatewayError>;

    async fn open_positions(&self) -> Result<Vec<OpenPosition>, GatewayError>;

    /// Close a position. `false` on failure, the position stays open.
    async fn cancel_position(&self, id: &str) -> bool;
}
