// Market data collaborator: candles, indicator readings and the current price
pub mod binance;
pub mod feed;

pub use binance::{to_exchange_symbol, BinanceClient};
pub use feed::BinanceMarketData;

use crate::models::IndicatorReadings;
use async_trait::async_trait;

#[derive(Debug, thiserror::Error)]
pub enum MarketDataError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("exchange API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("insufficient data: {got} candles, need {needed}")]
    InsufficientData { needed: usize, got: usize },

    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// Source of indicator readings and prices for a single instrument
///
/// Any error is transient from the engine's point of view: it aborts the
/// current cycle only.
#[async_trait]
pub trait MarketData: Send + Sync {
    /// Latest value of every indicator the strategy consumes
    async fn latest_indicator_readings(&self) -> Result<IndicatorReadings, MarketDataError>;

    /// Last traded price
    async fn current_price(&self) -> Result<f64, MarketDataError>;
}
