use super::{to_exchange_symbol, BinanceClient, MarketData, MarketDataError};
use crate::indicators::{latest_readings, IndicatorConfig};
use crate::models::IndicatorReadings;
use async_trait::async_trait;

/// Market data for one instrument backed by Binance candles
///
/// Readings are recomputed from the last `candle_limit` closes on every call.
pub struct BinanceMarketData {
    client: BinanceClient,
    symbol: String,
    timeframe: String,
    candle_limit: usize,
    indicators: IndicatorConfig,
}

impl BinanceMarketData {
    /// # Arguments
    /// * `symbol` - Trading pair in either `BTC/USDT` or `BTCUSDT` form
    /// * `timeframe` - Candle interval, e.g. `1h`
    pub fn new(
        client: BinanceClient,
        symbol: &str,
        timeframe: &str,
        candle_limit: usize,
        indicators: IndicatorConfig,
    ) -> Self {
        Self {
            client,
            symbol: to_exchange_symbol(symbol),
            timeframe: timeframe.to_string(),
            candle_limit,
            indicators,
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }
}

#[async_trait]
impl MarketData for BinanceMarketData {
    async fn latest_indicator_readings(&self) -> Result<IndicatorReadings, MarketDataError> {
        let candles = self
            .client
            .get_klines(&self.symbol, &self.timeframe, self.candle_limit)
            .await?;

        let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();

        let readings = latest_readings(&closes, &self.indicators).ok_or(
            MarketDataError::InsufficientData {
                needed: self.indicators.min_prices_required(),
                got: closes.len(),
            },
        )?;

        tracing::debug!(
            rsi = readings.rsi,
            macd = readings.macd_line,
            signal = readings.signal_line,
            short_ema = readings.short_ema,
            long_ema = readings.long_ema,
            "Indicator readings"
        );

        Ok(readings)
    }

    async fn current_price(&self) -> Result<f64, MarketDataError> {
        self.client.get_price(&self.symbol).await
    }
}
