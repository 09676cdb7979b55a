// Technical indicators module
// Implements RSI, MA and MACD for technical analysis

pub mod macd;
pub mod moving_average;
pub mod rsi;

pub use macd::{calculate_macd, Macd};
pub use moving_average::{calculate_ema, calculate_ema_series, calculate_sma};
pub use rsi::calculate_rsi;

use crate::models::IndicatorReadings;

/// Indicator periods
#[derive(Debug, Clone)]
pub struct IndicatorConfig {
    pub rsi_period: usize,
    pub macd_fast_period: usize,
    pub macd_slow_period: usize,
    pub macd_signal_period: usize,
    pub ema_short_period: usize,
    pub ema_long_period: usize,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            rsi_period: 14,
            macd_fast_period: 12,
            macd_slow_period: 26,
            macd_signal_period: 9,
            ema_short_period: 9,
            ema_long_period: 21,
        }
    }
}

impl IndicatorConfig {
    /// Minimum number of closing prices needed to produce every reading
    pub fn min_prices_required(&self) -> usize {
        let macd = self.macd_slow_period + self.macd_signal_period.saturating_sub(1);
        let rsi = self.rsi_period + 1;
        macd.max(rsi).max(self.ema_long_period).max(self.ema_short_period)
    }
}

/// Compute the latest value of every indicator from closing prices
///
/// Returns `None` when there are fewer than `min_prices_required` closes.
pub fn latest_readings(closes: &[f64], config: &IndicatorConfig) -> Option<IndicatorReadings> {
    let rsi = calculate_rsi(closes, config.rsi_period)?;
    let macd = calculate_macd(
        closes,
        config.macd_fast_period,
        config.macd_slow_period,
        config.macd_signal_period,
    )?;
    let short_ema = calculate_ema(closes, config.ema_short_period)?;
    let long_ema = calculate_ema(closes, config.ema_long_period)?;

    Some(IndicatorReadings {
        rsi,
        macd_line: macd.macd,
        signal_line: macd.signal,
        short_ema,
        long_ema,
    })
}
