// Trading strategy module
pub mod aggregator;
pub mod signals;

pub use aggregator::combine_signals;
pub use signals::{analyze_ema_cross, analyze_macd, analyze_rsi, SignalConfig};

use crate::models::{IndicatorReadings, TradingSignal};

/// Base trait for all trading strategies
pub trait Strategy: Send + Sync {
    /// Per-indicator signals for the given readings
    fn signals(&self, readings: &IndicatorReadings) -> Vec<TradingSignal>;

    /// Get strategy name
    fn name(&self) -> &str;

    /// Combined decision, `None` only if the strategy produced no signals
    fn evaluate(&self, readings: &IndicatorReadings) -> Option<TradingSignal> {
        combine_signals(&self.signals(readings))
    }
}

/// RSI + MACD + EMA crossover, combined by weighted vote
#[derive(Debug, Clone, Default)]
pub struct CombinedStrategy {
    config: SignalConfig,
}

impl CombinedStrategy {
    pub fn new(config: SignalConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SignalConfig {
        &self.config
    }
}

impl Strategy for CombinedStrategy {
    fn signals(&self, readings: &IndicatorReadings) -> Vec<TradingSignal> {
        let signals = vec![
            analyze_rsi(readings.rsi, &self.config),
            analyze_macd(readings.macd_line, readings.signal_line),
            analyze_ema_cross(readings.short_ema, readings.long_ema),
        ];

        for signal in &signals {
            tracing::debug!(
                action = %signal.action(),
                confidence = signal.confidence(),
                "{}",
                signal.reason()
            );
        }

        signals
    }

    fn name(&self) -> &str {
        "CombinedStrategy"
    }
}
