use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Directional recommendation
///
/// Declaration order is the aggregation tie-break order: Buy, then Sell, then Hold.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Buy,
    Sell,
    Hold,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Buy => write!(f, "buy"),
            Action::Sell => write!(f, "sell"),
            Action::Hold => write!(f, "hold"),
        }
    }
}

/// Trading signal with a confidence weight
///
/// Immutable once built. `confidence` is always within [0, 1].
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TradingSignal {
    action: Action,
    confidence: f64,
    reason: String,
}

impl TradingSignal {
    /// Build a signal, clamping confidence into the unit interval (NaN becomes 0)
    pub fn new(action: Action, confidence: f64, reason: impl Into<String>) -> Self {
        let confidence = if confidence.is_nan() {
            0.0
        } else {
            confidence.clamp(0.0, 1.0)
        };

        Self {
            action,
            confidence,
            reason: reason.into(),
        }
    }

    pub fn action(&self) -> Action {
        self.action
    }

    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    /// Human-readable explanation, informational only
    pub fn reason(&self) -> &str {
        &self.reason
    }
}

/// Latest indicator values for one evaluation cycle
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct IndicatorReadings {
    pub rsi: f64,
    pub macd_line: f64,
    pub signal_line: f64,
    pub short_ema: f64,
    pub long_ema: f64,
}

/// OHLCV candlestick data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candle {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderSide::Buy => write!(f, "buy"),
            OrderSide::Sell => write!(f, "sell"),
        }
    }
}

/// Filled market order as reported by the execution gateway
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub symbol: String,
    pub side: OrderSide,
    pub price: f64,
    pub amount: f64,
    pub timestamp: DateTime<Utc>,
}

/// Position tracked by the execution gateway
///
/// Read-only from the engine's point of view; only the gateway closes it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenPosition {
    pub id: String,
    pub side: OrderSide,
    pub entry_price: Option<f64>, // None until the venue reports a fill price
    pub amount: f64,
    pub opened_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signal_confidence_is_clamped() {
        let high = TradingSignal::new(Action::Buy, 1.7, "too sure");
        let low = TradingSignal::new(Action::Sell, -0.2, "negative");
        let nan = TradingSignal::new(Action::Hold, f64::NAN, "nan");

        assert_eq!(high.confidence(), 1.0);
        assert_eq!(low.confidence(), 0.0);
        assert_eq!(nan.confidence(), 0.0);
    }

    #[test]
    fn test_signal_accessors() {
        let signal = TradingSignal::new(Action::Sell, 0.8, "RSI overbought (75.00)");

        assert_eq!(signal.action(), Action::Sell);
        assert_eq!(signal.confidence(), 0.8);
        assert_eq!(signal.reason(), "RSI overbought (75.00)");
    }

    #[test]
    fn test_action_serializes_lowercase() {
        let signal = TradingSignal::new(Action::Buy, 0.7, "MACD above signal line");
        let json = serde_json::to_string(&signal).unwrap();

        assert!(json.contains("\"action\":\"buy\""));
    }
}
