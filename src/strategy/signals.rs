use crate::models::{Action, TradingSignal};

const RSI_CONFIDENCE: f64 = 0.8;
const MACD_CONFIDENCE: f64 = 0.7;
const EMA_CONFIDENCE: f64 = 0.6;
const NEUTRAL_CONFIDENCE: f64 = 0.5;

/// Thresholds for signal extraction
#[derive(Debug, Clone)]
pub struct SignalConfig {
    pub rsi_oversold: f64,
    pub rsi_overbought: f64,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            rsi_oversold: 30.0,
            rsi_overbought: 70.0,
        }
    }
}

/// RSI extractor
///
/// Both thresholds are inclusive: `rsi <= oversold` buys, `rsi >= overbought` sells.
pub fn analyze_rsi(rsi: f64, config: &SignalConfig) -> TradingSignal {
    if rsi <= config.rsi_oversold {
        TradingSignal::new(Action::Buy, RSI_CONFIDENCE, format!("RSI oversold ({:.2})", rsi))
    } else if rsi >= config.rsi_overbought {
        TradingSignal::new(
            Action::Sell,
            RSI_CONFIDENCE,
            format!("RSI overbought ({:.2})", rsi),
        )
    } else {
        TradingSignal::new(
            Action::Hold,
            NEUTRAL_CONFIDENCE,
            format!("RSI neutral ({:.2})", rsi),
        )
    }
}

/// MACD extractor: MACD line relative to its signal line
pub fn analyze_macd(macd_line: f64, signal_line: f64) -> TradingSignal {
    if macd_line > signal_line {
        TradingSignal::new(Action::Buy, MACD_CONFIDENCE, "MACD above signal line")
    } else if macd_line < signal_line {
        TradingSignal::new(Action::Sell, MACD_CONFIDENCE, "MACD below signal line")
    } else {
        TradingSignal::new(Action::Hold, NEUTRAL_CONFIDENCE, "MACD neutral")
    }
}

/// EMA crossover extractor: short EMA relative to long EMA
pub fn analyze_ema_cross(short_ema: f64, long_ema: f64) -> TradingSignal {
    if short_ema > long_ema {
        TradingSignal::new(Action::Buy, EMA_CONFIDENCE, "Short EMA above Long EMA")
    } else if short_ema < long_ema {
        TradingSignal::new(Action::Sell, EMA_CONFIDENCE, "Short EMA below Long EMA")
    } else {
        TradingSignal::new(Action::Hold, NEUTRAL_CONFIDENCE, "EMA neutral")
    }
}
