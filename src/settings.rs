use ::config::{Config, Environment};
use serde::Deserialize;

use crate::execution::{OrderSizing, PaperConfig};
use crate::indicators::IndicatorConfig;
use crate::risk::RiskConfig;
use crate::strategy::SignalConfig;

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("failed to load settings: {0}")]
    Load(#[from] ::config::ConfigError),

    #[error("invalid settings: {0}")]
    Invalid(String),
}

/// Bot settings, one field per environment variable (`TRADING_SYMBOL` → `trading_symbol`)
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub trading_symbol: String,
    pub trading_timeframe: String,
    pub base_order_size: f64,
    pub max_order_size: f64,
    pub max_open_positions: usize,
    pub stop_loss_percentage: f64,
    pub take_profit_percentage: f64,
    pub confidence_threshold: f64,
    pub rsi_period: usize,
    pub rsi_oversold: f64,
    pub rsi_overbought: f64,
    pub macd_fast_period: usize,
    pub macd_slow_period: usize,
    pub macd_signal_period: usize,
    pub ema_short_period: usize,
    pub ema_long_period: usize,
    pub candle_limit: usize,
    pub exchange_base_url: String,
    pub paper_quote_balance: f64,
    pub paper_base_balance: f64,
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            trading_symbol: "BTC/USDT".to_string(),
            trading_timeframe: "1h".to_string(),
            base_order_size: 0.001,
            max_order_size: 0.01,
            max_open_positions: 3,
            stop_loss_percentage: 2.0,
            take_profit_percentage: 4.0,
            confidence_threshold: 0.7,
            rsi_period: 14,
            rsi_oversold: 30.0,
            rsi_overbought: 70.0,
            macd_fast_period: 12,
            macd_slow_period: 26,
            macd_signal_period: 9,
            ema_short_period: 9,
            ema_long_period: 21,
            candle_limit: 100,
            exchange_base_url: "https://api.binance.com".to_string(),
            paper_quote_balance: 10_000.0,
            paper_base_balance: 0.0,
            log_level: "info".to_string(),
        }
    }
}

impl Settings {
    /// Load from the process environment and validate
    ///
    /// Call `dotenvy::dotenv()` first to pick up a `.env` file.
    pub fn from_env() -> Result<Self, SettingsError> {
        Self::from_source(Environment::default())
    }

    pub fn from_source(source: Environment) -> Result<Self, SettingsError> {
        let settings: Settings = Config::builder()
            .add_source(source.try_parsing(true))
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        let invalid = |msg: String| Err(SettingsError::Invalid(msg));

        if self.trading_symbol.trim().is_empty() {
            return invalid("TRADING_SYMBOL is empty".into());
        }
        if self.rsi_oversold >= self.rsi_overbought {
            return invalid(format!(
                "RSI_OVERSOLD ({}) must be below RSI_OVERBOUGHT ({})",
                self.rsi_oversold, self.rsi_overbought
            ));
        }
        if self.stop_loss_percentage <= 0.0 || self.take_profit_percentage <= 0.0 {
            return invalid("stop-loss and take-profit percentages must be positive".into());
        }
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return invalid(format!(
                "CONFIDENCE_THRESHOLD ({}) must be within [0, 1]",
                self.confidence_threshold
            ));
        }
        if self.base_order_size <= 0.0 || self.max_order_size <= 0.0 {
            return invalid("order sizes must be positive".into());
        }

        let periods = [
            ("RSI_PERIOD", self.rsi_period),
            ("MACD_FAST_PERIOD", self.macd_fast_period),
            ("MACD_SLOW_PERIOD", self.macd_slow_period),
            ("MACD_SIGNAL_PERIOD", self.macd_signal_period),
            ("EMA_SHORT_PERIOD", self.ema_short_period),
            ("EMA_LONG_PERIOD", self.ema_long_period),
        ];
        if let Some((name, _)) = periods.iter().find(|(_, p)| *p == 0) {
            return invalid(format!("{} must be positive", name));
        }
        if self.macd_fast_period >= self.macd_slow_period {
            return invalid("MACD_FAST_PERIOD must be below MACD_SLOW_PERIOD".into());
        }
        if self.ema_short_period >= self.ema_long_period {
            return invalid("EMA_SHORT_PERIOD must be below EMA_LONG_PERIOD".into());
        }

        let needed = self.indicator_config().min_prices_required();
        if self.candle_limit < needed {
            return invalid(format!(
                "CANDLE_LIMIT ({}) is below the {} candles the indicators need",
                self.candle_limit, needed
            ));
        }

        Ok(())
    }

    pub fn indicator_config(&self) -> IndicatorConfig {
        IndicatorConfig {
            rsi_period: self.rsi_period,
            macd_fast_period: self.macd_fast_period,
            macd_slow_period: self.macd_slow_period,
            macd_signal_period: self.macd_signal_period,
            ema_short_period: self.ema_short_period,
            ema_long_period: self.ema_long_period,
        }
    }

    pub fn signal_config(&self) -> SignalConfig {
        SignalConfig {
            rsi_oversold: self.rsi_oversold,
            rsi_overbought: self.rsi_overbought,
        }
    }

    pub fn risk_config(&self) -> RiskConfig {
        RiskConfig {
            stop_loss_pct: self.stop_loss_percentage,
            take_profit_pct: self.take_profit_percentage,
        }
    }

    pub fn order_sizing(&self) -> OrderSizing {
        OrderSizing {
            confidence_threshold: self.confidence_threshold,
            base_order_size: self.base_order_size,
            max_order_size: self.max_order_size,
        }
    }

    pub fn paper_config(&self) -> PaperConfig {
        PaperConfig {
            symbol: self.trading_symbol.clone(),
            sizing: self.order_sizing(),
            max_open_positions: self.max_open_positions,
            quote_balance: self.paper_quote_balance,
            base_balance: self.paper_base_balance,
        }
    }
}
