use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Notify;

use crate::execution::{ExecutionGateway, GatewayError};
use crate::market::{MarketData, MarketDataError};
use crate::models::{IndicatorReadings, OpenPosition, Order, OrderSide, TradingSignal};

pub fn bullish() -> IndicatorReadings {
    IndicatorReadings {
        rsi: 25.0,
        macd_line: 1.0,
        signal_line: 0.5,
        short_ema: 101.0,
        long_ema: 100.0,
    }
}

pub fn neutral() -> IndicatorReadings {
    IndicatorReadings {
        rsi: 50.0,
        macd_line: 0.0,
        signal_line: 0.0,
        short_ema: 100.0,
        long_ema: 100.0,
    }
}

/// Market with scripted readings and price; optionally blocks until released
pub struct StubMarket {
    pub readings: Mutex<Result<IndicatorReadings, String>>,
    pub price: Mutex<f64>,
    pub fetches: AtomicUsize,
    pub hold: Option<Notify>,
}

impl StubMarket {
    pub fn new(readings: IndicatorReadings, price: f64) -> Self {
        Self {
            readings: Mutex::new(Ok(readings)),
            price: Mutex::new(price),
            fetches: AtomicUsize::new(0),
            hold: None,
        }
    }

    pub fn blocking(readings: IndicatorReadings, price: f64) -> Self {
        Self {
            hold: Some(Notify::new()),
            ..Self::new(readings, price)
        }
    }

    pub fn fail_with(&self, message: &str) {
        *self.readings.lock().unwrap() = Err(message.to_string());
    }
}

#[async_trait]
impl MarketData for StubMarket {
    async fn latest_indicator_readings(&self) -> Result<IndicatorReadings, MarketDataError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if let Some(hold) = &self.hold {
            hold.notified().await;
        }
        let readings = self.readings.lock().unwrap().clone();
        readings.map_err(MarketDataError::InvalidResponse)
    }

    async fn current_price(&self) -> Result<f64, MarketDataError> {
        Ok(*self.price.lock().unwrap())
    }
}

/// Gateway that fills every non-hold decision at a fixed entry and records calls
#[derive(Default)]
pub struct StubGateway {
    pub executed: Mutex<Vec<TradingSignal>>,
    pub positions: Mutex<Vec<OpenPosition>>,
    pub cancelled: Mutex<Vec<String>>,
    pub calls: Mutex<Vec<&'static str>>,
    pub reject_trades: bool,
}

impl StubGateway {
    pub fn with_position(id: &str, side: OrderSide, entry_price: f64) -> Self {
        let gateway = Self::default();
        gateway.positions.lock().unwrap().push(OpenPosition {
            id: id.to_string(),
            side,
            entry_price: Some(entry_price),
            amount: 1.0,
            opened_at: Utc::now(),
        });
        gateway
    }
}

#[async_trait]
impl ExecutionGateway for StubGateway {
    async fn execute_trade(&self, decision: &TradingSignal) -> Result<Option<Order>, GatewayError> {
        self.calls.lock().unwrap().push("execute_trade");
        if self.reject_trades {
            return Err(GatewayError::Rejected("venue offline".into()));
        }
        self.executed.lock().unwrap().push(decision.clone());
        Ok(None)
    }

    async fn open_positions(&self) -> Result<Vec<OpenPosition>, GatewayError> {
        self.calls.lock().unwrap().push("open_positions");
        Ok(self.positions.lock().unwrap().clone())
    }

    async fn cancel_position(&self, id: &str) -> bool {
        self.calls.lock().unwrap().push("cancel_position");
        self.cancelled.lock().unwrap().push(id.to_string());
        self.positions.lock().unwrap().retain(|p| p.id != id);
        true
    }
}
