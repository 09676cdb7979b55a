use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use signalbot::execution::{ExecutionGateway, OrderSizing, PaperConfig, PaperGateway};
use signalbot::market::{MarketData, MarketDataError};
use signalbot::risk::{ExitReason, RiskConfig, RiskMonitor};
use signalbot::scheduler::CycleError;
use signalbot::strategy::CombinedStrategy;
use signalbot::{Action, BotState, CycleEngine, IndicatorReadings, OrderSide, TradingBot};
use tokio_test::{assert_err, assert_ok};

/// Market whose readings and price the test moves by hand
struct ScriptedMarket {
    readings: Mutex<Option<IndicatorReadings>>,
    price: Mutex<f64>,
}

impl ScriptedMarket {
    fn new(readings: IndicatorReadings, price: f64) -> Arc<Self> {
        Arc::new(Self {
            readings: Mutex::new(Some(readings)),
            price: Mutex::new(price),
        })
    }

    fn set(&self, readings: Option<IndicatorReadings>, price: f64) {
        *self.readings.lock().unwrap() = readings;
        *self.price.lock().unwrap() = price;
    }
}

#[async_trait]
impl MarketData for ScriptedMarket {
    async fn latest_indicator_readings(&self) -> Result<IndicatorReadings, MarketDataError> {
        let readings = *self.readings.lock().unwrap();
        readings.ok_or(MarketDataError::InsufficientData { needed: 34, got: 0 })
    }

    async fn current_price(&self) -> Result<f64, MarketDataError> {
        Ok(*self.price.lock().unwrap())
    }
}

fn bullish() -> IndicatorReadings {
    IndicatorReadings {
        rsi: 28.0,
        macd_line: 1.2,
        signal_line: 0.8,
        short_ema: 101.0,
        long_ema: 100.0,
    }
}

fn neutral() -> IndicatorReadings {
    IndicatorReadings {
        rsi: 50.0,
        macd_line: 0.0,
        signal_line: 0.0,
        short_ema: 100.0,
        long_ema: 100.0,
    }
}

fn paper_config() -> PaperConfig {
    PaperConfig {
        symbol: "BTC/USDT".to_string(),
        sizing: OrderSizing {
            confidence_threshold: 0.6,
            base_order_size: 0.1,
            max_order_size: 100.0,
        },
        max_open_positions: 3,
        quote_balance: 10_000.0,
        base_balance: 0.0,
    }
}

fn engine(
    market: Arc<ScriptedMarket>,
) -> (
    CycleEngine<ScriptedMarket, PaperGateway<ScriptedMarket>>,
    Arc<PaperGateway<ScriptedMarket>>,
) {
    let gateway = Arc::new(PaperGateway::new(market.clone(), paper_config()));
    let engine = CycleEngine::new(
        market,
        gateway.clone(),
        Arc::new(CombinedStrategy::default()),
        RiskMonitor::new(RiskConfig {
            stop_loss_pct: 2.0,
            take_profit_pct: 4.0,
        }),
    );
    (engine, gateway)
}

#[tokio::test]
async fn test_buy_then_stop_loss() {
    let market = ScriptedMarket::new(bullish(), 100.0);
    let (engine, gateway) = engine(market.clone());

    // Cycle 1: unanimous buy, position opened, not yet at risk
    let report = assert_ok!(engine.run_cycle().await);
    assert_eq!(report.decision.action(), Action::Buy);
    let order = report.order.expect("buy should fill");
    assert_eq!(order.side, OrderSide::Buy);
    assert_eq!(report.risk.checked, 1);
    assert!(report.risk.closed.is_empty());

    // Cycle 2: price falls 3%, neutral readings, stop loss closes the long
    market.set(Some(neutral()), 97.0);
    let report = assert_ok!(engine.run_cycle().await);
    assert_eq!(report.decision.action(), Action::Hold);
    assert!(report.order.is_none());
    assert_eq!(report.risk.closed.len(), 1);
    assert_eq!(report.risk.closed[0].position_id, order.id);
    assert_eq!(report.risk.closed[0].reason, ExitReason::StopLoss);

    assert!(gateway.open_positions().await.unwrap().is_empty());
    assert!(gateway.realized_pnl().await < 0.0);
}

#[tokio::test]
async fn test_take_profit_after_rally() {
    let market = ScriptedMarket::new(bullish(), 100.0);
    let (engine, gateway) = engine(market.clone());

    assert_ok!(engine.run_cycle().await);

    market.set(Some(neutral()), 104.0);
    let report = assert_ok!(engine.run_cycle().await);

    assert_eq!(report.risk.closed[0].reason, ExitReason::TakeProfit);
    assert!(gateway.realized_pnl().await > 0.0);
}

#[tokio::test]
async fn test_data_outage_keeps_positions_for_next_cycle() {
    let market = ScriptedMarket::new(bullish(), 100.0);
    let (engine, gateway) = engine(market.clone());

    assert_ok!(engine.run_cycle().await);

    // Readings unavailable: the cycle aborts before the risk pass
    market.set(None, 90.0);
    let result = engine.trigger().await.unwrap();
    assert!(matches!(assert_err!(result), CycleError::MarketData(_)));
    assert_eq!(gateway.open_positions().await.unwrap().len(), 1);

    // Data returns: the pending stop loss is applied
    market.set(Some(neutral()), 90.0);
    let report = assert_ok!(engine.run_cycle().await);
    assert_eq!(report.risk.closed.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_bot_lifecycle() {
    let market = ScriptedMarket::new(neutral(), 100.0);
    let (engine, _gateway) = engine(market);

    let mut bot = TradingBot::new(engine, "15m");
    assert_eq!(bot.interval(), Duration::from_millis(15 * 60 * 1000));
    assert_eq!(bot.state(), BotState::Stopped);

    assert_ok!(bot.start().await);
    assert_eq!(bot.state(), BotState::Running);
    assert_eq!(bot.engine().cycles_run(), 1);

    tokio::time::sleep(Duration::from_secs(15 * 60 + 1)).await;
    assert_eq!(bot.engine().cycles_run(), 2);

    bot.stop().await;
    bot.stop().await;
    assert_eq!(bot.state(), BotState::Stopped);

    tokio::time::sleep(Duration::from_secs(3600)).await;
    assert_eq!(bot.engine().cycles_run(), 2);
}
