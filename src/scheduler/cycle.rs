use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use crate::execution::{ExecutionGateway, GatewayError};
use crate::market::{MarketData, MarketDataError};
use crate::models::{Action, Order, TradingSignal};
use crate::risk::{RiskMonitor, RiskReport};
use crate::strategy::Strategy;

#[derive(Debug, thiserror::Error)]
pub enum CycleError {
    #[error("market data unavailable: {0}")]
    MarketData(#[from] MarketDataError),

    #[error("strategy produced no signals")]
    NoSignals,

    #[error("execution gateway failed: {0}")]
    Gateway(#[from] GatewayError),
}

/// What one completed cycle did
#[derive(Debug)]
pub struct CycleReport {
    pub decision: TradingSignal,
    pub order: Option<Order>,
    pub risk: RiskReport,
}

/// Runs decision cycles: readings → decision → optional order → risk pass
///
/// At most one cycle runs at a time; a trigger that arrives while a cycle is
/// in flight is skipped.
pub struct CycleEngine<M, G> {
    market: Arc<M>,
    gateway: Arc<G>,
    strategy: Arc<dyn Strategy>,
    monitor: RiskMonitor,
    in_flight: AtomicBool,
    cycles_run: AtomicU64,
}

/// Clears the in-flight flag even if the cycle future is dropped mid-way
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl<M: MarketData, G: ExecutionGateway> CycleEngine<M, G> {
    pub fn new(
        market: Arc<M>,
        gateway: Arc<G>,
        strategy: Arc<dyn Strategy>,
        monitor: RiskMonitor,
    ) -> Self {
        Self {
            market,
            gateway,
            strategy,
            monitor,
            in_flight: AtomicBool::new(false),
            cycles_run: AtomicU64::new(0),
        }
    }

    pub fn gateway(&self) -> &Arc<G> {
        &self.gateway
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Number of cycles started (successful or not), skipped triggers excluded
    pub fn cycles_run(&self) -> u64 {
        self.cycles_run.load(Ordering::Relaxed)
    }

    /// Run one cycle unless another is still in flight
    ///
    /// Errors are logged here and never propagate past the cycle. Returns
    /// `None` when the trigger was skipped.
    pub async fn trigger(&self) -> Option<Result<CycleReport, CycleError>> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::warn!("Previous cycle still in flight, skipping tick");
            return None;
        }
        let _guard = InFlight(&self.in_flight);

        self.cycles_run.fetch_add(1, Ordering::Relaxed);

        let result = self.run_cycle().await;
        if let Err(e) = &result {
            tracing::error!("Error executing trades: {}", e);
        }

        Some(result)
    }

    /// One decision cycle, strictly sequential
    ///
    /// The risk pass runs after any order placed in the same cycle. The first
    /// failing step aborts the rest of the cycle.
    pub async fn run_cycle(&self) -> Result<CycleReport, CycleError> {
        let readings = self.market.latest_indicator_readings().await?;

        let decision = self
            .strategy
            .evaluate(&readings)
            .ok_or(CycleError::NoSignals)?;

        tracing::info!(
            strategy = self.strategy.name(),
            action = %decision.action(),
            confidence = decision.confidence(),
            "Trading signal: {}",
            decision.reason()
        );

        let order = if decision.action() != Action::Hold {
            let order = self.gateway.execute_trade(&decision).await?;
            if let Some(order) = &order {
                tracing::info!(
                    order_id = %order.id,
                    "Trade executed: {} {:.6} @ {:.2}",
                    order.side,
                    order.amount,
                    order.price
                );
            }
            order
        } else {
            None
        };

        let risk = self.manage_open_positions().await?;

        Ok(CycleReport {
            decision,
            order,
            risk,
        })
    }

    async fn manage_open_positions(&self) -> Result<RiskReport, CycleError> {
        let positions = self.gateway.open_positions().await?;
        if positions.is_empty() {
            return Ok(RiskReport::default());
        }

        let current_price = self.market.current_price().await?;
        let report = self
            .monitor
            .enforce(self.gateway.as_ref(), &positions, current_price)
            .await;

        if !report.closed.is_empty() || !report.failed.is_empty() {
            tracing::info!(
                "Risk pass: {} checked, {} closed, {} failed",
                report.checked,
                report.closed.len(),
                report.failed.len()
            );
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::OrderSide;
    use crate::risk::{ExitReason, RiskConfig};
    use crate::scheduler::test_support::{bullish, neutral, StubGateway, StubMarket};
    use crate::strategy::CombinedStrategy;

    fn engine(market: StubMarket, gateway: StubGateway) -> CycleEngine<StubMarket, StubGateway> {
        CycleEngine::new(
            Arc::new(market),
            Arc::new(gateway),
            Arc::new(CombinedStrategy::default()),
            RiskMonitor::new(RiskConfig::default()),
        )
    }

    #[tokio::test]
    async fn test_bullish_cycle_executes_then_checks_positions() {
        let engine = engine(StubMarket::new(bullish(), 100.0), StubGateway::default());

        let report = engine.run_cycle().await.unwrap();

        assert_eq!(report.decision.action(), Action::Buy);
        assert_eq!(engine.gateway().executed.lock().unwrap().len(), 1);
        assert_eq!(
            *engine.gateway().calls.lock().unwrap(),
            vec!["execute_trade", "open_positions"]
        );
    }

    #[tokio::test]
    async fn test_hold_skips_execution() {
        let engine = engine(StubMarket::new(neutral(), 100.0), StubGateway::default());

        let report = engine.run_cycle().await.unwrap();

        assert_eq!(report.decision.action(), Action::Hold);
        assert!(report.order.is_none());
        assert_eq!(*engine.gateway().calls.lock().unwrap(), vec!["open_positions"]);
    }

    #[tokio::test]
    async fn test_risk_pass_closes_losing_long() {
        let engine = engine(
            StubMarket::new(neutral(), 97.0),
            StubGateway::with_position("long-1", OrderSide::Buy, 100.0),
        );

        let report = engine.run_cycle().await.unwrap();

        assert_eq!(report.risk.closed.len(), 1);
        assert_eq!(report.risk.closed[0].reason, ExitReason::StopLoss);
        assert_eq!(
            *engine.gateway().cancelled.lock().unwrap(),
            vec!["long-1".to_string()]
        );
    }

    #[tokio::test]
    async fn test_market_failure_aborts_cycle() {
        let market = StubMarket::new(bullish(), 100.0);
        market.fail_with("timeout");
        let engine = engine(market, StubGateway::default());

        let result = engine.trigger().await.unwrap();

        assert!(matches!(result, Err(CycleError::MarketData(_))));
        assert_eq!(engine.market.fetches.load(Ordering::SeqCst), 1);
        assert!(engine.gateway().calls.lock().unwrap().is_empty());
        assert!(!engine.is_busy());
        assert_eq!(engine.cycles_run(), 1);
    }

    #[tokio::test]
    async fn test_gateway_failure_skips_risk_pass() {
        let gateway = StubGateway {
            reject_trades: true,
            ..StubGateway::default()
        };
        let engine = engine(StubMarket::new(bullish(), 100.0), gateway);

        let result = engine.trigger().await.unwrap();

        assert!(matches!(result, Err(CycleError::Gateway(_))));
        assert_eq!(*engine.gateway().calls.lock().unwrap(), vec!["execute_trade"]);
    }

    #[tokio::test]
    async fn test_trigger_skipped_while_in_flight() {
        let engine = Arc::new(engine(
            StubMarket::blocking(neutral(), 100.0),
            StubGateway::default(),
        ));

        let first = {
            let engine = engine.clone();
            tokio::spawn(async move { engine.trigger().await })
        };

        while !engine.is_busy() {
            tokio::task::yield_now().await;
        }

        assert!(engine.trigger().await.is_none());

        engine.market.hold.as_ref().unwrap().notify_one();
        let result = first.await.unwrap();

        assert!(matches!(result, Some(Ok(_))));
        assert_eq!(engine.cycles_run(), 1);
        assert_eq!(engine.market.fetches.load(Ordering::SeqCst), 1);
        assert!(!engine.is_busy());
    }
}
