use serde::{Deserialize, Serialize};

use crate::execution::ExecutionGateway;
use crate::models::{OpenPosition, OrderSide};

/// Stop-loss / take-profit thresholds, in percent of entry price
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskConfig {
    pub stop_loss_pct: f64,
    pub take_profit_pct: f64,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            stop_loss_pct: 2.0,
            take_profit_pct: 4.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    StopLoss,
    TakeProfit,
}

/// Position that crossed a threshold and must be closed
#[derive(Debug, Clone, PartialEq)]
pub struct PositionExit {
    pub position_id: String,
    pub reason: ExitReason,
    pub change_pct: f64,
}

/// Outcome of one monitor pass
#[derive(Debug, Clone, Default)]
pub struct RiskReport {
    pub checked: usize,
    pub closed: Vec<PositionExit>,
    pub failed: Vec<PositionExit>, // Cancellation refused, retried next cycle
}

pub struct RiskMonitor {
    config: RiskConfig,
}

impl RiskMonitor {
    pub fn new(config: RiskConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RiskConfig {
        &self.config
    }

    /// Percent move from entry, `None` when the entry price is missing or zero
    pub fn price_change_pct(position: &OpenPosition, current_price: f64) -> Option<f64> {
        let entry = position
            .entry_price
            .filter(|p| *p != 0.0 && p.is_finite())?;
        Some((current_price - entry) * 100.0 / entry)
    }

    /// Check one position against the thresholds
    ///
    /// Longs exit at `change <= -stop_loss` or `change >= take_profit`,
    /// shorts at `change >= stop_loss` or `change <= -take_profit`.
    pub fn check(&self, position: &OpenPosition, current_price: f64) -> Option<ExitReason> {
        let change = Self::price_change_pct(position, current_price)?;
        let sl = self.config.stop_loss_pct;
        let tp = self.config.take_profit_pct;

        match position.side {
            OrderSide::Buy if change <= -sl => Some(ExitReason::StopLoss),
            OrderSide::Buy if change >= tp => Some(ExitReason::TakeProfit),
            OrderSide::Sell if change >= sl => Some(ExitReason::StopLoss),
            OrderSide::Sell if change <= -tp => Some(ExitReason::TakeProfit),
            _ => None,
        }
    }

    /// Positions that must be closed at `current_price`
    pub fn evaluate(&self, positions: &[OpenPosition], current_price: f64) -> Vec<PositionExit> {
        let mut exits = Vec::new();

        for position in positions {
            let Some(change_pct) = Self::price_change_pct(position, current_price) else {
                tracing::warn!(
                    "Skipping position {}: no entry price yet",
                    position.id
                );
                continue;
            };

            if let Some(reason) = self.check(position, current_price) {
                exits.push(PositionExit {
                    position_id: position.id.clone(),
                    reason,
                    change_pct,
                });
            }
        }

        exits
    }

    /// Evaluate and request cancellation of every position past a threshold
    ///
    /// A refused cancellation is logged and reported; the position stays
    /// open and is evaluated again next cycle.
    pub async fn enforce<G>(
        &self,
        gateway: &G,
        positions: &[OpenPosition],
        current_price: f64,
    ) -> RiskReport
    where
        G: ExecutionGateway + ?Sized,
    {
        let mut report = RiskReport {
            checked: positions.len(),
            ..RiskReport::default()
        };

        for exit in self.evaluate(positions, current_price) {
            match exit.reason {
                ExitReason::StopLoss => tracing::info!(
                    "Stop loss triggered for order {} ({:+.2}%)",
                    exit.position_id,
                    exit.change_pct
                ),
                ExitReason::TakeProfit => tracing::info!(
                    "Take profit triggered for order {} ({:+.2}%)",
                    exit.position_id,
                    exit.change_pct
                ),
            }

            if gateway.cancel_position(&exit.position_id).await {
                report.closed.push(exit);
            } else {
                tracing::warn!(
                    "Failed to close position {}, will retry next cycle",
                    exit.position_id
                );
                report.failed.push(exit);
            }
        }

        report
    }
}
