use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use super::cycle::CycleEngine;
use super::timeframe::timeframe_to_interval;
use crate::execution::ExecutionGateway;
use crate::market::MarketData;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BotState {
    Stopped,
    Running,
}

#[derive(Debug, thiserror::Error)]
pub enum BotError {
    #[error("trading bot is already running")]
    AlreadyRunning,
}

struct Runner {
    shutdown: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

/// Drives decision cycles at the cadence of the configured timeframe
///
/// `Stopped` until `start`, back to `Stopped` after `stop`. Cycles never
/// overlap: the timer task awaits each cycle before taking the next tick,
/// and ticks missed while a cycle ran are dropped.
pub struct TradingBot<M, G> {
    engine: Arc<CycleEngine<M, G>>,
    interval: Duration,
    runner: Option<Runner>,
}

impl<M, G> TradingBot<M, G>
where
    M: MarketData + 'static,
    G: ExecutionGateway + 'static,
{
    pub fn new(engine: CycleEngine<M, G>, timeframe: &str) -> Self {
        Self {
            engine: Arc::new(engine),
            interval: timeframe_to_interval(timeframe),
            runner: None,
        }
    }

    pub fn state(&self) -> BotState {
        if self.runner.is_some() {
            BotState::Running
        } else {
            BotState::Stopped
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn engine(&self) -> &Arc<CycleEngine<M, G>> {
        &self.engine
    }

    /// Run one cycle right away, then arm the recurring timer
    ///
    /// A failing first cycle is logged like any other; the bot still starts.
    pub async fn start(&mut self) -> Result<(), BotError> {
        if self.runner.is_some() {
            return Err(BotError::AlreadyRunning);
        }

        tracing::info!(
            "Starting trading bot (cycle every {:?})...",
            self.interval
        );

        self.engine.trigger().await;

        let (shutdown, shutdown_rx) = watch::channel(false);
        let handle = tokio::spawn(trading_loop(
            self.engine.clone(),
            self.interval,
            shutdown_rx,
        ));

        self.runner = Some(Runner { shutdown, handle });
        Ok(())
    }

    /// Disarm the timer. An in-flight cycle completes first; no new cycle starts.
    pub async fn stop(&mut self) {
        let Some(runner) = self.runner.take() else {
            tracing::debug!("Trading bot already stopped");
            return;
        };

        tracing::info!("Stopping trading bot...");

        // Receiver only goes away if the loop already exited
        let _ = runner.shutdown.send(true);

        if let Err(e) = runner.handle.await {
            tracing::error!("Trading loop ended abnormally: {}", e);
        }

        tracing::info!("Trading bot stopped");
    }
}

impl<M, G> Drop for TradingBot<M, G> {
    /// Signal the timer task so it does not outlive the bot. Does not wait for it.
    fn drop(&mut self) {
        if let Some(runner) = self.runner.take() {
            let _ = runner.shutdown.send(true);
        }
    }
}

async fn trading_loop<M, G>(
    engine: Arc<CycleEngine<M, G>>,
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
) where
    M: MarketData,
    G: ExecutionGateway,
{
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            biased;

            changed = shutdown.changed() => {
                let stopping = *shutdown.borrow();
                if changed.is_err() || stopping {
                    break;
                }
            }
            _ = ticker.tick() => {
                let stopping = *shutdown.borrow();
                if stopping {
                    break;
                }
                tracing::debug!("Trading tick");
                engine.trigger().await;
            }
        }
    }
}
