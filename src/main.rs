use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use signalbot::execution::PaperGateway;
use signalbot::market::{BinanceClient, BinanceMarketData};
use signalbot::risk::RiskMonitor;
use signalbot::strategy::{CombinedStrategy, Strategy};
use signalbot::{CycleEngine, Settings, TradingBot};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "signalbot", about = "Indicator-driven trading bot for a single instrument")]
struct Args {
    /// Run a single decision cycle and exit
    #[arg(long)]
    once: bool,

    /// Override TRADING_TIMEFRAME (e.g. 15m, 1h, 4h)
    #[arg(long)]
    timeframe: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let mut settings = Settings::from_env().context("Failed to load settings")?;
    if let Some(timeframe) = args.timeframe {
        settings.trading_timeframe = timeframe;
    }

    setup_logging(&settings.log_level);

    tracing::info!("🚀 signalbot starting");
    log_configuration(&settings);

    // Market data + paper venue
    let client = BinanceClient::with_base_url(settings.exchange_base_url.clone())
        .context("Failed to build exchange client")?;
    let market = Arc::new(BinanceMarketData::new(
        client,
        &settings.trading_symbol,
        &settings.trading_timeframe,
        settings.candle_limit,
        settings.indicator_config(),
    ));
    let gateway = Arc::new(PaperGateway::new(market.clone(), settings.paper_config()));

    let strategy: Arc<dyn Strategy> = Arc::new(CombinedStrategy::new(settings.signal_config()));
    let engine = CycleEngine::new(
        market,
        gateway.clone(),
        strategy,
        RiskMonitor::new(settings.risk_config()),
    );

    if args.once {
        if let Some(Ok(report)) = engine.trigger().await {
            tracing::info!(
                "Cycle complete: {} ({:.4}), order: {}, closed: {}",
                report.decision.action(),
                report.decision.confidence(),
                report.order.is_some(),
                report.risk.closed.len()
            );
        }
        log_paper_summary(&gateway).await;
        return Ok(());
    }

    let mut bot = TradingBot::new(engine, &settings.trading_timeframe);
    bot.start().await?;
    tracing::info!("✅ Trading bot started, cycle every {:?}", bot.interval());
    tracing::info!("Press Ctrl+C to stop...");

    shutdown_signal().await;

    tracing::info!("⚠️  Shutdown signal received, shutting down gracefully...");
    bot.stop().await;
    log_paper_summary(&gateway).await;

    tracing::info!("👋 signalbot stopped");
    Ok(())
}

// ============================================================================
// Initialization Functions
// ============================================================================

fn setup_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("signalbot={}", level)));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn log_configuration(settings: &Settings) {
    tracing::info!("📊 Configuration:");
    tracing::info!("  Symbol: {}", settings.trading_symbol);
    tracing::info!("  Timeframe: {}", settings.trading_timeframe);
    tracing::info!(
        "  RSI: period {}, oversold {}, overbought {}",
        settings.rsi_period,
        settings.rsi_oversold,
        settings.rsi_overbought
    );
    tracing::info!(
        "  MACD: {}/{}/{}  EMA: {}/{}",
        settings.macd_fast_period,
        settings.macd_slow_period,
        settings.macd_signal_period,
        settings.ema_short_period,
        settings.ema_long_period
    );
    tracing::info!(
        "  Stop Loss: {}%  Take Profit: {}%",
        settings.stop_loss_percentage,
        settings.take_profit_percentage
    );
    tracing::info!(
        "  Confidence Threshold: {}  Order Size: {} (max {})",
        settings.confidence_threshold,
        settings.base_order_size,
        settings.max_order_size
    );
}

async fn log_paper_summary(gateway: &PaperGateway<BinanceMarketData>) {
    let (quote, base) = gateway.balances().await;
    tracing::info!("💼 Paper account:");
    tracing::info!("  Quote balance: {:.2}", quote);
    tracing::info!("  Base balance: {:.6}", base);
    tracing::info!(
        "  Realized P&L: {:.2} over {} closed positions",
        gateway.realized_pnl().await,
        gateway.closed_count().await
    );
}

/// Resolves on Ctrl+C, or SIGTERM on unix
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = sigterm.recv() => {}
                }
                return;
            }
            Err(e) => tracing::warn!("Cannot listen for SIGTERM ({}), Ctrl+C only", e),
        }
    }

    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl+C: {}", e);
    }
}
