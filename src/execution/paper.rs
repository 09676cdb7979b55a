use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{ExecutionGateway, GatewayError, OrderSizing};
use crate::market::MarketData;
use crate::models::{Action, OpenPosition, Order, OrderSide, TradingSignal};

/// Paper venue settings
#[derive(Debug, Clone)]
pub struct PaperConfig {
    pub symbol: String,
    pub sizing: OrderSizing,
    pub max_open_positions: usize,
    pub quote_balance: f64,
    pub base_balance: f64,
}

impl Default for PaperConfig {
    fn default() -> Self {
        Self {
            symbol: "BTC/USDT".to_string(),
            sizing: OrderSizing::default(),
            max_open_positions: 3,
            quote_balance: 10_000.0,
            base_balance: 0.0,
        }
    }
}

struct PaperBook {
    quote_free: f64,
    base_free: f64,
    positions: Vec<OpenPosition>,
    realized_pnl: f64,
    closed_count: usize,
}

impl PaperBook {
    /// Balance a new order on `side` may draw on
    ///
    /// Base bought by open longs and quote received by open shorts stay
    /// reserved for closing those positions.
    fn available(&self, side: OrderSide) -> f64 {
        let reserved: f64 = self
            .positions
            .iter()
            .filter(|p| p.side != side)
            .map(|p| match p.side {
                OrderSide::Buy => p.amount,
                OrderSide::Sell => p.amount * p.entry_price.unwrap_or(0.0),
            })
            .sum();

        let free = match side {
            OrderSide::Buy => self.quote_free,
            OrderSide::Sell => self.base_free,
        };
        (free - reserved).max(0.0)
    }
}

/// Simulated market-order venue for a single symbol
///
/// Fills at the market collaborator's current price. Every fill stays an
/// open position until it is cancelled, which closes it at the then-current
/// price and books the realized P&L.
pub struct PaperGateway<M> {
    market: Arc<M>,
    symbol: String,
    sizing: OrderSizing,
    max_open_positions: usize,
    book: Mutex<PaperBook>,
}

impl<M: MarketData> PaperGateway<M> {
    pub fn new(market: Arc<M>, config: PaperConfig) -> Self {
        tracing::info!(
            "Paper venue for {}: {:.2} quote / {:.6} base, max {} open positions",
            config.symbol,
            config.quote_balance,
            config.base_balance,
            config.max_open_positions
        );

        Self {
            market,
            symbol: config.symbol,
            sizing: config.sizing,
            max_open_positions: config.max_open_positions,
            book: Mutex::new(PaperBook {
                quote_free: config.quote_balance,
                base_free: config.base_balance,
                positions: Vec::new(),
                realized_pnl: 0.0,
                closed_count: 0,
            }),
        }
    }

    /// Free (quote, base) balances
    pub async fn balances(&self) -> (f64, f64) {
        let book = self.book.lock().await;
        (book.quote_free, book.base_free)
    }

    /// Realized P&L over all closed positions, in quote units
    pub async fn realized_pnl(&self) -> f64 {
        self.book.lock().await.realized_pnl
    }

    pub async fn closed_count(&self) -> usize {
        self.book.lock().await.closed_count
    }

    async fn fill_price(&self) -> Result<f64, GatewayError> {
        let price = self.market.current_price().await?;
        if !price.is_finite() || price <= 0.0 {
            return Err(GatewayError::Rejected(format!(
                "invalid market price {}",
                price
            )));
        }
        Ok(price)
    }
}

#[async_trait]
impl<M: MarketData> ExecutionGateway for PaperGateway<M> {
    async fn execute_trade(&self, decision: &TradingSignal) -> Result<Option<Order>, GatewayError> {
        if !self.sizing.passes_confidence_gate(decision) {
            tracing::info!("Signal confidence too low: {:.4}", decision.confidence());
            return Ok(None);
        }

        let side = match decision.action() {
            Action::Buy => OrderSide::Buy,
            Action::Sell => OrderSide::Sell,
            Action::Hold => {
                tracing::info!("Holding position");
                return Ok(None);
            }
        };

        let price = self.fill_price().await?;
        let mut book = self.book.lock().await;

        if book.positions.len() >= self.max_open_positions {
            tracing::info!(
                "Max open positions reached ({}), skipping {} order",
                self.max_open_positions,
                side
            );
            return Ok(None);
        }

        let free = book.available(side);
        let amount = self.sizing.order_size(side, price, free);

        if amount <= 0.0 {
            tracing::info!("Insufficient balance for {} order", side);
            return Ok(None);
        }

        match side {
            OrderSide::Buy => {
                book.quote_free -= amount * price;
                book.base_free += amount;
            }
            OrderSide::Sell => {
                book.base_free -= amount;
                book.quote_free += amount * price;
            }
        }

        let order = Order {
            id: Uuid::new_v4().to_string(),
            symbol: self.symbol.clone(),
            side,
            price,
            amount,
            timestamp: Utc::now(),
        };

        book.positions.push(OpenPosition {
            id: order.id.clone(),
            side,
            entry_price: Some(price),
            amount,
            opened_at: order.timestamp,
        });

        tracing::info!(
            order_id = %order.id,
            "Executed {} order: {:.6} {} @ {:.2}",
            side,
            amount,
            self.symbol,
            price
        );

        Ok(Some(order))
    }

    async fn open_positions(&self) -> Result<Vec<OpenPosition>, GatewayError> {
        Ok(self.book.lock().await.positions.clone())
    }

    async fn cancel_position(&self, id: &str) -> bool {
        let price = match self.fill_price().await {
            Ok(price) => price,
            Err(e) => {
                tracing::warn!("Error canceling order {}: {}", id, e);
                return false;
            }
        };

        let mut book = self.book.lock().await;

        let Some(index) = book.positions.iter().position(|p| p.id == id) else {
            tracing::warn!("Error canceling order {}: unknown position", id);
            return false;
        };

        let position = &book.positions[index];
        let (needed, have) = match position.side {
            OrderSide::Buy => (position.amount, book.base_free),
            OrderSide::Sell => (position.amount * price, book.quote_free),
        };
        if needed > have {
            tracing::warn!(
                "Error canceling order {}: needs {:.6}, only {:.6} free",
                id,
                needed,
                have
            );
            return false;
        }

        let position = book.positions.remove(index);
        let entry_price = position.entry_price.unwrap_or(price);

        let pnl = match position.side {
            OrderSide::Buy => {
                book.base_free -= position.amount;
                book.quote_free += position.amount * price;
                (price - entry_price) * position.amount
            }
            OrderSide::Sell => {
                book.quote_free -= position.amount * price;
                book.base_free += position.amount;
                (entry_price - price) * position.amount
            }
        };

        book.realized_pnl += pnl;
        book.closed_count += 1;

        tracing::info!(
            "Closed {} position {} @ {:.2} (P&L: {:.2})",
            position.side,
            id,
            price,
            pnl
        );

        true
    }
}
