use crate::models::{OrderSide, TradingSignal};

/// Confidence gate and order size limits
#[derive(Debug, Clone)]
pub struct OrderSizing {
    pub confidence_threshold: f64,
    pub base_order_size: f64, // Fraction of the free balance committed per order
    pub max_order_size: f64,  // Cap in base units
}

impl Default for OrderSizing {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.7,
            base_order_size: 0.001,
            max_order_size: 0.01,
        }
    }
}

impl OrderSizing {
    pub fn passes_confidence_gate(&self, signal: &TradingSignal) -> bool {
        signal.confidence() >= self.confidence_threshold
    }

    /// Order size in base units
    ///
    /// Buys spend a fraction of the free quote balance at `price`, sells
    /// commit a fraction of the free base balance. Capped at
    /// `max_order_size`, never negative; 0 means there is nothing to trade.
    pub fn order_size(&self, side: OrderSide, price: f64, free_balance: f64) -> f64 {
        let size = match side {
            OrderSide::Buy if price > 0.0 => free_balance * self.base_order_size / price,
            OrderSide::Buy => 0.0,
            OrderSide::Sell => free_balance * self.base_order_size,
        };

        if !size.is_finite() {
            return 0.0;
        }

        size.min(self.max_order_size).max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Action;

    #[test]
    fn test_confidence_gate() {
        let sizing = OrderSizing::default();

        assert!(sizing.passes_confidence_gate(&TradingSignal::new(Action::Buy, 0.8, "")));
        assert!(sizing.passes_confidence_gate(&TradingSignal::new(Action::Buy, 0.7, "")));
        assert!(!sizing.passes_confidence_gate(&TradingSignal::new(Action::Buy, 0.69, "")));
    }

    #[test]
    fn test_buy_size_uses_quote_balance() {
        let sizing = OrderSizing {
            confidence_threshold: 0.7,
            base_order_size: 0.1,
            max_order_size: 10.0,
        };

        // 10% of 10_000 USDT at 100 = 10 units
        let size = sizing.order_size(OrderSide::Buy, 100.0, 10_000.0);
        assert!((size - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_sell_size_uses_base_balance() {
        let sizing = OrderSizing {
            confidence_threshold: 0.7,
            base_order_size: 0.5,
            max_order_size: 10.0,
        };

        let size = sizing.order_size(OrderSide::Sell, 100.0, 4.0);
        assert!((size - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_size_is_capped() {
        let sizing = OrderSizing::default();

        // 0.1% of 1_000_000 at 10 = 100 units, capped at 0.01
        let size = sizing.order_size(OrderSide::Buy, 10.0, 1_000_000.0);
        assert_eq!(size, 0.01);
    }

    #[test]
    fn test_empty_balance_or_bad_price_is_zero() {
        let sizing = OrderSizing::default();

        assert_eq!(sizing.order_size(OrderSide::Buy, 100.0, 0.0), 0.0);
        assert_eq!(sizing.order_size(OrderSide::Sell, 100.0, -5.0), 0.0);
        assert_eq!(sizing.order_size(OrderSide::Buy, 0.0, 1000.0), 0.0);
        assert_eq!(sizing.order_size(OrderSide::Buy, f64::NAN, 1000.0), 0.0);
    }
}
