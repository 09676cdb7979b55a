use super::moving_average::calculate_ema_series;

/// Latest MACD values
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Macd {
    pub macd: f64,
    pub signal: f64,
}

/// Calculate Moving Average Convergence Divergence
///
/// MACD line is `EMA(fast) - EMA(slow)`, the signal line is the EMA of the
/// MACD line over `signal_period`. Needs `slow + signal_period - 1` prices.
pub fn calculate_macd(
    prices: &[f64],
    fast_period: usize,
    slow_period: usize,
    signal_period: usize,
) -> Option<Macd> {
    if fast_period == 0 || fast_period > slow_period || signal_period == 0 {
        return None;
    }

    let fast = calculate_ema_series(prices, fast_period);
    let slow = calculate_ema_series(prices, slow_period);
    if slow.is_empty() {
        return None;
    }

    // Both series end on the last price; fast starts earlier
    let offset = slow_period - fast_period;
    let macd_line: Vec<f64> = slow
        .iter()
        .enumerate()
        .map(|(i, slow_ema)| fast[i + offset] - slow_ema)
        .collect();

    let signal_line = calculate_ema_series(&macd_line, signal_period);

    Some(Macd {
        macd: *macd_line.last()?,
        signal: *signal_line.last()?,
    })
}
