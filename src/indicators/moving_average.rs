/// Calculate Simple Moving Average (SMA)
pub fn calculate_sma(prices: &[f64], period: usize) -> Option<f64> {
    if period == 0 || prices.len() < period {
        return None;
    }

    let sum: f64 = prices.iter().rev().take(period).sum();
    Some(sum / period as f64)
}

/// Exponential Moving Average series
///
/// One value per input price starting at index `period - 1`, seeded with the
/// SMA of the first `period` prices. Empty when there is not enough data.
pub fn calculate_ema_series(prices: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || prices.len() < period {
        return Vec::new();
    }

    let multiplier = 2.0 / (period as f64 + 1.0);
    let Some(seed) = calculate_sma(&prices[..period], period) else {
        return Vec::new();
    };

    let mut series = Vec::with_capacity(prices.len() - period + 1);
    series.push(seed);

    let mut ema = seed;
    for price in &prices[period..] {
        ema = (price - ema) * multiplier + ema;
        series.push(ema);
    }

    series
}

/// Calculate Exponential Moving Average (EMA), latest value only
pub fn calculate_ema(prices: &[f64], period: usize) -> Option<f64> {
    calculate_ema_series(prices, period).last().copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sma() {
        let prices = vec![100.0, 102.0, 104.0, 106.0, 108.0];
        let sma = calculate_sma(&prices, 5);
        assert_eq!(sma, Some(104.0));
    }

    #[test]
    fn test_sma_insufficient_data() {
        let prices = vec![100.0, 102.0];
        let sma = calculate_sma(&prices, 5);
        assert!(sma.is_none());
    }

    #[test]
    fn test_ema() {
        let prices = vec![100.0, 102.0, 104.0, 106.0, 108.0, 110.0];
        let ema = calculate_ema(&prices, 5);
        assert!(ema.is_some());
        assert!(ema.unwrap() > 104.0); // EMA should be above initial SMA
    }

    #[test]
    fn test_ema_series_length_and_seed() {
        let prices = vec![100.0, 102.0, 104.0, 106.0, 108.0, 110.0, 112.0];
        let series = calculate_ema_series(&prices, 5);

        assert_eq!(series.len(), 3);
        assert_eq!(series[0], 104.0);
        assert_eq!(Some(series[0]), calculate_sma(&prices[..5], 5));
    }

    #[test]
    fn test_ema_zero_period() {
        assert!(calculate_ema(&[100.0, 101.0], 0).is_none());
    }
}
