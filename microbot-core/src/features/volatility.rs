//! Volatility: population standard deviation of the last `lookback` prices.

/// `0.0` when fewer than `lookback` prices are available.
pub fn volatility(prices: &[f64], lookback: usize) -> f64 {
    let n = prices.len();
    if lookback == 0 || n < lookback {
        return 0.0;
    }

    let window = &prices[n - lookback..];
    let len = window.len() as f64;
    let mean = window.iter().sum::<f64>() / len;
    let variance = window.iter().map(|p| (p - mean).powi(2)).sum::<f64>() / len;
    variance.sqrt()
}
