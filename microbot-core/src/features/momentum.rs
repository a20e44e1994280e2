//! Momentum: raw price change over a short window (difference, not percentage).
//!
//! momentum = prices[n-1] - prices[n-lookback]
//! Needs at least `lookback` prices.

/// Price change across the last `lookback` prices. `0.0` when history is short.
pub fn momentum(prices: &[f64], lookback: usize) -> f64 {
    price_change(prices, lookback)
}

/// Difference between the newest price and the oldest price of the
/// `lookback`-long suffix.
pub(crate) fn price_change(prices: &[f64], lookback: usize) -> f64 {
    let n = prices.len();
    if lookback == 0 || n < lookback {
        return 0.0;
    }
    prices[n - 1] - prices[n - lookback]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::{assert_approx, DEFAULT_EPSILON};

    #[test]
    fn momentum_basic() {
        let prices = [100.0, 101.0, 103.0, 102.0, 104.0, 107.0];
        // 107 - 100
        assert_approx(momentum(&prices, 6), 7.0, DEFAULT_EPSILON);
        // 107 - 102
        assert_approx(momentum(&prices, 3), 5.0, DEFAULT_EPSILON);
    }

    #[test]
    fn momentum_reads_only_suffix() {
        let prices = [1.0, 2.0, 3.0, 50.0, 49.0, 48.0, 47.0, 46.0, 45.0];
        assert_approx(momentum(&prices, 6), -5.0, DEFAULT_EPSILON);
    }

    #[test]
    fn momentum_short_history_is_zero() {
        assert_eq!(momentum(&[100.0, 110.0, 120.0, 130.0, 140.0], 6), 0.0);
        assert_eq!(momentum(&[], 6), 0.0);
    }

    #[test]
    fn zero_lookback_is_zero() {
        assert_eq!(momentum(&[1.0, 2.0], 0), 0.0);
    }
}
