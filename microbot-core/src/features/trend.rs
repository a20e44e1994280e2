//! Trend strength: the momentum formula over a long window (default 50).
//!
//! Not read by the decision policy; exposed so a trend classifier can build
//! on it.

use super::momentum::price_change;

/// `0.0` when fewer than `lookback` prices are available.
pub fn trend_strength(prices: &[f64], lookback: usize) -> f64 {
    price_change(prices, lookback)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::{assert_approx, DEFAULT_EPSILON};

    #[test]
    fn trend_strength_long_window() {
        let prices: Vec<f64> = (0..50).map(|i| 200.0 - i as f64 * 0.5).collect();
        // 175.5 - 200
        assert_approx(trend_strength(&prices, 50), -24.5, DEFAULT_EPSILON);
    }

    #[test]
    fn trend_strength_short_history_is_zero() {
        let prices: Vec<f64> = (0..49).map(|i| i as f64).collect();
        assert_eq!(trend_strength(&prices, 50), 0.0);
    }
}
