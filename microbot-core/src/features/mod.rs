//! Feature extraction: scalar signals derived from a market snapshot.
//!
//! Every feature is a pure function of a bounded suffix of the price window
//! (or the top of the order book). None of them fail: when history is too
//! short the feature is exactly `0.0`, so a sparse snapshot reads as "no
//! signal" rather than as an error.

pub mod imbalance;
pub mod momentum;
pub mod trend;
pub mod volatility;

pub use imbalance::orderbook_imbalance;
pub use momentum::momentum;
pub use trend::trend_strength;
pub use volatility::volatility;

use serde::{Deserialize, Serialize};

use crate::domain::{MarketSnapshot, OrderBook};

pub const DEFAULT_DEPTH: usize = 10;
pub const DEFAULT_MOMENTUM_LOOKBACK: usize = 6;
pub const DEFAULT_VOLATILITY_LOOKBACK: usize = 20;
pub const DEFAULT_TREND_LOOKBACK: usize = 50;

/// Window sizes for the feature functions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureConfig {
    /// Order book levels read per side.
    pub depth: usize,
    pub momentum_lookback: usize,
    pub volatility_lookback: usize,
    pub trend_lookback: usize,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            depth: DEFAULT_DEPTH,
            momentum_lookback: DEFAULT_MOMENTUM_LOOKBACK,
            volatility_lookback: DEFAULT_VOLATILITY_LOOKBACK,
            trend_lookback: DEFAULT_TREND_LOOKBACK,
        }
    }
}

impl FeatureConfig {
    pub fn imbalance(&self, book: &OrderBook) -> f64 {
        orderbook_imbalance(book, self.depth)
    }

    pub fn momentum(&self, prices: &[f64]) -> f64 {
        momentum(prices, self.momentum_lookback)
    }

    pub fn volatility(&self, prices: &[f64]) -> f64 {
        volatility(prices, self.volatility_lookback)
    }

    pub fn trend_strength(&self, prices: &[f64]) -> f64 {
        trend_strength(prices, self.trend_lookback)
    }

    /// Longest price suffix any feature reads.
    pub fn max_lookback(&self) -> usize {
        self.momentum_lookback
            .max(self.volatility_lookback)
            .max(self.trend_lookback)
    }

    /// Compute every feature for one snapshot.
    pub fn extract(&self, snapshot: &MarketSnapshot) -> FeatureSet {
        FeatureSet {
            imbalance: self.imbalance(&snapshot.orderbook),
            momentum: self.momentum(&snapshot.prices),
            volatility: self.volatility(&snapshot.prices),
            trend_strength: self.trend_strength(&snapshot.prices),
        }
    }
}

/// All features of one snapshot.
///
/// `trend_strength` is carried for callers (e.g. a trend classifier); the
/// decision policy does not read it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureSet {
    pub imbalance: f64,
    pub momentum: f64,
    pub volatility: f64,
    pub trend_strength: f64,
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
