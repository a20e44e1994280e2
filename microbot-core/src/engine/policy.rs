//! Policy thresholds for the decision engine.
//!
//! All pnl-denominated values are in percent of entry price.

use serde::{Deserialize, Serialize};

/// Baseline profit target.
pub const BASE_TARGET: f64 = 0.50;
/// Pnl at which an armed trailing stop is honoured.
pub const TRAIL_ACTIVATE: f64 = 0.30;

/// Named, overridable thresholds. Defaults reproduce the baseline policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    pub base_target: f64,
    pub trail_activate: f64,
    /// Imbalance magnitude an entry needs (strictly exceeded).
    pub entry_imbalance: f64,
    /// Imbalance tolerance against the held side before wick protection stops
    /// suppressing loss exits.
    pub wick_imbalance: f64,
    /// Profit target widening per unit of volatility.
    pub target_vol_scale: f64,
    /// Smallest magnitude of the soft stop.
    pub soft_stop_floor: f64,
    /// Soft stop widening per unit of volatility.
    pub soft_stop_vol_scale: f64,
    /// Cycles a position must be held before hard invalidation may fire.
    pub min_cycles_before_invalidation: u32,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            base_target: BASE_TARGET,
            trail_activate: TRAIL_ACTIVATE,
            entry_imbalance: 0.18,
            wick_imbalance: 0.1,
            target_vol_scale: 0.25,
            soft_stop_floor: 0.4,
            soft_stop_vol_scale: 0.6,
            min_cycles_before_invalidation: 3,
        }
    }
}

impl PolicyConfig {
    /// Profit target widened by volatility.
    pub fn dynamic_target(&self, volatility: f64) -> f64 {
        self.base_target + volatility * self.target_vol_scale
    }

    /// Loss floor: never above `-soft_stop_floor`, lower as volatility rises.
    pub fn soft_stop(&self, volatility: f64) -> f64 {
        -self.soft_stop_floor.max(volatility * self.soft_stop_vol_scale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thresholds_at_zero_volatility() {
        let p = PolicyConfig::default();
        assert_eq!(p.dynamic_target(0.0), 0.50);
        assert_eq!(p.soft_stop(0.0), -0.4);
    }

    #[test]
    fn thresholds_widen_with_volatility() {
        let p = PolicyConfig::default();
        assert!((p.dynamic_target(2.0) - 1.0).abs() < 1e-12);
        // 0.6 * 0.5 = 0.3 < 0.4, floor holds
        assert_eq!(p.soft_stop(0.5), -0.4);
        assert!((p.soft_stop(1.0) + 0.6).abs() < 1e-12);
    }
}
