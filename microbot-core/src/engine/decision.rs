//! The decision function and its result type.

use serde::{Deserialize, Serialize};
use tracing::trace;

use super::policy::PolicyConfig;
use super::reason::Reason;
use crate::config::EngineConfig;
use crate::domain::{Action, MarketSnapshot, OpenPosition, Position, PositionState, Side, TrendBias};
use crate::features::{FeatureConfig, FeatureSet};

/// Outcome of one evaluation cycle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    pub action: Action,
    pub reason: Reason,
    /// Features the decision was based on. `None` when the cooldown gate
    /// short-circuited evaluation.
    pub features: Option<FeatureSet>,
}

/// Volatility-scaled exit levels for the current snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExitThresholds {
    pub dynamic_target: f64,
    pub soft_stop: f64,
}

/// Stateless evaluator configured with feature windows and policy thresholds.
///
/// Holds no per-instrument state; one engine can serve any number of
/// instruments from any number of threads.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecisionEngine {
    features: FeatureConfig,
    policy: PolicyConfig,
}

impl DecisionEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            features: config.features,
            policy: config.policy,
        }
    }

    pub fn from_parts(features: FeatureConfig, policy: PolicyConfig) -> Self {
        Self { features, policy }
    }

    pub fn feature_config(&self) -> &FeatureConfig {
        &self.features
    }

    pub fn policy(&self) -> &PolicyConfig {
        &self.policy
    }

    pub fn exit_thresholds(&self, volatility: f64) -> ExitThresholds {
        ExitThresholds {
            dynamic_target: self.policy.dynamic_target(volatility),
            soft_stop: self.policy.soft_stop(volatility),
        }
    }

    /// Action for this cycle.
    pub fn decide(&self, snapshot: &MarketSnapshot, state: &PositionState) -> Action {
        self.evaluate(snapshot, state).action
    }

    /// Action for this cycle, with the rule that produced it.
    pub fn evaluate(&self, snapshot: &MarketSnapshot, state: &PositionState) -> Decision {
        if state.cooldown > 0 {
            trace!(cooldown = state.cooldown, "cooldown gate");
            return Decision {
                action: Action::Hold,
                reason: Reason::Cooldown,
                features: None,
            };
        }

        let features = self.features.extract(snapshot);
        let (action, reason) = match &state.position {
            Position::Flat => self.entry(&features, state.trend_bias),
            Position::Open(open) => self.exit(&features, open),
        };

        trace!(
            %action,
            %reason,
            imbalance = features.imbalance,
            momentum = features.momentum,
            volatility = features.volatility,
            "decision"
        );

        Decision {
            action,
            reason,
            features: Some(features),
        }
    }

    fn entry(&self, features: &FeatureSet, bias: TrendBias) -> (Action, Reason) {
        let imb = features.imbalance;
        let mom = features.momentum;

        // Bias only blocks counter-trend entries; it never forces one.
        match bias {
            TrendBias::Up if imb < 0.0 => return (Action::Hold, Reason::TrendVeto),
            TrendBias::Down if imb > 0.0 => return (Action::Hold, Reason::TrendVeto),
            _ => {}
        }

        let threshold = self.policy.entry_imbalance;
        if imb > threshold && mom > 0.0 {
            (Action::Buy, Reason::LongEntry)
        } else if imb < -threshold && mom < 0.0 {
            (Action::Sell, Reason::ShortEntry)
        } else {
            (Action::Hold, Reason::NoEntrySignal)
        }
    }

    fn exit(&self, features: &FeatureSet, open: &OpenPosition) -> (Action, Reason) {
        let pnl = open.pnl;
        let thresholds = self.exit_thresholds(features.volatility);

        // The caller arms and ratchets the stop; only the armed level is checked here.
        let trail_hit = open.trail_stop.is_some_and(|stop| pnl <= stop);
        if pnl >= self.policy.trail_activate && trail_hit {
            return (Action::Exit, Reason::TrailingStop);
        }

        if pnl >= thresholds.dynamic_target {
            return (Action::Exit, Reason::ProfitTarget);
        }

        if pnl < 0.0 {
            let tolerance = self.policy.wick_imbalance;
            let book_favours_side = match open.side {
                Side::Long => features.imbalance > -tolerance,
                Side::Short => features.imbalance < tolerance,
            };
            if book_favours_side {
                return (Action::Hold, Reason::WickProtection);
            }
        }

        if pnl <= thresholds.soft_stop
            && open.time_in_trade >= self.policy.min_cycles_before_invalidation
        {
            return (Action::Exit, Reason::HardInvalidation);
        }

        (Action::Hold, Reason::NoExitSignal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Level, OrderBook};

    fn rising_prices() -> Vec<f64> {
        vec![100.0, 100.1, 100.2, 100.3, 100.4, 100.5]
    }

    fn falling_prices() -> Vec<f64> {
        vec![100.5, 100.4, 100.3, 100.2, 100.1, 100.0]
    }

    fn book(bid_vol: f64, ask_vol: f64) -> OrderBook {
        OrderBook::new(vec![Level::new(99.9, bid_vol)], vec![Level::new(100.1, ask_vol)])
    }

    fn open_state(side: Side, pnl: f64, time_in_trade: u32, trail_stop: Option<f64>) -> PositionState {
        PositionState::open(OpenPosition {
            side,
            entry_price: 100.0,
            pnl,
            time_in_trade,
            trail_stop,
        })
    }

    #[test]
    fn cooldown_forces_hold_without_features() {
        let engine = DecisionEngine::default();
        let snap = MarketSnapshot::new(rising_prices(), book(150.0, 90.0));
        let state = PositionState::flat().with_cooldown(1);
        let decision = engine.evaluate(&snap, &state);
        assert_eq!(decision.action, Action::Hold);
        assert_eq!(decision.reason, Reason::Cooldown);
        assert!(decision.features.is_none());
    }

    #[test]
    fn long_entry_on_bid_pressure_and_positive_momentum() {
        let engine = DecisionEngine::default();
        let snap = MarketSnapshot::new(rising_prices(), book(150.0, 90.0));
        let decision = engine.evaluate(&snap, &PositionState::flat());
        assert_eq!(decision.action, Action::Buy);
        assert_eq!(decision.reason, Reason::LongEntry);
    }

    #[test]
    fn short_entry_on_ask_pressure_and_negative_momentum() {
        let engine = DecisionEngine::default();
        let snap = MarketSnapshot::new(falling_prices(), book(90.0, 150.0));
        assert_eq!(engine.decide(&snap, &PositionState::flat()), Action::Sell);
    }

    #[test]
    fn signals_must_agree() {
        let engine = DecisionEngine::default();
        // Bid pressure, falling prices
        let snap = MarketSnapshot::new(falling_prices(), book(150.0, 90.0));
        let decision = engine.evaluate(&snap, &PositionState::flat());
        assert_eq!(decision.action, Action::Hold);
        assert_eq!(decision.reason, Reason::NoEntrySignal);
    }

    #[test]
    fn imbalance_threshold_is_strict() {
        let engine = DecisionEngine::default();
        // (59 - 41) / 100 = 0.18, not above the threshold
        let snap = MarketSnapshot::new(rising_prices(), book(59.0, 41.0));
        assert_eq!(engine.decide(&snap, &PositionState::flat()), Action::Hold);
    }

    #[test]
    fn short_history_never_enters() {
        let engine = DecisionEngine::default();
        let snap = MarketSnapshot::new(vec![100.0, 101.0], book(1000.0, 1.0));
        assert_eq!(engine.decide(&snap, &PositionState::flat()), Action::Hold);
    }

    #[test]
    fn up_bias_vetoes_ask_pressure() {
        let engine = DecisionEngine::default();
        let snap = MarketSnapshot::new(falling_prices(), book(90.0, 150.0));
        let state = PositionState::flat().with_trend_bias(TrendBias::Up);
        let decision = engine.evaluate(&snap, &state);
        assert_eq!(decision.action, Action::Hold);
        assert_eq!(decision.reason, Reason::TrendVeto);
    }

    #[test]
    fn aligned_bias_does_not_block() {
        let engine = DecisionEngine::default();
        let snap = MarketSnapshot::new(rising_prices(), book(150.0, 90.0));
        let state = PositionState::flat().with_trend_bias(TrendBias::Up);
        assert_eq!(engine.decide(&snap, &state), Action::Buy);
    }

    #[test]
    fn trailing_stop_exit() {
        let engine = DecisionEngine::default();
        let snap = MarketSnapshot::new(rising_prices(), book(100.0, 100.0));
        let decision = engine.evaluate(&snap, &open_state(Side::Long, 0.35, 4, Some(0.36)));
        assert_eq!(decision.action, Action::Exit);
        assert_eq!(decision.reason, Reason::TrailingStop);
    }

    #[test]
    fn trailing_stop_ignored_below_activation() {
        let engine = DecisionEngine::default();
        let snap = MarketSnapshot::new(rising_prices(), book(100.0, 100.0));
        let decision = engine.evaluate(&snap, &open_state(Side::Long, 0.25, 4, Some(0.28)));
        assert_eq!(decision.action, Action::Hold);
        assert_eq!(decision.reason, Reason::NoExitSignal);
    }

    #[test]
    fn profit_target_exit() {
        let engine = DecisionEngine::default();
        let snap = MarketSnapshot::new(rising_prices(), book(100.0, 100.0));
        let decision = engine.evaluate(&snap, &open_state(Side::Long, 0.55, 2, None));
        assert_eq!(decision.action, Action::Exit);
        assert_eq!(decision.reason, Reason::ProfitTarget);
    }

    #[test]
    fn profit_target_widens_with_volatility() {
        let engine = DecisionEngine::default();
        // Alternating 99 / 101: population std = 1.0, target = 0.75
        let prices: Vec<f64> = (0..20).map(|i| if i % 2 == 0 { 99.0 } else { 101.0 }).collect();
        let snap = MarketSnapshot::new(prices, book(100.0, 100.0));
        assert_eq!(engine.decide(&snap, &open_state(Side::Long, 0.6, 2, None)), Action::Hold);
        assert_eq!(engine.decide(&snap, &open_state(Side::Long, 0.75, 2, None)), Action::Exit);
    }

    #[test]
    fn wick_protection_holds_losing_long() {
        let engine = DecisionEngine::default();
        // (95 - 105) / 200 = -0.05
        let snap = MarketSnapshot::new(rising_prices(), book(95.0, 105.0));
        let decision = engine.evaluate(&snap, &open_state(Side::Long, -0.1, 10, None));
        assert_eq!(decision.action, Action::Hold);
        assert_eq!(decision.reason, Reason::WickProtection);
    }

    #[test]
    fn wick_protection_suppresses_invalidation_while_book_favours_side() {
        let engine = DecisionEngine::default();
        let snap = MarketSnapshot::new(rising_prices(), book(100.0, 100.0));
        let decision = engine.evaluate(&snap, &open_state(Side::Long, -2.0, 10, None));
        assert_eq!(decision.reason, Reason::WickProtection);
    }

    #[test]
    fn hard_invalidation_exits_short() {
        let engine = DecisionEngine::default();
        // Book against the short: imbalance 0.25
        let snap = MarketSnapshot::new(rising_prices(), book(150.0, 90.0));
        let decision = engine.evaluate(&snap, &open_state(Side::Short, -0.5, 5, None));
        assert_eq!(decision.action, Action::Exit);
        assert_eq!(decision.reason, Reason::HardInvalidation);
    }

    #[test]
    fn hard_invalidation_waits_for_min_cycles() {
        let engine = DecisionEngine::default();
        let snap = MarketSnapshot::new(rising_prices(), book(150.0, 90.0));
        let decision = engine.evaluate(&snap, &open_state(Side::Short, -0.5, 1, None));
        assert_eq!(decision.action, Action::Hold);
        assert_eq!(decision.reason, Reason::NoExitSignal);
    }

    #[test]
    fn custom_policy_is_respected() {
        let policy = PolicyConfig {
            base_target: 0.2,
            ..PolicyConfig::default()
        };
        let engine = DecisionEngine::from_parts(FeatureConfig::default(), policy);
        let snap = MarketSnapshot::new(rising_prices(), book(100.0, 100.0));
        assert_eq!(engine.decide(&snap, &open_state(Side::Long, 0.25, 1, None)), Action::Exit);
        assert_eq!(
            DecisionEngine::default().decide(&snap, &open_state(Side::Long, 0.25, 1, None)),
            Action::Hold
        );
    }
}
