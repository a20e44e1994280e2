//! microbot core: feature extraction and the trading decision engine.
//!
//! This crate contains:
//! - Domain types (market snapshot, order book, position state, actions, trade records)
//! - Feature extractor (order book imbalance, momentum, volatility, trend strength)
//! - Decision engine (cooldown gate, entry filter, trailing stop, profit target,
//!   wick protection, hard invalidation)
//! - TOML-backed configuration for feature windows and policy thresholds
//!
//! Nothing here performs I/O beyond reading a config file, and nothing here
//! mutates position state: the caller owns it and applies the returned action.

pub mod config;
pub mod domain;
pub mod engine;
pub mod features;

pub use config::{ConfigError, EngineConfig};
pub use domain::{
    Action, Level, MarketSnapshot, OpenPosition, OrderBook, Position, PositionState, Side,
    TradeRecord, TrendBias,
};
pub use engine::{Decision, DecisionEngine, PolicyConfig, Reason};
pub use features::{FeatureConfig, FeatureSet};
