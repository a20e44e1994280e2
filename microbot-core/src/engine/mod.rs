//! Decision engine: maps (snapshot, position state) to one action per cycle.
//!
//! Evaluation order, first match wins:
//!
//! 1. Cooldown gate: any remaining cooldown forces `hold`
//! 2. Flat: trend-bias veto, then imbalance + momentum entry
//! 3. Open: trailing stop, profit target, wick protection, hard invalidation
//!
//! The engine owns no mutable state. The same inputs always produce the same
//! action, so live and replayed data go through one code path.

pub mod decision;
pub mod policy;
pub mod reason;

pub use decision::{Decision, DecisionEngine, ExitThresholds};
pub use policy::{PolicyConfig, BASE_TARGET, TRAIL_ACTIVATE};
pub use reason::Reason;
