//! Domain types for the decision engine.

pub mod action;
pub mod orderbook;
pub mod position;
pub mod snapshot;
pub mod trade;

pub use action::Action;
pub use orderbook::{Level, OrderBook};
pub use position::{OpenPosition, Position, PositionState, Side, TrendBias};
pub use snapshot::MarketSnapshot;
pub use trade::TradeRecord;
