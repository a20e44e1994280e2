//! Market snapshot: the market-side input to one evaluation cycle.

use serde::{Deserialize, Serialize};

use super::orderbook::OrderBook;

/// Recent prices plus the current order book.
///
/// `prices` runs oldest to newest. The caller may keep an arbitrarily long
/// history; features only read fixed-size suffixes of it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketSnapshot {
    #[serde(default)]
    pub prices: Vec<f64>,
    #[serde(default)]
    pub orderbook: OrderBook,
}

impl MarketSnapshot {
    pub fn new(prices: Vec<f64>, orderbook: OrderBook) -> Self {
        Self { prices, orderbook }
    }

    /// Most recent price, if any.
    pub fn last_price(&self) -> Option<f64> {
        self.prices.last().copied()
    }
}
