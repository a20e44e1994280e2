//! Order book snapshot: price levels on each side of the book.

use serde::{Deserialize, Serialize};

/// A single (price, volume) level.
///
/// Serialized as a two-element array, the shape exchanges return for depth
/// snapshots: `[price, volume]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "(f64, f64)", into = "(f64, f64)")]
pub struct Level {
    pub price: f64,
    pub volume: f64,
}

impl Level {
    pub fn new(price: f64, volume: f64) -> Self {
        Self { price, volume }
    }

    /// Volume usable for aggregation. Negative or non-finite volumes count as zero.
    pub fn usable_volume(&self) -> f64 {
        if self.volume.is_finite() && self.volume > 0.0 {
            self.volume
        } else {
            0.0
        }
    }
}

impl From<(f64, f64)> for Level {
    fn from((price, volume): (f64, f64)) -> Self {
        Self { price, volume }
    }
}

impl From<Level> for (f64, f64) {
    fn from(level: Level) -> Self {
        (level.price, level.volume)
    }
}

/// Order book snapshot.
///
/// `bids` are ordered by descending price, `asks` by ascending price, so the
/// first entries on each side are closest to the mid price. Either side may be
/// empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderBook {
    #[serde(default)]
    pub bids: Vec<Level>,
    #[serde(default)]
    pub asks: Vec<Level>,
}

impl OrderBook {
    pub fn new(bids: Vec<Level>, asks: Vec<Level>) -> Self {
        Self { bids, asks }
    }

    /// A book with no levels on either side.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A one-level book around `price` carrying the given aggregate volumes.
    ///
    /// Used when a data source only reports aggregate bid/ask volume.
    pub fn top_of_book(price: f64, bid_volume: f64, ask_volume: f64) -> Self {
        Self {
            bids: vec![Level::new(price, bid_volume)],
            asks: vec![Level::new(price, ask_volume)],
        }
    }

    /// Aggregate bid volume over the top `depth` levels.
    pub fn bid_volume(&self, depth: usize) -> f64 {
        side_volume(&self.bids, depth)
    }

    /// Aggregate ask volume over the top `depth` levels.
    pub fn ask_volume(&self, depth: usize) -> f64 {
        side_volume(&self.asks, depth)
    }

    pub fn is_empty(&self) -> bool {
        self.bids.is_empty() && self.asks.is_empty()
    }
}

fn side_volume(levels: &[Level], depth: usize) -> f64 {
    levels.iter().take(depth).map(Level::usable_volume).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn side_volume_reads_only_top_levels() {
        let book = OrderBook::new(
            vec![Level::new(100.0, 1.0), Level::new(99.0, 2.0), Level::new(98.0, 4.0)],
            vec![Level::new(101.0, 8.0)],
        );
        assert_eq!(book.bid_volume(2), 3.0);
        assert_eq!(book.bid_volume(10), 7.0);
        assert_eq!(book.ask_volume(10), 8.0);
        assert_eq!(book.ask_volume(0), 0.0);
    }

    #[test]
    fn malformed_volumes_count_as_zero() {
        let book = OrderBook::new(
            vec![Level::new(100.0, -5.0), Level::new(99.0, f64::NAN)],
            vec![Level::new(101.0, f64::INFINITY)],
        );
        assert_eq!(book.bid_volume(10), 0.0);
        assert_eq!(book.ask_volume(10), 0.0);
    }

    #[test]
    fn levels_deserialize_from_pairs() {
        let json = r#"{"bids": [[100.5, 3.0], [100.0, 1.5]], "asks": [[101.0, 2.0]]}"#;
        let book: OrderBook = serde_json::from_str(json).unwrap();
        assert_eq!(book.bids.len(), 2);
        assert_eq!(book.bids[1], Level::new(100.0, 1.5));
        assert_eq!(book.asks[0].volume, 2.0);
    }

    #[test]
    fn missing_side_defaults_to_empty() {
        let book: OrderBook = serde_json::from_str(r#"{"bids": [[1.0, 1.0]]}"#).unwrap();
        assert!(book.asks.is_empty());
        assert!(!book.is_empty());
        assert!(OrderBook::empty().is_empty());
    }
}
