//! Order book imbalance: normalized bid/ask volume difference.
//!
//! imbalance = (bid_vol - ask_vol) / (bid_vol + ask_vol) over the top `depth`
//! levels of each side. Range [-1, 1]; positive means buy-side pressure.

use crate::domain::OrderBook;

/// Returns `0.0` when both sides carry no usable volume.
pub fn orderbook_imbalance(book: &OrderBook, depth: usize) -> f64 {
    let bid_vol = book.bid_volume(depth);
    let ask_vol = book.ask_volume(depth);
    let total = bid_vol + ask_vol;

    if total <= 0.0 || !total.is_finite() {
        return 0.0;
    }
    (bid_vol - ask_vol) / total
}
