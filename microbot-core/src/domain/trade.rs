//! TradeRecord: a closed round trip, in the shape the persistence layer stores.

use serde::{Deserialize, Serialize};

use super::position::{OpenPosition, Side};
use crate::engine::Reason;

/// A completed trade: entry → exit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    pub side: Side,

    // ── Entry / exit ──
    pub entry_tick: usize,
    pub entry_price: f64,
    pub exit_tick: usize,
    pub exit_price: f64,

    // ── Size ──
    pub quantity: f64,

    // ── PnL ──
    /// Price-difference pnl times quantity.
    pub pnl: f64,
    /// Percent of entry price.
    pub pnl_pct: f64,

    /// Cycles the position stayed open.
    pub time_in_trade: u32,
    pub confidence: f64,
    /// True for trades executed against a live venue, false for simulated ones.
    pub live: bool,
    /// Rule that produced the exit, when known.
    #[serde(default)]
    pub exit_reason: Option<Reason>,
}

impl TradeRecord {
    /// Close `position` at `exit_price`.
    #[allow(clippy::too_many_arguments)]
    pub fn close(
        position: &OpenPosition,
        entry_tick: usize,
        exit_tick: usize,
        exit_price: f64,
        quantity: f64,
        confidence: f64,
        live: bool,
        exit_reason: Option<Reason>,
    ) -> Self {
        let pnl = (exit_price - position.entry_price) * quantity * position.side.sign();
        Self {
            side: position.side,
            entry_tick,
            entry_price: position.entry_price,
            exit_tick,
            exit_price,
            quantity,
            pnl,
            pnl_pct: position.pnl_at(exit_price),
            time_in_trade: position.time_in_trade,
            confidence,
            live,
            exit_reason,
        }
    }

    pub fn is_winner(&self) -> bool {
        self.pnl > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_close_pnl() {
        let mut pos = OpenPosition::new(Side::Long, 100.0);
        pos.time_in_trade = 7;
        let trade = TradeRecord::close(&pos, 3, 10, 101.0, 2.0, 100.0, false, Some(Reason::ProfitTarget));
        assert!((trade.pnl - 2.0).abs() < 1e-12);
        assert!((trade.pnl_pct - 1.0).abs() < 1e-12);
        assert_eq!(trade.time_in_trade, 7);
        assert!(trade.is_winner());
    }

    #[test]
    fn short_close_pnl_is_negated() {
        let pos = OpenPosition::new(Side::Short, 100.0);
        let trade = TradeRecord::close(&pos, 0, 4, 102.0, 0.5, 100.0, true, None);
        assert!((trade.pnl + 1.0).abs() < 1e-12);
        assert!(trade.pnl_pct < 0.0);
        assert!(!trade.is_winner());
        assert!(trade.live);
    }

    #[test]
    fn serialization_roundtrip() {
        let pos = OpenPosition::new(Side::Long, 50.0);
        let trade = TradeRecord::close(&pos, 1, 2, 49.0, 1.0, 80.0, false, Some(Reason::HardInvalidation));
        let json = serde_json::to_string(&trade).unwrap();
        let back: TradeRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(trade, back);
    }
}
