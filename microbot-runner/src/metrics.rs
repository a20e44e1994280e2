//! Trade statistics: pure functions over closed trades.
//!
//! Everything here works on the currency `pnl` of each trade, in the order the
//! trades closed. No dependencies on the session, loader, or engine.

use serde::{Deserialize, Serialize};
use microbot_core::domain::TradeRecord;

/// Summary of a list of closed trades.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TradeStats {
    pub trade_count: usize,
    pub total_pnl: f64,
    /// Percentage of trades with positive pnl, 0–100.
    pub win_rate: f64,
    pub avg_pnl: f64,
    /// Depth of the lowest point of the cumulative pnl curve, as a positive number.
    pub max_drawdown: f64,
    /// `None` when there are winners but no losers.
    pub profit_factor: Option<f64>,
    pub max_consecutive_losses: usize,
    pub cumulative_pnl: Vec<f64>,
}

impl TradeStats {
    pub fn from_trades(trades: &[TradeRecord]) -> Self {
        let cumulative = cumulative_pnl(trades);
        Self {
            trade_count: trades.len(),
            total_pnl: total_pnl(trades),
            win_rate: win_rate(trades),
            avg_pnl: avg_pnl(trades),
            max_drawdown: max_drawdown(&cumulative),
            profit_factor: Some(profit_factor(trades)).filter(|pf| pf.is_finite()),
            max_consecutive_losses: max_consecutive_losses(trades),
            cumulative_pnl: cumulative,
        }
    }
}

// ─── Individual metric functions ────────────────────────────────────

pub fn total_pnl(trades: &[TradeRecord]) -> f64 {
    trades.iter().map(|t| t.pnl).sum()
}

/// Win rate in percent. 0.0 with no trades.
pub fn win_rate(trades: &[TradeRecord]) -> f64 {
    if trades.is_empty() {
        return 0.0;
    }
    let winners = trades.iter().filter(|t| t.is_winner()).count();
    winners as f64 / trades.len() as f64 * 100.0
}

pub fn avg_pnl(trades: &[TradeRecord]) -> f64 {
    if trades.is_empty() {
        return 0.0;
    }
    total_pnl(trades) / trades.len() as f64
}

/// Running sum of trade pnl.
pub fn cumulative_pnl(trades: &[TradeRecord]) -> Vec<f64> {
    trades
        .iter()
        .scan(0.0, |acc, t| {
            *acc += t.pnl;
            Some(*acc)
        })
        .collect()
}

/// Magnitude of the lowest cumulative pnl. 0.0 if the curve never drops below zero.
pub fn max_drawdown(cumulative: &[f64]) -> f64 {
    let lowest = cumulative.iter().copied().fold(0.0_f64, f64::min);
    lowest.abs()
}

/// Gross profit / gross loss.
///
/// Returns `f64::INFINITY` when there are winners and no losers, 0.0 when
/// there are no winners.
pub fn profit_factor(trades: &[TradeRecord]) -> f64 {
    let gross_profit: f64 = trades.iter().filter(|t| t.pnl > 0.0).map(|t| t.pnl).sum();
    let gross_loss: f64 = trades
        .iter()
        .filter(|t| t.pnl < 0.0)
        .map(|t| t.pnl.abs())
        .sum();

    if gross_loss == 0.0 {
        return if gross_profit > 0.0 { f64::INFINITY } else { 0.0 };
    }
    gross_profit / gross_loss
}

pub fn max_consecutive_losses(trades: &[TradeRecord]) -> usize {
    let mut max_streak = 0;
    let mut current = 0;
    for t in trades {
        if t.pnl < 0.0 {
            current += 1;
            max_streak = max_streak.max(current);
        } else {
            current = 0;
        }
    }
    max_streak
}
