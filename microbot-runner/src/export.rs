//! Result export: JSON, CSV, and a Markdown summary of a replay.
//!
//! Persisted JSON carries a `schema_version`; newer versions are rejected on
//! load.

use anyhow::{bail, Context, Result};
use microbot_core::domain::TradeRecord;

use crate::replay::{ReplayResult, SCHEMA_VERSION};

// ─── JSON export ────────────────────────────────────────────────────

/// Serialize a `ReplayResult` to pretty JSON.
pub fn export_json(result: &ReplayResult) -> Result<String> {
    serde_json::to_string_pretty(result).context("failed to serialize ReplayResult to JSON")
}

/// Deserialize a `ReplayResult` from JSON, rejecting unknown schema versions.
pub fn import_json(json: &str) -> Result<ReplayResult> {
    let result: ReplayResult =
        serde_json::from_str(json).context("failed to deserialize ReplayResult from JSON")?;
    if result.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            result.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(result)
}

/// Trades alone, as a pretty JSON array.
pub fn export_trades_json(trades: &[TradeRecord]) -> Result<String> {
    serde_json::to_string_pretty(trades).context("failed to serialize trades to JSON")
}

// ─── CSV export ─────────────────────────────────────────────────────

/// Trade tape as CSV, formatted for reading rather than reloading.
///
/// Columns: side, entry_tick, entry_price, exit_tick, exit_price, quantity,
/// pnl, pnl_pct, time_in_trade, confidence, live, exit_reason
pub fn export_trades_csv(trades: &[TradeRecord]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "side",
        "entry_tick",
        "entry_price",
        "exit_tick",
        "exit_price",
        "quantity",
        "pnl",
        "pnl_pct",
        "time_in_trade",
        "confidence",
        "live",
        "exit_reason",
    ])?;

    for t in trades {
        wtr.write_record([
            t.side.as_str().to_string(),
            t.entry_tick.to_string(),
            format!("{:.6}", t.entry_price),
            t.exit_tick.to_string(),
            format!("{:.6}", t.exit_price),
            format!("{:.6}", t.quantity),
            format!("{:.4}", t.pnl),
            format!("{:.4}", t.pnl_pct),
            t.time_in_trade.to_string(),
            format!("{:.0}", t.confidence),
            t.live.to_string(),
            t.exit_reason.map(|r| r.as_str()).unwrap_or("").to_string(),
        ])?;
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

// ─── Markdown report ────────────────────────────────────────────────

/// Markdown summary of one replay.
pub fn generate_report(result: &ReplayResult) -> String {
    let mut md = String::with_capacity(1024);

    md.push_str("# Replay Report\n\n");

    md.push_str("## Metadata\n\n");
    md.push_str("| Field | Value |\n");
    md.push_str("| --- | --- |\n");
    md.push_str(&format!("| Symbol | {} |\n", result.symbol));
    md.push_str(&format!("| Ticks | {} |\n", result.tick_count));
    if result.skipped_rows > 0 {
        md.push_str(&format!("| Skipped Rows | {} |\n", result.skipped_rows));
    }
    md.push_str(&format!("| Dataset Hash | {} |\n", result.dataset_hash));
    md.push_str(&format!("| Config | {} |\n", result.config_fingerprint));
    if result.source == crate::data_loader::DataSource::Synthetic {
        md.push_str("| Data | **SYNTHETIC** |\n");
    }
    md.push('\n');

    let a = &result.actions;
    md.push_str("## Actions\n\n");
    md.push_str("| Hold | Buy | Sell | Exit |\n");
    md.push_str("| --- | --- | --- | --- |\n");
    md.push_str(&format!("| {} | {} | {} | {} |\n\n", a.hold, a.buy, a.sell, a.exit));

    let s = &result.stats;
    md.push_str("## Trades\n\n");
    md.push_str("| Metric | Value |\n");
    md.push_str("| --- | --- |\n");
    md.push_str(&format!("| Trades | {} |\n", s.trade_count));
    md.push_str(&format!("| Total PnL | {:.4} |\n", s.total_pnl));
    md.push_str(&format!("| Win Rate | {:.1}% |\n", s.win_rate));
    md.push_str(&format!("| Avg PnL | {:.4} |\n", s.avg_pnl));
    md.push_str(&format!("| Max Drawdown | {:.4} |\n", s.max_drawdown));
    match s.profit_factor {
        Some(pf) => md.push_str(&format!("| Profit Factor | {pf:.2} |\n")),
        None => md.push_str("| Profit Factor | n/a (no losers) |\n"),
    }
    md.push_str(&format!(
        "| Max Consecutive Losses | {} |\n",
        s.max_consecutive_losses
    ));

    if let Some(open) = &result.open_position {
        md.push_str(&format!(
            "\nStill open: {} from {:.4}, pnl {:.3}% after {} ticks\n",
            open.side, open.entry_price, open.pnl, open.time_in_trade
        ));
    }

    md
}
