//! Reason codes naming which rule produced a decision.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identifier of the rule that fired. Suitable for logs and CSV columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reason {
    Cooldown,

    // Entry branch
    TrendVeto,
    LongEntry,
    ShortEntry,
    NoEntrySignal,

    // Exit branch
    TrailingStop,
    ProfitTarget,
    WickProtection,
    HardInvalidation,
    NoExitSignal,
}

impl Reason {
    pub fn as_str(self) -> &'static str {
        match self {
            Reason::Cooldown => "cooldown",
            Reason::TrendVeto => "trend_veto",
            Reason::LongEntry => "long_entry",
            Reason::ShortEntry => "short_entry",
            Reason::NoEntrySignal => "no_entry_signal",
            Reason::TrailingStop => "trailing_stop",
            Reason::ProfitTarget => "profit_target",
            Reason::WickProtection => "wick_protection",
            Reason::HardInvalidation => "hard_invalidation",
            Reason::NoExitSignal => "no_exit_signal",
        }
    }
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
