//! Action: the engine's one output per cycle.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::position::Side;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Hold,
    Buy,
    Sell,
    Exit,
}

impl Action {
    /// Side opened by this action, if it is an entry.
    pub fn entry_side(self) -> Option<Side> {
        match self {
            Action::Buy => Some(Side::Long),
            Action::Sell => Some(Side::Short),
            Action::Hold | Action::Exit => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Action::Hold => "hold",
            Action::Buy => "buy",
            Action::Sell => "sell",
            Action::Exit => "exit",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
