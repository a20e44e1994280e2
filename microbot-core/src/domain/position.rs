//! Position state: the caller-owned half of an evaluation cycle's input.
//!
//! The engine only reads these values. Opening, closing, marking pnl, ticking
//! counters and arming the trailing stop are all done by the caller between
//! cycles.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Direction of an open position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    #[serde(alias = "buy")]
    Long,
    #[serde(alias = "sell")]
    Short,
}

impl Side {
    /// +1 for long, -1 for short.
    pub fn sign(self) -> f64 {
        match self {
            Side::Long => 1.0,
            Side::Short => -1.0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Side::Long => "long",
            Side::Short => "short",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Direction hint from an external trend classifier. Entry filter only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendBias {
    Up,
    Down,
    #[default]
    Neutral,
}

impl std::str::FromStr for TrendBias {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "up" => Ok(TrendBias::Up),
            "down" => Ok(TrendBias::Down),
            "neutral" | "" => Ok(TrendBias::Neutral),
            other => Err(format!("unknown trend bias '{other}'")),
        }
    }
}

/// Fields that only exist while a position is open.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenPosition {
    pub side: Side,
    pub entry_price: f64,
    /// Unrealized pnl in percent of entry price, marked by the caller.
    #[serde(default)]
    pub pnl: f64,
    /// Cycles since entry.
    #[serde(default)]
    pub time_in_trade: u32,
    /// Armed trailing stop, in pnl units.
    #[serde(default)]
    pub trail_stop: Option<f64>,
}

impl OpenPosition {
    /// A freshly opened position: zero pnl, zero cycles, no trailing stop.
    pub fn new(side: Side, entry_price: f64) -> Self {
        Self {
            side,
            entry_price,
            pnl: 0.0,
            time_in_trade: 0,
            trail_stop: None,
        }
    }

    /// Percentage pnl of this position marked at `price`.
    pub fn pnl_at(&self, price: f64) -> f64 {
        if self.entry_price == 0.0 {
            return 0.0;
        }
        (price - self.entry_price) / self.entry_price * 100.0 * self.side.sign()
    }
}

/// Flat, or holding exactly one open position.
///
/// Exit-branch fields live inside `Open`, so an exit evaluation without an
/// entry cannot be expressed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Position {
    #[default]
    Flat,
    Open(OpenPosition),
}

impl Position {
    pub fn is_flat(&self) -> bool {
        matches!(self, Position::Flat)
    }

    pub fn as_open(&self) -> Option<&OpenPosition> {
        match self {
            Position::Flat => None,
            Position::Open(open) => Some(open),
        }
    }

    pub fn side(&self) -> Option<Side> {
        self.as_open().map(|open| open.side)
    }
}

/// Everything the engine needs to know about the instrument's trading state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PositionState {
    #[serde(default)]
    pub position: Position,
    /// Cycles left during which every evaluation returns `hold`.
    #[serde(default)]
    pub cooldown: u32,
    #[serde(default)]
    pub trend_bias: TrendBias,
}

impl PositionState {
    /// Flat, no cooldown, neutral bias.
    pub fn flat() -> Self {
        Self::default()
    }

    pub fn open(position: OpenPosition) -> Self {
        Self {
            position: Position::Open(position),
            ..Self::default()
        }
    }

    pub fn with_cooldown(mut self, cooldown: u32) -> Self {
        self.cooldown = cooldown;
        self
    }

    pub fn with_trend_bias(mut self, trend_bias: TrendBias) -> Self {
        self.trend_bias = trend_bias;
        self
    }
}
