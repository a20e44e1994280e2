//! Tick loading for replay.
//!
//! Ticks come from a CSV file with a header row. Recognized columns:
//!
//! | column       | required | meaning                                   |
//! |--------------|----------|-------------------------------------------|
//! | `close`      | yes      | trade price for the cycle                 |
//! | `timestamp`  | no       | RFC 3339, `YYYY-MM-DD HH:MM:SS`, or epoch |
//! | `bid_volume` | no       | aggregate bid volume near the top of book |
//! | `ask_volume` | no       | aggregate ask volume near the top of book |
//! | `trend_bias` | no       | `up`, `down` or `neutral`                 |
//!
//! Other columns are ignored. Rows with an empty or non-positive close are
//! skipped with a warning. Without a data file, a deterministic synthetic
//! random walk can be generated instead; those results are tagged.

use std::io::Read;
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use microbot_core::domain::{OrderBook, TrendBias};

/// Errors from the tick loading layer.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to open tick file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("tick data has no '{0}' column")]
    MissingColumn(&'static str),
    #[error("row {row}: unrecognized timestamp '{value}'")]
    Timestamp { row: usize, value: String },
    #[error("row {row}: {reason}")]
    TrendBias { row: usize, reason: String },
    #[error("tick data contains no usable rows")]
    Empty,
}

/// Where replay ticks came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    Csv,
    Synthetic,
}

/// One evaluation cycle's worth of market data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tick {
    pub timestamp: Option<DateTime<Utc>>,
    pub close: f64,
    pub bid_volume: Option<f64>,
    pub ask_volume: Option<f64>,
    pub trend_bias: Option<TrendBias>,
}

impl Tick {
    /// A price-only tick.
    pub fn new(close: f64) -> Self {
        Self {
            timestamp: None,
            close,
            bid_volume: None,
            ask_volume: None,
            trend_bias: None,
        }
    }

    pub fn with_volumes(mut self, bid_volume: f64, ask_volume: f64) -> Self {
        self.bid_volume = Some(bid_volume);
        self.ask_volume = Some(ask_volume);
        self
    }

    pub fn with_trend_bias(mut self, bias: TrendBias) -> Self {
        self.trend_bias = Some(bias);
        self
    }

    /// Order book implied by the tick: one level per side at the close, or an
    /// empty book when no volumes were recorded.
    pub fn orderbook(&self) -> OrderBook {
        match (self.bid_volume, self.ask_volume) {
            (None, None) => OrderBook::empty(),
            (bid, ask) => {
                OrderBook::top_of_book(self.close, bid.unwrap_or(0.0), ask.unwrap_or(0.0))
            }
        }
    }
}

/// Ticks plus provenance.
#[derive(Debug, Clone)]
pub struct LoadedTicks {
    pub ticks: Vec<Tick>,
    pub source: DataSource,
    /// Rows dropped for an empty or non-positive close.
    pub skipped_rows: usize,
    /// BLAKE3 over every tick's close, for tagging results.
    pub dataset_hash: String,
}

impl LoadedTicks {
    fn new(ticks: Vec<Tick>, source: DataSource, skipped_rows: usize) -> Self {
        let dataset_hash = dataset_hash(&ticks);
        Self {
            ticks,
            source,
            skipped_rows,
            dataset_hash,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawTick {
    #[serde(default)]
    timestamp: Option<String>,
    close: Option<f64>,
    #[serde(default)]
    bid_volume: Option<f64>,
    #[serde(default)]
    ask_volume: Option<f64>,
    #[serde(default)]
    trend_bias: Option<String>,
}

/// Load ticks from a CSV file.
pub fn load_ticks(path: &Path) -> Result<LoadedTicks, LoadError> {
    let file = std::fs::File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_ticks(file)
}

/// Parse ticks from any CSV reader.
pub fn parse_ticks<R: Read>(reader: R) -> Result<LoadedTicks, LoadError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    if !rdr.headers()?.iter().any(|h| h == "close") {
        return Err(LoadError::MissingColumn("close"));
    }

    let mut ticks = Vec::new();
    let mut skipped = 0;

    for (i, record) in rdr.deserialize::<RawTick>().enumerate() {
        // 1-based, counting the header
        let row = i + 2;
        let raw = record?;

        let close = match raw.close {
            Some(c) if c.is_finite() && c > 0.0 => c,
            other => {
                warn!(row, close = ?other, "skipping row without a usable close");
                skipped += 1;
                continue;
            }
        };

        let timestamp = match raw.timestamp.as_deref().filter(|s| !s.is_empty()) {
            Some(value) => Some(parse_timestamp(value).ok_or_else(|| LoadError::Timestamp {
                row,
                value: value.to_string(),
            })?),
            None => None,
        };

        let trend_bias = match raw.trend_bias.as_deref() {
            Some(value) => Some(
                value
                    .parse::<TrendBias>()
                    .map_err(|reason| LoadError::TrendBias { row, reason })?,
            ),
            None => None,
        };

        ticks.push(Tick {
            timestamp,
            close,
            bid_volume: raw.bid_volume,
            ask_volume: raw.ask_volume,
            trend_bias,
        });
    }

    if ticks.is_empty() {
        return Err(LoadError::Empty);
    }

    Ok(LoadedTicks::new(ticks, DataSource::Csv, skipped))
}

/// Accepts RFC 3339, `YYYY-MM-DD HH:MM:SS`, `YYYY-MM-DDTHH:MM:SS`, a bare
/// date, or an epoch in seconds (milliseconds when above 10^11).
fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, fmt) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|naive| Utc.from_utc_datetime(&naive));
    }
    if let Ok(epoch) = value.parse::<i64>() {
        return if epoch.abs() > 100_000_000_000 {
            Utc.timestamp_millis_opt(epoch).single()
        } else {
            Utc.timestamp_opt(epoch, 0).single()
        };
    }
    None
}

fn dataset_hash(ticks: &[Tick]) -> String {
    let mut hasher = blake3::Hasher::new();
    for tick in ticks {
        hasher.update(&tick.close.to_le_bytes());
    }
    hasher.finalize().to_hex().to_string()
}

/// Deterministic synthetic ticks for development runs.
pub fn synthetic_ticks(symbol: &str, count: usize) -> LoadedTicks {
    LoadedTicks::new(generate_synthetic_ticks(symbol, count), DataSource::Synthetic, 0)
}

/// Random walk from 100.0 with one tick per minute and random book volumes.
///
/// The walk has a slowly drifting bias so that order book pressure and
/// momentum line up often enough to trade. Seeded from the symbol name.
fn generate_synthetic_ticks(symbol: &str, count: usize) -> Vec<Tick> {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    let seed: [u8; 32] = *blake3::hash(symbol.as_bytes()).as_bytes();
    let mut rng = StdRng::from_seed(seed);

    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).single();
    let mut price = 100.0_f64;
    let mut drift = 0.0_f64;
    let mut ticks = Vec::with_capacity(count);

    for i in 0..count {
        drift = (drift + rng.gen_range(-0.0002..0.0002)).clamp(-0.001, 0.001);
        let step: f64 = rng.gen_range(-0.001..0.001) + drift;
        price *= 1.0 + step;

        // Book pressure leans the way the drift points.
        let lean = (drift * 400.0).clamp(-0.4, 0.4);
        let base = rng.gen_range(50.0..150.0);
        let bid_volume = base * (1.0 + lean);
        let ask_volume = base * (1.0 - lean);

        ticks.push(Tick {
            timestamp: start.map(|s| s + chrono::Duration::minutes(i as i64)),
            close: price,
            bid_volume: Some(bid_volume),
            ask_volume: Some(ask_volume),
            trend_bias: None,
        });
    }

    ticks
}
