//! Replay runner: wires together data loading, the paper session, and metrics.
//!
//! Entry points:
//! - `run_replay()`: replay pre-loaded ticks, no I/O.
//! - `replay_file()`: load a CSV, then replay. Used by the CLI.
//! - `replay_many()`: independent instruments in parallel.

use std::path::{Path, PathBuf};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use microbot_core::domain::{OpenPosition, TradeRecord};
use microbot_core::ConfigError;

use crate::config::BotConfig;
use crate::data_loader::{load_ticks, synthetic_ticks, DataSource, LoadError, LoadedTicks};
use crate::journal::JournalError;
use crate::metrics::TradeStats;
use crate::session::{ActionCounts, PaperSession};

/// Errors from the replay runner.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("data error: {0}")]
    Data(#[from] LoadError),
    #[error("journal error: {0}")]
    Journal(#[from] JournalError),
    #[error("failed to fingerprint config: {0}")]
    Fingerprint(#[from] serde_json::Error),
}

/// Current schema version for persisted results.
pub const SCHEMA_VERSION: u32 = 1;

/// Complete result of one replay.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplayResult {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub symbol: String,
    pub config_fingerprint: String,
    pub dataset_hash: String,
    pub source: DataSource,
    pub tick_count: usize,
    pub skipped_rows: usize,
    pub actions: ActionCounts,
    pub stats: TradeStats,
    pub trades: Vec<TradeRecord>,
    /// Position still open when the data ran out. Never force-closed.
    pub open_position: Option<OpenPosition>,
}

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

/// Where one replay job gets its ticks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickSource {
    Csv(PathBuf),
    Synthetic { count: usize },
}

/// One instrument to replay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayJob {
    pub symbol: String,
    pub source: TickSource,
}

impl ReplayJob {
    pub fn csv(symbol: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            symbol: symbol.into(),
            source: TickSource::Csv(path.into()),
        }
    }

    pub fn synthetic(symbol: impl Into<String>, count: usize) -> Self {
        Self {
            symbol: symbol.into(),
            source: TickSource::Synthetic { count },
        }
    }

    fn load(&self) -> Result<LoadedTicks, LoadError> {
        match &self.source {
            TickSource::Csv(path) => load_ticks(path),
            TickSource::Synthetic { count } => Ok(synthetic_ticks(&self.symbol, *count)),
        }
    }
}

/// Replay pre-loaded ticks through a fresh paper session.
pub fn run_replay(
    config: &BotConfig,
    symbol: &str,
    loaded: &LoadedTicks,
) -> Result<ReplayResult, RunError> {
    config.validate()?;
    let fingerprint = config.fingerprint()?;

    if loaded.skipped_rows > 0 {
        warn!(symbol, skipped = loaded.skipped_rows, "rows skipped while loading ticks");
    }

    let mut session = PaperSession::new(config.engine(), config.session.clone());
    session.run(&loaded.ticks);

    let open_position = session.open_position().cloned();
    let actions = session.actions();
    let tick_count = session.ticks_seen();
    let trades = session.into_trades();
    let stats = TradeStats::from_trades(&trades);

    info!(
        symbol,
        ticks = tick_count,
        trades = stats.trade_count,
        total_pnl = stats.total_pnl,
        win_rate = stats.win_rate,
        open = open_position.is_some(),
        "replay finished"
    );

    Ok(ReplayResult {
        schema_version: SCHEMA_VERSION,
        symbol: symbol.to_string(),
        config_fingerprint: fingerprint,
        dataset_hash: loaded.dataset_hash.clone(),
        source: loaded.source,
        tick_count,
        skipped_rows: loaded.skipped_rows,
        actions,
        stats,
        trades,
        open_position,
    })
}

/// Load ticks from a CSV file and replay them.
pub fn replay_file(config: &BotConfig, symbol: &str, path: &Path) -> Result<ReplayResult, RunError> {
    let loaded = load_ticks(path)?;
    info!(symbol, path = %path.display(), ticks = loaded.ticks.len(), "ticks loaded");
    run_replay(config, symbol, &loaded)
}

/// Replay a single job, loading its ticks first.
pub fn replay_job(config: &BotConfig, job: &ReplayJob) -> Result<ReplayResult, RunError> {
    let loaded = job.load()?;
    run_replay(config, &job.symbol, &loaded)
}

/// Replay independent instruments in parallel.
///
/// Each job gets its own session; results come back in job order. One
/// failing job does not stop the others.
pub fn replay_many(config: &BotConfig, jobs: &[ReplayJob]) -> Vec<Result<ReplayResult, RunError>> {
    jobs.par_iter().map(|job| replay_job(config, job)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synthetic_replay_is_deterministic() {
        let config = BotConfig::default();
        let a = replay_job(&config, &ReplayJob::synthetic("SPY", 500)).unwrap();
        let b = replay_job(&config, &ReplayJob::synthetic("SPY", 500)).unwrap();

        assert_eq!(a.tick_count, 500);
        assert_eq!(a.actions.total(), 500);
        assert_eq!(a.trades, b.trades);
        assert_eq!(a.dataset_hash, b.dataset_hash);
        assert_eq!(a.config_fingerprint, b.config_fingerprint);
        assert_eq!(a.source, DataSource::Synthetic);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let mut config = BotConfig::default();
        config.engine.features.momentum_lookback = 0;
        let err = replay_job(&config, &ReplayJob::synthetic("SPY", 10)).unwrap_err();
        assert!(matches!(err, RunError::Config(_)));
    }

    #[test]
    fn missing_csv_is_data_error() {
        let config = BotConfig::default();
        let err = replay_job(&config, &ReplayJob::csv("X", "/nonexistent/ticks.csv")).unwrap_err();
        assert!(matches!(err, RunError::Data(_)));
    }

    #[test]
    fn replay_many_keeps_job_order() {
        let config = BotConfig::default();
        let jobs = vec![
            ReplayJob::synthetic("AAA", 200),
            ReplayJob::csv("BAD", "/nonexistent/ticks.csv"),
            ReplayJob::synthetic("BBB", 300),
        ];
        let results = replay_many(&config, &jobs);
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].as_ref().unwrap().symbol, "AAA");
        assert!(results[1].is_err());
        assert_eq!(results[2].as_ref().unwrap().tick_count, 300);
    }

    #[test]
    fn result_json_roundtrip() {
        let config = BotConfig::default();
        let result = replay_job(&config, &ReplayJob::synthetic("SPY", 300)).unwrap();
        let json = serde_json::to_string(&result).unwrap();
        let back: ReplayResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back.trades.len(), result.trades.len());
        assert_eq!(back.schema_version, SCHEMA_VERSION);
        assert_eq!(back.config_fingerprint, result.config_fingerprint);
    }
}
