//! microbot runner: paper execution and replay around the decision engine.
//!
//! This crate builds on `microbot-core` to provide:
//! - Bot configuration (engine settings plus session settings) with fingerprinting
//! - Tick loading from CSV, with a deterministic synthetic fallback
//! - A paper session that marks positions, ratchets trailing stops and applies actions
//! - Replay of one or many instruments, with trade statistics
//! - A CSV trade journal and JSON/CSV/Markdown export

pub mod config;
pub mod data_loader;
pub mod export;
pub mod journal;
pub mod metrics;
pub mod replay;
pub mod session;

pub use config::{BotConfig, SessionConfig};
pub use data_loader::{load_ticks, parse_ticks, synthetic_ticks, DataSource, LoadError, LoadedTicks, Tick};
pub use journal::{append_trades, read_trades, JournalError};
pub use metrics::TradeStats;
pub use replay::{
    replay_file, replay_job, replay_many, run_replay, ReplayJob, ReplayResult, RunError,
    TickSource, SCHEMA_VERSION,
};
pub use session::{ActionCounts, PaperSession, Step};
