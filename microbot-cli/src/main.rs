//! microbot CLI: replay, one-shot decisions, and config inspection.
//!
//! Commands:
//! - `replay`: run the paper session over CSV ticks or synthetic data
//! - `decide`: evaluate one JSON-encoded snapshot + position state
//! - `features`: print the feature set of a tick file's final window
//! - `config`: print the effective configuration as TOML
//!
//! Logs go to stderr (`RUST_LOG` overrides the `info` default) so JSON on
//! stdout stays pipeable.

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::Deserialize;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use microbot_core::{MarketSnapshot, PositionState};
use microbot_runner::export::{export_json, generate_report};
use microbot_runner::{
    append_trades, load_ticks, replay_many, BotConfig, ReplayJob, ReplayResult,
};

#[derive(Parser)]
#[command(
    name = "microbot",
    about = "microbot: order-book imbalance scalping engine"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay tick files (or synthetic data) through the paper session.
    Replay {
        /// CSV tick files: `close` column required; `timestamp`, `bid_volume`,
        /// `ask_volume`, `trend_bias` optional.
        files: Vec<PathBuf>,

        /// Replay synthetic ticks for these symbols instead of files.
        #[arg(long, num_args = 1.., conflicts_with = "files")]
        synthetic: Vec<String>,

        /// Number of synthetic ticks per symbol.
        #[arg(long, default_value_t = 2_000)]
        ticks: usize,

        /// Path to a TOML config file.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Append closed trades to this CSV journal.
        #[arg(long)]
        journal: Option<PathBuf>,

        /// Print results as JSON instead of a text summary.
        #[arg(long, default_value_t = false)]
        json: bool,

        /// Write a Markdown report per instrument into this directory.
        #[arg(long)]
        report_dir: Option<PathBuf>,
    },
    /// Evaluate one snapshot + state read as JSON from a file or stdin.
    Decide {
        /// JSON file with `snapshot` and optional `state`. Reads stdin if omitted.
        input: Option<PathBuf>,

        /// Path to a TOML config file.
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Print the features of the last window of a tick file.
    Features {
        file: PathBuf,

        /// Path to a TOML config file.
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Print the effective configuration as TOML.
    Config {
        /// Path to a TOML config file. Defaults are printed if omitted.
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

/// Input document for `decide`.
#[derive(Debug, Deserialize)]
struct DecideInput {
    snapshot: MarketSnapshot,
    #[serde(default)]
    state: PositionState,
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    match cli.command {
        Commands::Replay {
            files,
            synthetic,
            ticks,
            config,
            journal,
            json,
            report_dir,
        } => run_replay_cmd(
            files,
            synthetic,
            ticks,
            config.as_deref(),
            journal.as_deref(),
            json,
            report_dir.as_deref(),
        ),
        Commands::Decide { input, config } => run_decide(input.as_deref(), config.as_deref()),
        Commands::Features { file, config } => run_features(&file, config.as_deref()),
        Commands::Config { config } => run_config(config.as_deref()),
    }
}

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<BotConfig> {
    match path {
        Some(path) => BotConfig::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display())),
        None => Ok(BotConfig::default()),
    }
}

fn run_replay_cmd(
    files: Vec<PathBuf>,
    synthetic: Vec<String>,
    ticks: usize,
    config_path: Option<&Path>,
    journal: Option<&Path>,
    json: bool,
    report_dir: Option<&Path>,
) -> Result<()> {
    let jobs: Vec<ReplayJob> = if !synthetic.is_empty() {
        synthetic
            .into_iter()
            .map(|symbol| ReplayJob::synthetic(symbol, ticks))
            .collect()
    } else if !files.is_empty() {
        files
            .into_iter()
            .map(|path| ReplayJob::csv(symbol_from_path(&path), path))
            .collect()
    } else {
        bail!("pass tick files or --synthetic <SYMBOL>...");
    };

    let config = load_config(config_path)?;
    let outcomes = replay_many(&config, &jobs);

    let mut results = Vec::with_capacity(outcomes.len());
    let mut failures = 0;
    for (job, outcome) in jobs.iter().zip(outcomes) {
        match outcome {
            Ok(result) => results.push(result),
            Err(err) => {
                failures += 1;
                warn!(symbol = %job.symbol, error = %err, "replay failed");
            }
        }
    }

    if let Some(journal) = journal {
        for result in &results {
            let rows = append_trades(journal, &result.trades)
                .with_context(|| format!("failed to write journal {}", journal.display()))?;
            info!(symbol = %result.symbol, rows, journal = %journal.display(), "journal updated");
        }
    }

    if let Some(dir) = report_dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create report dir: {}", dir.display()))?;
        for result in &results {
            let path = dir.join(format!("{}.md", result.symbol));
            std::fs::write(&path, generate_report(result))
                .with_context(|| format!("failed to write {}", path.display()))?;
        }
    }

    if json {
        for result in &results {
            println!("{}", export_json(result)?);
        }
    } else {
        for result in &results {
            print_summary(result);
        }
    }

    if failures > 0 {
        bail!("{failures} of {} replays failed", jobs.len());
    }
    Ok(())
}

fn symbol_from_path(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_uppercase())
        .unwrap_or_else(|| "UNKNOWN".to_string())
}

fn run_decide(input: Option<&Path>, config_path: Option<&Path>) -> Result<()> {
    let raw = match input {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read stdin")?;
            buf
        }
    };
    let input: DecideInput = serde_json::from_str(&raw).context("invalid decide input JSON")?;

    let engine = load_config(config_path)?.engine();
    let decision = engine.evaluate(&input.snapshot, &input.state);
    println!("{}", serde_json::to_string_pretty(&decision)?);
    Ok(())
}

fn run_features(file: &Path, config_path: Option<&Path>) -> Result<()> {
    let loaded = load_ticks(file).with_context(|| format!("failed to load {}", file.display()))?;
    let Some(last) = loaded.ticks.last() else {
        bail!("no ticks in {}", file.display());
    };

    let config = load_config(config_path)?;
    let features = &config.engine.features;
    let start = loaded.ticks.len().saturating_sub(features.max_lookback());
    let snapshot = MarketSnapshot::new(
        loaded.ticks[start..].iter().map(|t| t.close).collect(),
        last.orderbook(),
    );

    println!("{}", serde_json::to_string_pretty(&features.extract(&snapshot))?);
    Ok(())
}

fn run_config(config_path: Option<&Path>) -> Result<()> {
    let config = load_config(config_path)?;
    print!("{}", config.to_toml()?);
    println!("# fingerprint: {}", config.fingerprint()?);
    Ok(())
}

fn print_summary(result: &ReplayResult) {
    let s = &result.stats;
    let a = &result.actions;
    println!();
    println!("=== Replay Result ===");
    println!("Symbol:         {}", result.symbol);
    println!("Ticks:          {}", result.tick_count);
    if result.skipped_rows > 0 {
        println!("Skipped rows:   {}", result.skipped_rows);
    }
    println!(
        "Actions:        hold {} / buy {} / sell {} / exit {}",
        a.hold, a.buy, a.sell, a.exit
    );
    println!();
    println!("--- Trades ---");
    println!("Trades:         {}", s.trade_count);
    println!("Total PnL:      {:.4}", s.total_pnl);
    println!("Win Rate:       {:.1}%", s.win_rate);
    println!("Avg PnL:        {:.4}", s.avg_pnl);
    println!("Max Drawdown:   {:.4}", s.max_drawdown);
    match s.profit_factor {
        Some(pf) => println!("Profit Factor:  {pf:.2}"),
        None => println!("Profit Factor:  n/a"),
    }
    if let Some(open) = &result.open_position {
        println!();
        println!(
            "Open position:  {} from {:.4} ({:+.3}%, {} ticks)",
            open.side, open.entry_price, open.pnl, open.time_in_trade
        );
    }
    println!();
}
