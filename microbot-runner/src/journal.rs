//! Trade journal: closed trades appended to a CSV file.
//!
//! One row per trade. The header is written only when the file is created
//! (or is still empty), so repeated sessions keep appending to the same
//! journal.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use microbot_core::domain::TradeRecord;

#[derive(Debug, Error)]
pub enum JournalError {
    #[error("failed to open journal {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("journal CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Append `trades` to the journal at `path`, creating it if needed.
///
/// Returns the number of rows written.
pub fn append_trades(path: &Path, trades: &[TradeRecord]) -> Result<usize, JournalError> {
    let io_err = |source| JournalError::Io {
        path: path.to_path_buf(),
        source,
    };

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(io_err)?;
    let needs_header = file.metadata().map_err(io_err)?.len() == 0;

    let mut wtr = csv::WriterBuilder::new()
        .has_headers(needs_header)
        .from_writer(file);
    for trade in trades {
        wtr.serialize(trade)?;
    }
    wtr.flush().map_err(io_err)?;

    debug!(path = %path.display(), rows = trades.len(), header = needs_header, "journal appended");
    Ok(trades.len())
}

/// Read every trade back from a journal file.
pub fn read_trades(path: &Path) -> Result<Vec<TradeRecord>, JournalError> {
    let mut rdr = csv::Reader::from_path(path)?;
    let trades = rdr.deserialize().collect::<Result<Vec<TradeRecord>, _>>()?;
    Ok(trades)
}
