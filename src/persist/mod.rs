//! History persistence abstraction and CSV implementation.

/// CSV history file.
pub mod csv_file;

use std::path::PathBuf;

use thiserror::Error;

use crate::calculation::Calculation;

/// Failures while saving or loading history.
#[derive(Debug, Error)]
pub enum PersistError {
    /// No history file exists at this path.
    #[error("history file `{}` does not exist", .0.display())]
    NotFound(PathBuf),
    /// Filesystem error.
    #[error("history file I/O failed: {0}")]
    Io(#[from] std::io::Error),
    /// CSV encoding or decoding error.
    #[error("history file could not be read or written: {0}")]
    Csv(#[from] csv::Error),
    /// A row or the header could not be parsed; nothing was loaded.
    #[error("malformed record on line {line}: {reason}")]
    MalformedRecord {
        /// 1-based line in the file.
        line: u64,
        /// Parser message.
        reason: String,
    },
}

/// Result alias for persistence calls.
pub type PersistResult<T> = Result<T, PersistError>;

/// Whole-history storage backend.
///
/// `save` replaces everything previously stored; `load` returns either every
/// record or an error, never a prefix.
pub trait HistorySink: Send {
    /// Replaces the stored history with `records`.
    fn save(&mut self, records: &[Calculation]) -> PersistResult<()>;
    /// Reads back every stored record.
    fn load(&mut self) -> PersistResult<Vec<Calculation>>;
    /// Whether there is anything to load.
    fn exists(&self) -> bool {
        true
    }
}
