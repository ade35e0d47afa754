//! Runtime event stream payloads.

use crate::types::Number;

/// Events emitted from the single-writer runtime loop.
#[derive(Debug, Clone, PartialEq)]
pub enum CalcEvent {
    /// A calculation succeeded and joined the history.
    Computed {
        /// Operation name.
        operation: String,
        /// Rounded result.
        result: Number,
    },
    /// One undo step was applied.
    UndoApplied,
    /// One redo step was applied.
    RedoApplied,
    /// The history was cleared.
    Cleared,
    /// The history was written to disk.
    Saved,
    /// The history was replaced from disk.
    Loaded {
        /// Number of records now in history.
        records: usize,
    },
}
