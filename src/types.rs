//! Shared primitive aliases.

use chrono::{DateTime, Utc};

/// Numeric operand and result type.
pub type Number = f64;

/// Creation instant of a calculation.
pub type Timestamp = DateTime<Utc>;

/// Column names of the persisted history file, in row order.
pub const HISTORY_COLUMNS: [&str; 5] = ["operation", "operand_a", "operand_b", "result", "timestamp"];
