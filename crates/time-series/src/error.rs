//! Table Error Types

use thiserror::Error;

/// Errors from structural misuse of the table
#[derive(Debug, Clone, Error)]
pub enum TableError {
    /// Column length does not match the table's row count
    #[error("column '{column}' has {actual} rows, table has {expected}")]
    LengthMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },

    /// Timestamp column length does not match the table's row count
    #[error("timestamp column has {actual} entries, table has {expected}")]
    TimeLengthMismatch { expected: usize, actual: usize },
}
