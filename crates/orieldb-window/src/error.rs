//! Error types for window plan extraction and execution.

use thiserror::Error;

/// Errors that can occur while extracting or executing a window plan.
///
/// Everything in this enum is a deterministic plan or invariant error:
/// nothing here is retried. Plan-shape problems (`UnsupportedBoundKind`,
/// `UnsupportedOperator`, `ConstantOutOfRange`) are surfaced during group
/// extraction, before any partition is processed.
#[derive(Debug, Error)]
pub enum WindowError {
    /// A frame bound is neither unbounded, current-row, nor a resolvable
    /// preceding/following offset.
    #[error("unsupported frame bound: {0}")]
    UnsupportedBoundKind(String),

    /// An aggregate call names an operator absent from both the built-in
    /// set and the user-defined registry.
    #[error("unsupported window operator: {0}")]
    UnsupportedOperator(String),

    /// A constant-pool reference points outside the pool.
    #[error("constant reference {index} out of range for pool of {len}")]
    ConstantOutOfRange {
        /// The dereferenced pool index.
        index: usize,
        /// The pool length.
        len: usize,
    },

    /// Computed frame offsets would place a frame end before its start.
    ///
    /// This is an internal-invariant violation: the job is aborted rather
    /// than silently producing an empty frame.
    #[error("invalid frame bounds: lower offset {lower_offset} exceeds upper offset {upper_offset}")]
    InvalidFrameBounds {
        /// Signed lower frame offset.
        lower_offset: i64,
        /// Signed upper frame offset.
        upper_offset: i64,
    },

    /// A referenced column does not exist in the table.
    #[error("column not found: {0}")]
    ColumnNotFound(String),

    /// A column's length does not match the table's row count.
    #[error("column '{column}' has {actual} rows, expected {expected}")]
    ColumnLengthMismatch {
        /// The offending column name.
        column: String,
        /// The table row count.
        expected: usize,
        /// The column's row count.
        actual: usize,
    },

    /// A partition exceeded the configured row limit.
    #[error("partition of {actual} rows exceeds limit of {limit}")]
    PartitionTooLarge {
        /// Rows in the partition.
        actual: usize,
        /// Configured limit.
        limit: usize,
    },

    /// The job was cancelled; in-flight partition results are discarded.
    #[error("window execution cancelled")]
    Cancelled,

    /// The external expression evaluator failed.
    #[error("expression evaluation failed: {0}")]
    Evaluation(String),
}

/// Result type for window operations.
pub type WindowResult<T> = Result<T, WindowError>;
