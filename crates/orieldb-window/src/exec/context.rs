//! Execution context for window plan runs.
//!
//! The context carries runtime configuration, cancellation, and execution
//! statistics. It holds no query data.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Instant;

/// Execution context for a window plan run.
///
/// Cancellation is cooperative: it is checked between partitions, aborts
/// the whole job, and discards in-flight partition results. A cancelled
/// run never produces partial output for a partition.
#[derive(Debug)]
pub struct ExecutionContext {
    /// Whether the run has been cancelled.
    cancelled: AtomicBool,
    /// Maximum rows allowed in one partition (0 = no limit).
    max_partition_rows: usize,
    /// Execution statistics.
    stats: ExecutionStats,
}

impl ExecutionContext {
    /// Creates a new execution context with no limits.
    #[must_use]
    pub fn new() -> Self {
        Self {
            cancelled: AtomicBool::new(false),
            max_partition_rows: 0,
            stats: ExecutionStats::new(),
        }
    }

    /// Sets the maximum rows allowed in one partition.
    #[must_use]
    pub fn with_max_partition_rows(mut self, limit: usize) -> Self {
        self.max_partition_rows = limit;
        self
    }

    /// Returns the per-partition row limit (0 = no limit).
    #[must_use]
    pub fn max_partition_rows(&self) -> usize {
        self.max_partition_rows
    }

    /// Cancels the run.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Checks whether the run has been cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Returns the execution statistics.
    #[must_use]
    pub fn stats(&self) -> &ExecutionStats {
        &self.stats
    }

    /// Records rows processed by a partition execution.
    pub fn record_rows_processed(&self, count: u64) {
        self.stats.rows_processed.fetch_add(count, Ordering::Relaxed);
    }

    /// Records one completed partition.
    pub fn record_partition(&self) {
        self.stats.partitions_processed.fetch_add(1, Ordering::Relaxed);
    }
}

impl Default for ExecutionContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Statistics collected during a window plan run.
#[derive(Debug)]
pub struct ExecutionStats {
    /// When execution started.
    start_time: Instant,
    /// Rows processed across all partitions.
    rows_processed: AtomicU64,
    /// Partitions completed.
    partitions_processed: AtomicU64,
}

impl ExecutionStats {
    /// Creates new execution statistics.
    #[must_use]
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            rows_processed: AtomicU64::new(0),
            partitions_processed: AtomicU64::new(0),
        }
    }

    /// Returns the number of rows processed.
    #[must_use]
    pub fn rows_processed(&self) -> u64 {
        self.rows_processed.load(Ordering::Relaxed)
    }

    /// Returns the number of partitions completed.
    #[must_use]
    pub fn partitions_processed(&self) -> u64 {
        self.partitions_processed.load(Ordering::Relaxed)
    }

    /// Returns the elapsed execution time.
    #[must_use]
    pub fn elapsed(&self) -> std::time::Duration {
        self.start_time.elapsed()
    }
}

impl Default for ExecutionStats {
    fn default() -> Self {
        Self::new()
    }
}
