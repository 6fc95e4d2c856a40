//! Frame indexing: per-row window ranges within a partition.
//!
//! Given a normalized lower and upper bound and a partition's row count,
//! [`frame_bounds`] computes for every row position the half-open index
//! range `[start, end)` of rows in that row's frame. The computation is a
//! pure function of `(bounds, n)`, independent of any data representation.

use std::ops::Range;

use crate::error::{WindowError, WindowResult};
use crate::plan::BoundDescription;

/// Per-row frame ranges for one partition.
///
/// For every row `i`, `start[i] <= end[i]` and both lie in `0..=n`.
/// `start[i] == end[i]` is a legitimate empty frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameBounds {
    start: Vec<usize>,
    end: Vec<usize>,
}

impl FrameBounds {
    /// Returns the number of rows covered.
    #[must_use]
    pub fn len(&self) -> usize {
        self.start.len()
    }

    /// Returns true if the partition had no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.start.is_empty()
    }

    /// Returns row `i`'s frame as a half-open range.
    #[must_use]
    pub fn range(&self, i: usize) -> Range<usize> {
        self.start[i]..self.end[i]
    }

    /// Returns the frame start positions.
    #[must_use]
    pub fn starts(&self) -> &[usize] {
        &self.start
    }

    /// Returns the frame end positions.
    #[must_use]
    pub fn ends(&self) -> &[usize] {
        &self.end
    }
}

/// Computes per-row frame ranges for a partition of `n` rows.
///
/// Three shapes are recognized, in priority order:
///
/// 1. unbounded-preceding to current-row: the cumulative expanding frame
///    (`start = 0`, `end = i + 1`),
/// 2. k-preceding to current-row: a fixed trailing window of width `k + 1`,
/// 3. the general asymmetric case, driven by signed offsets.
///
/// The fast paths exist for shape recognition only; the general branch
/// reproduces them exactly on equivalent bounds.
///
/// # Errors
///
/// Returns [`WindowError::InvalidFrameBounds`] if the bound combination
/// would place a frame end before its start for every row (e.g. lower
/// `2 FOLLOWING` with upper `CURRENT ROW`). Legitimately empty frames
/// (`start == end`) are not an error.
pub fn frame_bounds(
    lower: &BoundDescription,
    upper: &BoundDescription,
    n: usize,
) -> WindowResult<FrameBounds> {
    let upper_at_current = upper.is_effectively_current_row();

    if lower.is_unbounded && lower.is_preceding && upper_at_current {
        return Ok(expanding_bounds(n));
    }
    if lower.is_preceding && !lower.is_unbounded && upper_at_current {
        if let Some(k) = lower.offset {
            return Ok(trailing_bounds(k as usize, n));
        }
    }

    let lower_offset = signed_offset(lower);
    let upper_offset = signed_offset(upper);
    if let (Some(lo), Some(up)) = (lower_offset, upper_offset) {
        // The frame end precedes the frame start at every row; clamping
        // would quietly turn this into an always-empty frame.
        if up + 1 < lo {
            return Err(WindowError::InvalidFrameBounds {
                lower_offset: lo,
                upper_offset: up,
            });
        }
    }
    Ok(general_bounds(lower_offset, upper_offset, n))
}

/// Signed row offset for a bound: preceding negates the magnitude,
/// current-row forces zero, unbounded has no finite offset.
fn signed_offset(bound: &BoundDescription) -> Option<i64> {
    if bound.is_unbounded {
        return None;
    }
    if bound.is_current_row {
        return Some(0);
    }
    bound.offset.map(|k| {
        let k = k as i64;
        if bound.is_preceding {
            -k
        } else {
            k
        }
    })
}

/// Cumulative expanding frame: everything from the partition start through
/// the current row.
fn expanding_bounds(n: usize) -> FrameBounds {
    FrameBounds { start: vec![0; n], end: (1..=n).collect() }
}

/// Fixed trailing frame of width `k + 1` ending at the current row.
fn trailing_bounds(k: usize, n: usize) -> FrameBounds {
    FrameBounds {
        start: (0..n).map(|i| i.saturating_sub(k)).collect(),
        end: (1..=n).collect(),
    }
}

/// General asymmetric frame from signed offsets. `None` means unbounded on
/// that side.
fn general_bounds(lower_offset: Option<i64>, upper_offset: Option<i64>, n: usize) -> FrameBounds {
    let n_i64 = n as i64;
    let start = match lower_offset {
        None => vec![0; n],
        Some(lo) => (0..n_i64).map(|i| (i + lo).clamp(0, n_i64) as usize).collect(),
    };
    let end = match upper_offset {
        None => vec![n; n],
        Some(up) => (0..n_i64).map(|i| (i + up + 1).clamp(0, n_i64) as usize).collect(),
    };
    debug_assert!(start.iter().zip(&end).all(|(s, e)| s <= e));
    FrameBounds { start, end }
}
