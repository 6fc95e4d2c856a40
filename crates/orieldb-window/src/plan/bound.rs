//! Frame-bound descriptions and their normalization.
//!
//! The upstream planner describes each side of a window frame as a
//! [`RawBound`]. Offsets in a raw bound may be literals or references into
//! the plan's constant pool; [`resolve_bound`] normalizes either form into a
//! [`BoundDescription`] holding a plain integer offset, so nothing symbolic
//! survives past plan extraction.

use orieldb_core::Value;
use serde::{Deserialize, Serialize};

use crate::error::{WindowError, WindowResult};

/// An offset expression inside a raw frame bound.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OffsetExpr {
    /// A literal row count embedded in the bound.
    Literal(i64),
    /// A reference into the constant pool, in the unified column index
    /// space (real columns first, pool entries after).
    ConstantRef(usize),
}

/// A frame bound as described by the upstream planner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RawBound {
    /// `UNBOUNDED PRECEDING` / `UNBOUNDED FOLLOWING`.
    Unbounded {
        /// True for the preceding direction.
        preceding: bool,
    },
    /// `CURRENT ROW`.
    CurrentRow,
    /// `<offset> PRECEDING`.
    Preceding(OffsetExpr),
    /// `<offset> FOLLOWING`.
    Following(OffsetExpr),
}

/// Normalized description of one frame bound.
///
/// Exactly one of `is_unbounded`, `is_current_row`, or a finite `offset`
/// combined with `is_preceding`/`is_following` is active. The offset, when
/// present, is a non-negative row count; direction is carried by the flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundDescription {
    /// The bound extends to the partition edge.
    pub is_unbounded: bool,
    /// The bound lies at or before the current row.
    pub is_preceding: bool,
    /// The bound lies at or after the current row.
    pub is_following: bool,
    /// The bound is the current row itself.
    pub is_current_row: bool,
    /// Row-count offset; `None` iff unbounded or current-row.
    pub offset: Option<u64>,
}

impl BoundDescription {
    /// An `UNBOUNDED PRECEDING` bound.
    #[must_use]
    pub const fn unbounded_preceding() -> Self {
        Self {
            is_unbounded: true,
            is_preceding: true,
            is_following: false,
            is_current_row: false,
            offset: None,
        }
    }

    /// An `UNBOUNDED FOLLOWING` bound.
    #[must_use]
    pub const fn unbounded_following() -> Self {
        Self {
            is_unbounded: true,
            is_preceding: false,
            is_following: true,
            is_current_row: false,
            offset: None,
        }
    }

    /// A `CURRENT ROW` bound.
    #[must_use]
    pub const fn current_row() -> Self {
        Self {
            is_unbounded: false,
            is_preceding: false,
            is_following: false,
            is_current_row: true,
            offset: None,
        }
    }

    /// A `<k> PRECEDING` bound.
    #[must_use]
    pub const fn preceding(offset: u64) -> Self {
        Self {
            is_unbounded: false,
            is_preceding: true,
            is_following: false,
            is_current_row: false,
            offset: Some(offset),
        }
    }

    /// A `<k> FOLLOWING` bound.
    #[must_use]
    pub const fn following(offset: u64) -> Self {
        Self {
            is_unbounded: false,
            is_preceding: false,
            is_following: true,
            is_current_row: false,
            offset: Some(offset),
        }
    }

    /// True if this bound pins the frame edge to the current row: either
    /// `CURRENT ROW` itself or a zero offset in either direction.
    #[must_use]
    pub fn is_effectively_current_row(&self) -> bool {
        self.is_current_row || (!self.is_unbounded && self.offset == Some(0))
    }
}

/// Resolves a raw bound against the constant pool.
///
/// Pool-backed offsets are stored by the planner as pseudo-columns appended
/// after the real columns, so a [`OffsetExpr::ConstantRef`] index must have
/// `constant_offset` (the number of real columns) subtracted before the pool
/// lookup.
///
/// # Errors
///
/// Returns [`WindowError::UnsupportedBoundKind`] for negative or
/// non-integer offsets and [`WindowError::ConstantOutOfRange`] for a
/// reference outside the pool.
pub fn resolve_bound(
    raw: &RawBound,
    constants: &[Value],
    constant_offset: usize,
) -> WindowResult<BoundDescription> {
    match raw {
        RawBound::Unbounded { preceding: true } => Ok(BoundDescription::unbounded_preceding()),
        RawBound::Unbounded { preceding: false } => Ok(BoundDescription::unbounded_following()),
        RawBound::CurrentRow => Ok(BoundDescription::current_row()),
        RawBound::Preceding(expr) => {
            let offset = resolve_offset(expr, constants, constant_offset)?;
            Ok(BoundDescription::preceding(offset))
        }
        RawBound::Following(expr) => {
            let offset = resolve_offset(expr, constants, constant_offset)?;
            Ok(BoundDescription::following(offset))
        }
    }
}

/// Materializes an offset expression as a plain non-negative row count.
fn resolve_offset(
    expr: &OffsetExpr,
    constants: &[Value],
    constant_offset: usize,
) -> WindowResult<u64> {
    let raw = match expr {
        OffsetExpr::Literal(k) => *k,
        OffsetExpr::ConstantRef(index) => {
            let pool_index = index.checked_sub(constant_offset).ok_or(
                WindowError::ConstantOutOfRange { index: *index, len: constants.len() },
            )?;
            let value = constants.get(pool_index).ok_or(WindowError::ConstantOutOfRange {
                index: pool_index,
                len: constants.len(),
            })?;
            value.as_int().ok_or_else(|| {
                WindowError::UnsupportedBoundKind(format!(
                    "constant pool entry {pool_index} is not an integer: {value:?}"
                ))
            })?
        }
    };
    u64::try_from(raw).map_err(|_| {
        WindowError::UnsupportedBoundKind(format!("negative frame offset: {raw}"))
    })
}
