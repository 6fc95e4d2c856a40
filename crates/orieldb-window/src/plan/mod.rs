//! Window plan types.
//!
//! This module defines the plain-data description of a window computation
//! as handed over by the upstream planner: frame bounds, sort keys, and
//! aggregate calls grouped per `OVER` clause.
//!
//! Everything here is immutable value data with no references into planner
//! or runtime state, so a plan can be shipped to worker processes as-is.
//!
//! # Modules
//!
//! - [`bound`] - Raw and normalized frame-bound descriptions
//! - [`group`] - Window groups, sort keys, and aggregate calls

pub mod bound;
pub mod group;

pub use bound::{resolve_bound, BoundDescription, OffsetExpr, RawBound};
pub use group::{AggregateCall, ExprRef, SortKey, WindowGroup};
