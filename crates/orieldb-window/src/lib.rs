//! `OrielDB` Window
//!
//! This crate evaluates SQL window functions
//! (`OVER (PARTITION BY … ORDER BY … ROWS BETWEEN …)`) against a
//! partitioned table. A window function produces one output value per
//! input row, computed from a sliding frame of rows defined relative to
//! that row's partition and sort order.
//!
//! # Overview
//!
//! The engine consumes a flattened, already-optimized plan description
//! (window groups with partition keys, order keys, frame bounds, and
//! aggregate calls) and never parses or optimizes SQL itself. Expression
//! evaluation and distributed row colocation are collaborator seams
//! ([`ExpressionEvaluator`], [`GroupPartitioner`]); in-process defaults
//! are provided for both.
//!
//! # Modules
//!
//! - [`plan`] - Plain-data window plan types (bounds, groups, calls)
//! - [`exec`] - Execution engine (frames, operators, partitions, driver)
//! - [`error`] - Error types
//!
//! # Quick Start
//!
//! Compute a running total per department:
//!
//! ```
//! use orieldb_core::Value;
//! use orieldb_window::exec::{
//!     ExecutionContext, OperatorRegistry, Schema, Table, WindowPlan, WindowPlanDriver,
//! };
//! use orieldb_window::plan::{AggregateCall, ExprRef, RawBound, SortKey, WindowGroup};
//!
//! let table = Table::new(
//!     Schema::from(vec!["dept", "salary"]),
//!     vec![
//!         vec![Value::from("a"), Value::from("a"), Value::from("b")],
//!         vec![Value::Int(10), Value::Int(20), Value::Int(30)],
//!     ],
//! )
//! .unwrap();
//!
//! let plan = WindowPlan {
//!     groups: vec![WindowGroup::new(
//!         RawBound::Unbounded { preceding: true },
//!         RawBound::CurrentRow,
//!     )
//!     .partition_by(["dept"])
//!     .order_by([SortKey::asc("salary")])
//!     .call(AggregateCall::new("sum", vec![ExprRef::column("salary")], "total"))],
//!     constants: Vec::new(),
//!     constant_offset: 0,
//!     output_fields: vec!["dept".into(), "salary".into(), "total".into()],
//! };
//!
//! let driver = WindowPlanDriver::new(OperatorRegistry::new());
//! let result = driver.run(table, &plan, &ExecutionContext::new()).unwrap();
//! assert_eq!(result.value("total", 1), Some(&Value::Int(30)));
//! ```

pub mod error;
pub mod exec;
pub mod plan;

// Re-export commonly used items at the crate root
pub use error::{WindowError, WindowResult};
pub use exec::{
    ExecutionContext, ExpressionEvaluator, GroupPartitioner, OperatorRegistry, Schema, Table,
    WindowFunction, WindowPlan, WindowPlanDriver,
};
pub use plan::{AggregateCall, BoundDescription, ExprRef, RawBound, SortKey, WindowGroup};
