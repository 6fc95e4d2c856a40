//! The expression-evaluator seam.
//!
//! Operand expressions belong to the upstream planner; the window engine
//! only ever asks for them to be materialized as whole columns against the
//! current table state.

use crate::error::{WindowError, WindowResult};
use crate::exec::table::{Column, Table};
use crate::plan::ExprRef;

/// Materializes operand expressions as columns.
///
/// The returned column must have exactly one value per table row.
pub trait ExpressionEvaluator: Send + Sync {
    /// Evaluates an expression reference against the current table state.
    fn evaluate(&self, expr: &ExprRef, table: &Table) -> WindowResult<Column>;
}

/// Evaluator for plans whose operands are plain column references.
///
/// [`ExprRef::Expression`] handles are rejected; anything beyond a column
/// lookup needs the planner's own evaluator.
#[derive(Debug, Default, Clone, Copy)]
pub struct ColumnEvaluator;

impl ExpressionEvaluator for ColumnEvaluator {
    fn evaluate(&self, expr: &ExprRef, table: &Table) -> WindowResult<Column> {
        match expr {
            ExprRef::Column(name) => Ok(table.column_or_error(name)?.to_vec()),
            ExprRef::Expression(id) => Err(WindowError::Evaluation(format!(
                "no evaluator available for expression handle {id}"
            ))),
        }
    }
}
