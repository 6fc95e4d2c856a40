//! The window plan driver.
//!
//! Applies a sequence of window groups to a table. Each group's bounds and
//! operators are validated up front; grouping and operand columns are
//! materialized as synthetic temporaries, partitions are dispatched to the
//! partition executor, and the temporaries are dropped again before the
//! next group sees the table.

use std::sync::Arc;

use orieldb_core::Value;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{WindowError, WindowResult};
use crate::exec::context::ExecutionContext;
use crate::exec::eval::{ColumnEvaluator, ExpressionEvaluator};
use crate::exec::operators::{OperatorRegistry, ResolvedOperator};
use crate::exec::partition::{execute_partition, ResolvedCall, ResolvedGroup};
use crate::exec::shuffle::{GroupPartitioner, LocalPartitioner};
use crate::exec::table::{Column, Table};
use crate::plan::{resolve_bound, BoundDescription, ExprRef, WindowGroup};

/// A flattened window plan as handed over by the upstream planner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowPlan {
    /// The window groups, applied in order.
    pub groups: Vec<WindowGroup>,
    /// The plan's constant pool.
    pub constants: Vec<Value>,
    /// Number of real columns preceding the pool in the unified column
    /// index space.
    pub constant_offset: usize,
    /// The target row type: output field names in output order.
    pub output_fields: Vec<String>,
}

/// Drives window plan execution over a table.
///
/// The driver owns the operator registry and the two collaborator seams:
/// the expression evaluator that materializes operand columns and the
/// grouping primitive that colocates partition rows.
pub struct WindowPlanDriver {
    registry: OperatorRegistry,
    evaluator: Arc<dyn ExpressionEvaluator>,
    partitioner: Arc<dyn GroupPartitioner>,
}

impl WindowPlanDriver {
    /// Creates a driver with the given registry and in-process defaults
    /// for the evaluator and partitioner.
    #[must_use]
    pub fn new(registry: OperatorRegistry) -> Self {
        Self {
            registry,
            evaluator: Arc::new(ColumnEvaluator),
            partitioner: Arc::new(LocalPartitioner),
        }
    }

    /// Sets the expression evaluator.
    #[must_use]
    pub fn with_evaluator(mut self, evaluator: Arc<dyn ExpressionEvaluator>) -> Self {
        self.evaluator = evaluator;
        self
    }

    /// Sets the grouping primitive.
    #[must_use]
    pub fn with_partitioner(mut self, partitioner: Arc<dyn GroupPartitioner>) -> Self {
        self.partitioner = partitioner;
        self
    }

    /// Runs the plan against a table.
    ///
    /// All original columns survive; one column per aggregate call is
    /// appended, and the result is projected onto the plan's target row
    /// type. Row count and per-row identity match the input.
    ///
    /// # Errors
    ///
    /// Plan-shape errors (`UnsupportedBoundKind`, `UnsupportedOperator`,
    /// `ConstantOutOfRange`) surface for every group before any data is
    /// touched. Execution errors abort the run.
    pub fn run(
        &self,
        mut table: Table,
        plan: &WindowPlan,
        ctx: &ExecutionContext,
    ) -> WindowResult<Table> {
        // Fail fast: resolve every group's bounds and operators before the
        // first partition is dispatched.
        let resolved: Vec<PreparedGroup> = plan
            .groups
            .iter()
            .map(|group| self.prepare_group(group, plan))
            .collect::<WindowResult<_>>()?;
        debug!(groups = resolved.len(), "window plan validated");

        let mut temp_counter = 0usize;
        for (group, prepared) in plan.groups.iter().zip(resolved) {
            self.apply_group(&mut table, group, prepared, ctx, &mut temp_counter)?;
        }

        debug!(fields = ?plan.output_fields, "projecting to target row type");
        table.project_to(&plan.output_fields)
    }

    /// Resolves a group's bounds and operators. No data is touched.
    fn prepare_group(&self, group: &WindowGroup, plan: &WindowPlan) -> WindowResult<PreparedGroup> {
        let lower = resolve_bound(&group.lower, &plan.constants, plan.constant_offset)?;
        let upper = resolve_bound(&group.upper, &plan.constants, plan.constant_offset)?;
        let operators = group
            .calls
            .iter()
            .map(|call| self.registry.resolve(&call.operator))
            .collect::<WindowResult<_>>()?;
        Ok(PreparedGroup { lower, upper, operators })
    }

    /// Applies one window group to the table.
    fn apply_group(
        &self,
        table: &mut Table,
        group: &WindowGroup,
        prepared: PreparedGroup,
        ctx: &ExecutionContext,
        temp_counter: &mut usize,
    ) -> WindowResult<()> {
        let num_rows = table.num_rows();
        let mut temporaries: Vec<String> = Vec::new();
        let mut staged: Vec<(String, Column)> = Vec::new();

        // Grouping columns. With no partition-by, a constant key makes the
        // whole table one partition.
        // TODO: reuse input columns as grouping keys instead of materializing copies
        let group_columns: Vec<String> = if group.partition_by.is_empty() {
            let name = next_temp_name(table, temp_counter);
            staged.push((name.clone(), vec![Value::Int(1); num_rows]));
            vec![name]
        } else {
            group
                .partition_by
                .iter()
                .map(|key| {
                    let column =
                        self.evaluator.evaluate(&ExprRef::Column(key.clone()), table)?;
                    let name = next_temp_name(table, temp_counter);
                    staged.push((name.clone(), column));
                    Ok(name)
                })
                .collect::<WindowResult<_>>()?
        };
        temporaries.extend(group_columns.iter().cloned());
        debug!(keys = ?group.partition_by, "partitioning for window group");

        // Operand columns, one temporary per operand expression.
        let mut calls = Vec::with_capacity(group.calls.len());
        for (call, operator) in group.calls.iter().zip(prepared.operators) {
            let mut operand_columns = Vec::with_capacity(call.operands.len());
            for operand in &call.operands {
                let column = self.evaluator.evaluate(operand, table)?;
                let name = next_temp_name(table, temp_counter);
                staged.push((name.clone(), column));
                operand_columns.push(name);
            }
            temporaries.extend(operand_columns.iter().cloned());
            calls.push(ResolvedCall { operator, operand_columns });
        }
        table.assign(staged)?;

        let resolved_group = ResolvedGroup {
            order_by: group.order_by.clone(),
            lower: prepared.lower,
            upper: prepared.upper,
            calls,
        };

        let partitions = self.partitioner.partition(table, &group_columns)?;
        debug!(partitions = partitions.len(), "dispatching partitions");

        let mut outputs: Vec<Column> =
            vec![vec![Value::Null; num_rows]; resolved_group.calls.len()];
        for rows in &partitions {
            if ctx.is_cancelled() {
                return Err(WindowError::Cancelled);
            }
            execute_partition(table, rows, &resolved_group, ctx, &mut outputs)?;
        }

        // All new columns land in a single batch, then the synthetic
        // helpers are dropped before the next group sees the table.
        let named: Vec<(String, Column)> = group
            .calls
            .iter()
            .map(|call| call.output.clone())
            .zip(outputs)
            .collect();
        debug!(columns = named.len(), "assigning window result columns");
        table.assign(named)?;
        table.drop_columns(&temporaries);
        Ok(())
    }
}

impl std::fmt::Debug for WindowPlanDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WindowPlanDriver").field("registry", &self.registry).finish()
    }
}

/// A group's table-independent metadata, resolved ahead of execution.
struct PreparedGroup {
    lower: BoundDescription,
    upper: BoundDescription,
    operators: Vec<ResolvedOperator>,
}

/// Returns a column name unused by the table's schema.
fn next_temp_name(table: &Table, counter: &mut usize) -> String {
    loop {
        let name = format!("_window_tmp_{}", *counter);
        *counter += 1;
        if !table.schema().contains(&name) {
            return name;
        }
    }
}
