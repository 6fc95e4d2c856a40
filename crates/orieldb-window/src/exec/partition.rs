//! Per-partition window execution.
//!
//! A partition is a contiguous group of rows sharing partition-key values,
//! identified by its row indices into the driving table. The partition is
//! sorted once and frame-indexed once; every aggregate call of the group
//! then runs against that shared state. Results are scattered back to each
//! row's original table position, so partition execution never disturbs
//! row identity.

use orieldb_core::Value;
use tracing::debug;

use crate::error::{WindowError, WindowResult};
use crate::exec::context::ExecutionContext;
use crate::exec::frame::frame_bounds;
use crate::exec::operators::{FrameInput, ResolvedOperator};
use crate::exec::sort::sort_partition;
use crate::exec::table::Table;
use crate::plan::{BoundDescription, SortKey};

/// One aggregate call with its operator resolved and operands materialized.
#[derive(Debug, Clone)]
pub(crate) struct ResolvedCall {
    /// The resolved operator.
    pub operator: ResolvedOperator,
    /// Names of the materialized operand columns.
    pub operand_columns: Vec<String>,
}

/// A window group after fail-fast validation: bounds resolved, operators
/// looked up, operand columns materialized onto the table.
#[derive(Debug, Clone)]
pub(crate) struct ResolvedGroup {
    /// Order keys applied within each partition.
    pub order_by: Vec<SortKey>,
    /// Resolved lower frame bound.
    pub lower: BoundDescription,
    /// Resolved upper frame bound.
    pub upper: BoundDescription,
    /// The group's aggregate calls.
    pub calls: Vec<ResolvedCall>,
}

/// Executes one partition of a window group.
///
/// `rows` are the partition's row indices into `table`; `outputs` holds one
/// result column per call, sized to the full table, into which this
/// partition's values are scattered by original row index.
///
/// # Errors
///
/// Propagates frame-indexing and column-lookup failures, and returns
/// [`WindowError::PartitionTooLarge`] when the context's row limit is
/// exceeded.
pub(crate) fn execute_partition(
    table: &Table,
    rows: &[usize],
    group: &ResolvedGroup,
    ctx: &ExecutionContext,
    outputs: &mut [Vec<Value>],
) -> WindowResult<()> {
    debug_assert_eq!(outputs.len(), group.calls.len());

    let n = rows.len();
    if n == 0 {
        return Ok(());
    }
    let limit = ctx.max_partition_rows();
    if limit > 0 && n > limit {
        return Err(WindowError::PartitionTooLarge { actual: n, limit });
    }

    let sorted = if group.order_by.is_empty() {
        rows.to_vec()
    } else {
        sort_partition(table, rows, &group.order_by)?
    };

    // One frame computation serves every call in the group.
    let frames = frame_bounds(&group.lower, &group.upper, n)?;
    debug!(rows = n, calls = group.calls.len(), "executing partition");

    for (call, output) in group.calls.iter().zip(outputs.iter_mut()) {
        match &call.operator {
            ResolvedOperator::RowNumber => {
                for (pos, &row) in sorted.iter().enumerate() {
                    output[row] = Value::Int(pos as i64 + 1);
                }
            }
            ResolvedOperator::Aggregate(agg) => {
                let operand = materialize_first_operand(table, &sorted, call)?;
                for (pos, &row) in sorted.iter().enumerate() {
                    output[row] = agg.evaluate(operand.as_deref(), frames.range(pos));
                }
            }
            ResolvedOperator::User(function) => {
                let operands = materialize_operands(table, &sorted, call)?;
                let operand_refs: Vec<&[Value]> =
                    operands.iter().map(Vec::as_slice).collect();
                for (pos, &row) in sorted.iter().enumerate() {
                    let input =
                        FrameInput { operands: &operand_refs, frame: frames.range(pos) };
                    output[row] = function.evaluate(&input);
                }
            }
        }
    }

    ctx.record_rows_processed(n as u64);
    ctx.record_partition();
    Ok(())
}

/// Materializes the call's first operand column in partition sort order.
fn materialize_first_operand(
    table: &Table,
    sorted: &[usize],
    call: &ResolvedCall,
) -> WindowResult<Option<Vec<Value>>> {
    let Some(name) = call.operand_columns.first() else {
        return Ok(None);
    };
    let column = table.column_or_error(name)?;
    Ok(Some(sorted.iter().map(|&row| column[row].clone()).collect()))
}

/// Materializes all operand columns of a call in partition sort order.
fn materialize_operands(
    table: &Table,
    sorted: &[usize],
    call: &ResolvedCall,
) -> WindowResult<Vec<Vec<Value>>> {
    call.operand_columns
        .iter()
        .map(|name| {
            let column = table.column_or_error(name)?;
            Ok(sorted.iter().map(|&row| column[row].clone()).collect())
        })
        .collect()
}
