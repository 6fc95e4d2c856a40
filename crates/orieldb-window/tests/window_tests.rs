//! End-to-end window plan execution tests.

use std::sync::Arc;

use orieldb_core::Value;
use orieldb_window::exec::{
    ExecutionContext, FrameInput, OperatorRegistry, Schema, Table, WindowPlan, WindowPlanDriver,
};
use orieldb_window::plan::bound::OffsetExpr;
use orieldb_window::plan::{AggregateCall, ExprRef, RawBound, SortKey, WindowGroup};
use orieldb_window::{WindowError, WindowFunction};

fn ints(values: &[i64]) -> Vec<Value> {
    values.iter().map(|&i| Value::Int(i)).collect()
}

fn int_column(table: &Table, name: &str) -> Vec<i64> {
    table
        .column(name)
        .unwrap()
        .iter()
        .map(|v| v.as_int().expect("integer column"))
        .collect()
}

fn plan_with(group: WindowGroup, output_fields: &[&str]) -> WindowPlan {
    WindowPlan {
        groups: vec![group],
        constants: Vec::new(),
        constant_offset: 0,
        output_fields: output_fields.iter().map(ToString::to_string).collect(),
    }
}

fn run(table: Table, plan: &WindowPlan) -> Result<Table, WindowError> {
    WindowPlanDriver::new(OperatorRegistry::new()).run(table, plan, &ExecutionContext::new())
}

fn ordered_values(values: &[i64]) -> Table {
    Table::new(
        Schema::from(vec!["ord", "v"]),
        vec![(0..values.len() as i64).map(Value::Int).collect(), ints(values)],
    )
    .unwrap()
}

#[test]
fn running_sum_over_ordered_values() {
    let group = WindowGroup::new(RawBound::Unbounded { preceding: true }, RawBound::CurrentRow)
        .order_by([SortKey::asc("ord")])
        .call(AggregateCall::new("sum", vec![ExprRef::column("v")], "running"));
    let result = run(ordered_values(&[1, 2, 3, 4]), &plan_with(group, &["ord", "v", "running"]))
        .unwrap();
    assert_eq!(int_column(&result, "running"), vec![1, 3, 6, 10]);
}

#[test]
fn trailing_window_sum_with_pool_backed_offset() {
    // 2 PRECEDING arrives as a constant-pool reference: index 2 in the
    // unified column space, behind the table's two real columns.
    let group = WindowGroup::new(
        RawBound::Preceding(OffsetExpr::ConstantRef(2)),
        RawBound::CurrentRow,
    )
    .order_by([SortKey::asc("ord")])
    .call(AggregateCall::new("sum", vec![ExprRef::column("v")], "trailing"));
    let plan = WindowPlan {
        groups: vec![group],
        constants: vec![Value::Int(2)],
        constant_offset: 2,
        output_fields: vec!["ord".to_string(), "v".to_string(), "trailing".to_string()],
    };
    let result = run(ordered_values(&[1, 2, 3, 4, 5]), &plan).unwrap();
    assert_eq!(int_column(&result, "trailing"), vec![1, 3, 6, 9, 12]);
}

#[test]
fn row_number_is_dense_regardless_of_ties() {
    let table = Table::new(
        Schema::from(vec!["v"]),
        vec![ints(&[7, 7, 7, 7, 7])],
    )
    .unwrap();
    let group = WindowGroup::new(RawBound::Unbounded { preceding: true }, RawBound::CurrentRow)
        .order_by([SortKey::asc("v")])
        .call(AggregateCall::new("row_number", vec![], "rn"));
    let result = run(table, &plan_with(group, &["v", "rn"])).unwrap();

    let mut numbers = int_column(&result, "rn");
    numbers.sort_unstable();
    assert_eq!(numbers, vec![1, 2, 3, 4, 5]);
}

#[test]
fn count_of_all_null_operand_is_zero() {
    let table = Table::new(
        Schema::from(vec!["ord", "v"]),
        vec![ints(&[0, 1, 2]), vec![Value::Null, Value::Null, Value::Null]],
    )
    .unwrap();
    let group = WindowGroup::new(RawBound::Unbounded { preceding: true }, RawBound::CurrentRow)
        .order_by([SortKey::asc("ord")])
        .call(AggregateCall::new("count", vec![ExprRef::column("v")], "n"));
    let result = run(table, &plan_with(group, &["ord", "n"])).unwrap();
    assert_eq!(int_column(&result, "n"), vec![0, 0, 0]);
}

#[test]
fn partitions_are_independent() {
    let full = Table::new(
        Schema::from(vec!["k", "ord", "v"]),
        vec![
            vec![
                Value::from("a"),
                Value::from("b"),
                Value::from("a"),
                Value::from("b"),
                Value::from("a"),
            ],
            ints(&[0, 0, 1, 1, 2]),
            ints(&[1, 10, 2, 20, 3]),
        ],
    )
    .unwrap();
    let group = |partition: bool| {
        let g = WindowGroup::new(RawBound::Unbounded { preceding: true }, RawBound::CurrentRow)
            .order_by([SortKey::asc("ord")])
            .call(AggregateCall::new("sum", vec![ExprRef::column("v")], "total"));
        if partition {
            g.partition_by(["k"])
        } else {
            g
        }
    };

    let combined = run(full, &plan_with(group(true), &["k", "ord", "v", "total"])).unwrap();

    // Group "a" alone must produce the same values its rows got above.
    let alone = Table::new(
        Schema::from(vec!["k", "ord", "v"]),
        vec![
            vec![Value::from("a"), Value::from("a"), Value::from("a")],
            ints(&[0, 1, 2]),
            ints(&[1, 2, 3]),
        ],
    )
    .unwrap();
    let alone_result = run(alone, &plan_with(group(false), &["k", "ord", "v", "total"])).unwrap();

    // Rows 0, 2, 4 of the combined table are partition "a" in order.
    let combined_totals = int_column(&combined, "total");
    assert_eq!(
        vec![combined_totals[0], combined_totals[2], combined_totals[4]],
        int_column(&alone_result, "total")
    );
}

#[test]
fn nulls_first_changes_order_not_content() {
    let make = || {
        Table::new(
            Schema::from(vec!["v"]),
            vec![vec![Value::Int(5), Value::Null, Value::Int(3)]],
        )
        .unwrap()
    };
    let group = |key: SortKey| {
        WindowGroup::new(RawBound::Unbounded { preceding: true }, RawBound::CurrentRow)
            .order_by([key])
            .call(AggregateCall::new("row_number", vec![], "rn"))
    };

    let first = run(make(), &plan_with(group(SortKey::asc("v").nulls_first()), &["v", "rn"]))
        .unwrap();
    let last = run(make(), &plan_with(group(SortKey::asc("v")), &["v", "rn"])).unwrap();

    assert_eq!(first.num_rows(), last.num_rows());
    // The null row (position 1) moves from the front to the back of the
    // sort order; every value survives in place.
    assert_eq!(first.value("rn", 1), Some(&Value::Int(1)));
    assert_eq!(last.value("rn", 1), Some(&Value::Int(3)));
    assert_eq!(first.column("v").unwrap(), last.column("v").unwrap());
}

#[test]
fn empty_table_produces_no_rows_and_no_error() {
    let table =
        Table::new(Schema::from(vec!["k", "v"]), vec![Vec::new(), Vec::new()]).unwrap();
    let group = WindowGroup::new(RawBound::Unbounded { preceding: true }, RawBound::CurrentRow)
        .partition_by(["k"])
        .order_by([SortKey::asc("v")])
        .call(AggregateCall::new("sum", vec![ExprRef::column("v")], "total"));
    let result = run(table, &plan_with(group, &["k", "v", "total"])).unwrap();
    assert_eq!(result.num_rows(), 0);
    assert_eq!(result.schema().columns(), vec!["k", "v", "total"]);
}

#[test]
fn unknown_operator_fails_before_any_partition() {
    let group = WindowGroup::new(RawBound::Unbounded { preceding: true }, RawBound::CurrentRow)
        .call(AggregateCall::new("percent_rank", vec![], "p"));
    let ctx = ExecutionContext::new();
    let err = WindowPlanDriver::new(OperatorRegistry::new())
        .run(ordered_values(&[1, 2]), &plan_with(group, &["ord", "v", "p"]), &ctx)
        .unwrap_err();

    assert!(matches!(err, WindowError::UnsupportedOperator(name) if name == "percent_rank"));
    assert_eq!(ctx.stats().partitions_processed(), 0);
}

#[test]
fn malformed_frame_combination_aborts() {
    let group = WindowGroup::new(
        RawBound::Following(OffsetExpr::Literal(2)),
        RawBound::Preceding(OffsetExpr::Literal(2)),
    )
    .order_by([SortKey::asc("ord")])
    .call(AggregateCall::new("sum", vec![ExprRef::column("v")], "s"));
    let err = run(ordered_values(&[1, 2, 3]), &plan_with(group, &["ord", "v", "s"])).unwrap_err();
    assert!(matches!(err, WindowError::InvalidFrameBounds { .. }));
}

#[test]
fn sum_and_sum0_differ_on_empty_frames() {
    // 1 FOLLOWING to 2 FOLLOWING: the frame is empty at the last row.
    let group = |op: &str, out: &str| {
        WindowGroup::new(
            RawBound::Following(OffsetExpr::Literal(1)),
            RawBound::Following(OffsetExpr::Literal(2)),
        )
        .order_by([SortKey::asc("ord")])
        .call(AggregateCall::new(op, vec![ExprRef::column("v")], out))
    };
    let plan = WindowPlan {
        groups: vec![group("sum", "s"), group("$sum0", "s0")],
        constants: Vec::new(),
        constant_offset: 0,
        output_fields: vec!["ord".to_string(), "s".to_string(), "s0".to_string()],
    };
    let result = run(ordered_values(&[1, 2, 3]), &plan).unwrap();

    assert_eq!(result.value("s", 0), Some(&Value::Int(5)));
    assert_eq!(result.value("s", 2), Some(&Value::Null));
    assert_eq!(result.value("s0", 2), Some(&Value::Int(0)));
}

#[test]
fn first_and_last_value_follow_the_frame() {
    let group = WindowGroup::new(
        RawBound::Preceding(OffsetExpr::Literal(1)),
        RawBound::Following(OffsetExpr::Literal(1)),
    )
    .order_by([SortKey::asc("ord")])
    .call(AggregateCall::new("first_value", vec![ExprRef::column("v")], "first"))
    .call(AggregateCall::new("last_value", vec![ExprRef::column("v")], "last"));
    let result =
        run(ordered_values(&[10, 20, 30]), &plan_with(group, &["ord", "v", "first", "last"]))
            .unwrap();

    assert_eq!(int_column(&result, "first"), vec![10, 10, 20]);
    assert_eq!(int_column(&result, "last"), vec![20, 30, 30]);
}

#[test]
fn first_value_on_always_empty_frame_is_null() {
    // The frame beyond the partition edge is empty for the last row.
    let group = WindowGroup::new(
        RawBound::Following(OffsetExpr::Literal(1)),
        RawBound::Following(OffsetExpr::Literal(1)),
    )
    .order_by([SortKey::asc("ord")])
    .call(AggregateCall::new("first_value", vec![ExprRef::column("v")], "next"));
    let result = run(ordered_values(&[10, 20]), &plan_with(group, &["ord", "next"])).unwrap();

    assert_eq!(result.value("next", 0), Some(&Value::Int(20)));
    assert_eq!(result.value("next", 1), Some(&Value::Null));
}

#[test]
fn groups_apply_in_sequence_with_clean_schemas() {
    let table = Table::new(
        Schema::from(vec!["k", "ord", "v"]),
        vec![
            vec![Value::from("a"), Value::from("a"), Value::from("b")],
            ints(&[0, 1, 0]),
            ints(&[1, 2, 3]),
        ],
    )
    .unwrap();
    let running = WindowGroup::new(RawBound::Unbounded { preceding: true }, RawBound::CurrentRow)
        .partition_by(["k"])
        .order_by([SortKey::asc("ord")])
        .call(AggregateCall::new("sum", vec![ExprRef::column("v")], "total"));
    let numbered = WindowGroup::new(RawBound::Unbounded { preceding: true }, RawBound::CurrentRow)
        .order_by([SortKey::desc("v")])
        .call(AggregateCall::new("row_number", vec![], "rank"));
    let plan = WindowPlan {
        groups: vec![running, numbered],
        constants: Vec::new(),
        constant_offset: 0,
        output_fields: ["k", "ord", "v", "total", "rank"]
            .iter()
            .map(ToString::to_string)
            .collect(),
    };

    let result = run(table, &plan).unwrap();
    assert_eq!(result.schema().columns(), vec!["k", "ord", "v", "total", "rank"]);
    assert_eq!(int_column(&result, "total"), vec![1, 3, 3]);
    assert_eq!(int_column(&result, "rank"), vec![3, 2, 1]);
}

#[test]
fn user_defined_operator_runs_through_the_driver() {
    struct FrameSpread;
    impl WindowFunction for FrameSpread {
        fn evaluate(&self, input: &FrameInput<'_>) -> Value {
            let values = input.frame_values();
            let ints: Vec<i64> = values.iter().filter_map(Value::as_int).collect();
            match (ints.iter().min(), ints.iter().max()) {
                (Some(min), Some(max)) => Value::Int(max - min),
                _ => Value::Null,
            }
        }
    }

    let mut registry = OperatorRegistry::new();
    registry.register("spread", Arc::new(FrameSpread));

    let group = WindowGroup::new(RawBound::Unbounded { preceding: true }, RawBound::CurrentRow)
        .order_by([SortKey::asc("ord")])
        .call(AggregateCall::new("spread", vec![ExprRef::column("v")], "spread"));
    let result = WindowPlanDriver::new(registry)
        .run(
            ordered_values(&[4, 1, 9]),
            &plan_with(group, &["ord", "v", "spread"]),
            &ExecutionContext::new(),
        )
        .unwrap();

    assert_eq!(int_column(&result, "spread"), vec![0, 3, 8]);
}

#[test]
fn min_max_over_partitions() {
    let table = Table::new(
        Schema::from(vec!["k", "ord", "v"]),
        vec![
            vec![Value::from("a"), Value::from("a"), Value::from("b")],
            ints(&[0, 1, 0]),
            vec![Value::Int(5), Value::Null, Value::Int(2)],
        ],
    )
    .unwrap();
    let group = WindowGroup::new(
        RawBound::Unbounded { preceding: true },
        RawBound::Unbounded { preceding: false },
    )
    .partition_by(["k"])
    .order_by([SortKey::asc("ord")])
    .call(AggregateCall::new("min", vec![ExprRef::column("v")], "lo"))
    .call(AggregateCall::new("max", vec![ExprRef::column("v")], "hi"));

    let result = run(table, &plan_with(group, &["k", "v", "lo", "hi"])).unwrap();
    // Nulls are skipped; partition "a" sees only the 5.
    assert_eq!(result.value("lo", 0), Some(&Value::Int(5)));
    assert_eq!(result.value("hi", 1), Some(&Value::Int(5)));
    assert_eq!(result.value("lo", 2), Some(&Value::Int(2)));
}
