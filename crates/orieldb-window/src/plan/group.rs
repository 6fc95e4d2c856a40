//! Window groups: one `OVER` clause specification each.

use serde::{Deserialize, Serialize};

use super::bound::RawBound;

/// A reference to an operand expression owned by the upstream planner.
///
/// The window engine never interprets expressions itself; it hands an
/// `ExprRef` to the external evaluator and receives a materialized column
/// back. Plain column references are common enough to carry by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExprRef {
    /// A direct reference to an input column.
    Column(String),
    /// An opaque handle into the planner's expression table.
    Expression(usize),
}

impl ExprRef {
    /// A column reference.
    #[must_use]
    pub fn column(name: impl Into<String>) -> Self {
        Self::Column(name.into())
    }
}

/// Sort specification for one order key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortKey {
    /// The column to sort by.
    pub column: String,
    /// Whether to sort ascending (true) or descending (false).
    pub ascending: bool,
    /// Whether nulls sort before all other values. This placement holds
    /// regardless of the sort direction.
    pub nulls_first: bool,
}

impl SortKey {
    /// Creates an ascending sort key with nulls last.
    #[must_use]
    pub fn asc(column: impl Into<String>) -> Self {
        Self { column: column.into(), ascending: true, nulls_first: false }
    }

    /// Creates a descending sort key with nulls last.
    #[must_use]
    pub fn desc(column: impl Into<String>) -> Self {
        Self { column: column.into(), ascending: false, nulls_first: false }
    }

    /// Sets nulls-first placement.
    #[must_use]
    pub const fn nulls_first(mut self) -> Self {
        self.nulls_first = true;
        self
    }
}

/// One aggregate call inside a window group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateCall {
    /// The operator name, lowercased (e.g. `"sum"`, `"row_number"`).
    pub operator: String,
    /// Operand expressions, materialized by the driver before execution.
    pub operands: Vec<ExprRef>,
    /// Name of the output column this call produces.
    pub output: String,
}

impl AggregateCall {
    /// Creates an aggregate call.
    #[must_use]
    pub fn new(
        operator: impl Into<String>,
        operands: Vec<ExprRef>,
        output: impl Into<String>,
    ) -> Self {
        Self { operator: operator.into(), operands, output: output.into() }
    }
}

/// One `OVER` clause specification.
///
/// A window group is created once per window plan node, is immutable after
/// extraction, and is consumed exactly once by the plan driver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowGroup {
    /// Partition-key columns. Empty means the whole table is one partition.
    pub partition_by: Vec<String>,
    /// Order keys applied within each partition.
    pub order_by: Vec<SortKey>,
    /// Lower frame bound.
    pub lower: RawBound,
    /// Upper frame bound.
    pub upper: RawBound,
    /// Aggregate calls evaluated over this group's frames.
    pub calls: Vec<AggregateCall>,
}

impl WindowGroup {
    /// Creates a window group with the given frame and no keys or calls.
    #[must_use]
    pub fn new(lower: RawBound, upper: RawBound) -> Self {
        Self { partition_by: Vec::new(), order_by: Vec::new(), lower, upper, calls: Vec::new() }
    }

    /// Adds partition-key columns.
    #[must_use]
    pub fn partition_by<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.partition_by.extend(columns.into_iter().map(Into::into));
        self
    }

    /// Adds order keys.
    #[must_use]
    pub fn order_by<I>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = SortKey>,
    {
        self.order_by.extend(keys);
        self
    }

    /// Adds an aggregate call.
    #[must_use]
    pub fn call(mut self, call: AggregateCall) -> Self {
        self.calls.push(call);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::bound::{OffsetExpr, RawBound};

    #[test]
    fn group_builder() {
        let group = WindowGroup::new(
            RawBound::Unbounded { preceding: true },
            RawBound::CurrentRow,
        )
        .partition_by(["dept"])
        .order_by([SortKey::asc("salary").nulls_first()])
        .call(AggregateCall::new("sum", vec![ExprRef::column("salary")], "running_total"));

        assert_eq!(group.partition_by, vec!["dept".to_string()]);
        assert_eq!(group.order_by.len(), 1);
        assert!(group.order_by[0].nulls_first);
        assert_eq!(group.calls[0].operator, "sum");
    }

    #[test]
    fn sort_key_defaults() {
        let key = SortKey::desc("x");
        assert!(!key.ascending);
        assert!(!key.nulls_first);
    }

    #[test]
    fn bounds_carry_offset_exprs() {
        let group = WindowGroup::new(
            RawBound::Preceding(OffsetExpr::Literal(2)),
            RawBound::Following(OffsetExpr::ConstantRef(4)),
        );
        assert_eq!(group.lower, RawBound::Preceding(OffsetExpr::Literal(2)));
    }
}
