//! Window operators and their registry.
//!
//! Operator lookup is two-tiered: a closed set of built-in operators is
//! resolved by name first, then an open registry of user-defined
//! [`WindowFunction`] implementations. Lookup failure is resolved during
//! group extraction, before any partition is dispatched, so no dynamic
//! name resolution happens at row-processing time.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::ops::Range;
use std::sync::Arc;

use orieldb_core::Value;

use crate::error::{WindowError, WindowResult};

/// Operand data for one row's frame, handed to a window function.
///
/// The frame range indexes into the operand columns, which are already in
/// partition sort order. A window function sees nothing else: no row
/// position, no partition metadata, no mutable state.
#[derive(Debug)]
pub struct FrameInput<'a> {
    /// Operand columns, one per operand of the aggregate call.
    pub operands: &'a [&'a [Value]],
    /// Half-open frame range for the current row.
    pub frame: Range<usize>,
}

impl FrameInput<'_> {
    /// Returns the rows of the first operand column inside the frame.
    #[must_use]
    pub fn frame_values(&self) -> &[Value] {
        self.operands.first().map_or(&[], |col| &col[self.frame.clone()])
    }
}

/// A user-defined window function.
///
/// Implementations must be pure: one scalar per row, derived only from the
/// operand values inside the frame.
pub trait WindowFunction: Send + Sync {
    /// Evaluates the function for one row's frame.
    fn evaluate(&self, input: &FrameInput<'_>) -> Value;
}

/// Built-in frame aggregates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinAggregate {
    /// Sum of the operand over the frame, nulls skipped; null on an empty
    /// or all-null frame.
    Sum,
    /// Like [`Self::Sum`] but zero on an empty or all-null frame
    /// (Calcite's `$sum0`).
    SumZero,
    /// Count of non-null operand values (row count without an operand);
    /// zero on an empty frame, never null.
    Count,
    /// Minimum of the operand over the frame, nulls skipped.
    Min,
    /// Maximum of the operand over the frame, nulls skipped.
    Max,
    /// First operand value in the frame, in sort order.
    FirstValue,
    /// Last operand value in the frame, in sort order.
    LastValue,
}

impl BuiltinAggregate {
    /// Resolves a lowercased operator name to a built-in aggregate.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "sum" => Some(Self::Sum),
            "$sum0" => Some(Self::SumZero),
            "count" => Some(Self::Count),
            "min" => Some(Self::Min),
            "max" => Some(Self::Max),
            "first_value" | "single_value" => Some(Self::FirstValue),
            "last_value" => Some(Self::LastValue),
            _ => None,
        }
    }

    /// Evaluates the aggregate over one frame of the operand column.
    ///
    /// `operand` is `None` only for calls without operands (`count`).
    pub(crate) fn evaluate(self, operand: Option<&[Value]>, frame: Range<usize>) -> Value {
        match self {
            Self::Sum => sum_frame(operand, frame, Value::Null),
            Self::SumZero => sum_frame(operand, frame, Value::Int(0)),
            Self::Count => match operand {
                Some(col) => {
                    Value::Int(col[frame].iter().filter(|v| !v.is_null()).count() as i64)
                }
                None => Value::Int(frame.len() as i64),
            },
            Self::Min => extremum_frame(operand, frame, Ordering::Less),
            Self::Max => extremum_frame(operand, frame, Ordering::Greater),
            Self::FirstValue => operand
                .and_then(|col| col[frame].first().cloned())
                .unwrap_or(Value::Null),
            Self::LastValue => operand
                .and_then(|col| col[frame].last().cloned())
                .unwrap_or(Value::Null),
        }
    }
}

/// Sums the numeric values in the frame, skipping nulls and non-numerics.
///
/// All-integer frames stay integer; any float promotes the result.
fn sum_frame(operand: Option<&[Value]>, frame: Range<usize>, empty: Value) -> Value {
    let Some(col) = operand else { return empty };
    let mut int_sum = 0i64;
    let mut float_sum = 0f64;
    let mut saw_float = false;
    let mut saw_value = false;
    for value in &col[frame] {
        match value {
            Value::Int(i) => {
                int_sum += i;
                saw_value = true;
            }
            Value::Float(f) => {
                float_sum += f;
                saw_float = true;
                saw_value = true;
            }
            _ => {}
        }
    }
    if !saw_value {
        empty
    } else if saw_float {
        Value::Float(float_sum + int_sum as f64)
    } else {
        Value::Int(int_sum)
    }
}

/// Minimum or maximum of the non-null frame values.
fn extremum_frame(operand: Option<&[Value]>, frame: Range<usize>, keep: Ordering) -> Value {
    let Some(col) = operand else { return Value::Null };
    let mut best: Option<&Value> = None;
    for value in &col[frame] {
        if value.is_null() {
            continue;
        }
        best = Some(match best {
            None => value,
            Some(b) => {
                if compare_values(value, b) == keep {
                    value
                } else {
                    b
                }
            }
        });
    }
    best.cloned().unwrap_or(Value::Null)
}

/// Compares two non-null values for min/max. Mismatched types compare equal.
fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
        (Value::Int(a), Value::Int(b)) => a.cmp(b),
        (Value::Float(a), Value::Float(b)) => a.partial_cmp(b).unwrap_or(Ordering::Equal),
        (Value::Int(a), Value::Float(b)) => (*a as f64).partial_cmp(b).unwrap_or(Ordering::Equal),
        (Value::Float(a), Value::Int(b)) => a.partial_cmp(&(*b as f64)).unwrap_or(Ordering::Equal),
        (Value::String(a), Value::String(b)) => a.cmp(b),
        _ => Ordering::Equal,
    }
}

/// An operator resolved against the registry, ready to execute.
#[derive(Clone)]
pub enum ResolvedOperator {
    /// 1-based running count within the partition; ignores the frame.
    RowNumber,
    /// A built-in frame aggregate.
    Aggregate(BuiltinAggregate),
    /// A user-defined window function.
    User(Arc<dyn WindowFunction>),
}

impl std::fmt::Debug for ResolvedOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RowNumber => write!(f, "RowNumber"),
            Self::Aggregate(agg) => write!(f, "Aggregate({agg:?})"),
            Self::User(_) => write!(f, "User(..)"),
        }
    }
}

/// Registry of window operators.
///
/// Built-ins are always present; user-defined functions extend the set.
#[derive(Default)]
pub struct OperatorRegistry {
    /// User-defined functions by lowercased name.
    user: HashMap<String, Arc<dyn WindowFunction>>,
}

impl OperatorRegistry {
    /// Creates a registry holding only the built-in operators.
    #[must_use]
    pub fn new() -> Self {
        Self { user: HashMap::new() }
    }

    /// Registers a user-defined window function.
    ///
    /// If a function with the same name already exists, it is replaced.
    /// Built-in names always win during resolution.
    pub fn register(&mut self, name: impl Into<String>, function: Arc<dyn WindowFunction>) {
        self.user.insert(name.into().to_lowercase(), function);
    }

    /// Returns true if the name resolves to a built-in or user operator.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        name == "row_number"
            || BuiltinAggregate::from_name(name).is_some()
            || self.user.contains_key(name)
    }

    /// Resolves an operator name.
    ///
    /// # Errors
    ///
    /// Returns [`WindowError::UnsupportedOperator`] if the name is absent
    /// from both tiers.
    pub fn resolve(&self, name: &str) -> WindowResult<ResolvedOperator> {
        if name == "row_number" {
            return Ok(ResolvedOperator::RowNumber);
        }
        if let Some(agg) = BuiltinAggregate::from_name(name) {
            return Ok(ResolvedOperator::Aggregate(agg));
        }
        if let Some(function) = self.user.get(name) {
            return Ok(ResolvedOperator::User(Arc::clone(function)));
        }
        Err(WindowError::UnsupportedOperator(name.to_string()))
    }

    /// Lists the user-defined operator names.
    #[must_use]
    pub fn user_names(&self) -> Vec<&str> {
        self.user.keys().map(String::as_str).collect()
    }
}

impl std::fmt::Debug for OperatorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OperatorRegistry").field("user", &self.user_names()).finish()
    }
}
