//! Stable partition sorting by order keys.

use std::cmp::Ordering;

use orieldb_core::Value;

use crate::error::WindowResult;
use crate::exec::table::Table;
use crate::plan::SortKey;

/// Stably sorts a partition's rows by the given order keys.
///
/// `rows` holds the partition's row indices into `table`; the returned
/// vector holds the same indices in sorted order. Nulls are placed by each
/// key's `nulls_first` flag regardless of the sort direction.
///
/// # Errors
///
/// Returns [`crate::error::WindowError::ColumnNotFound`] if an order key
/// names a missing column.
pub(crate) fn sort_partition(
    table: &Table,
    rows: &[usize],
    keys: &[SortKey],
) -> WindowResult<Vec<usize>> {
    let key_columns: Vec<(&[Value], &SortKey)> = keys
        .iter()
        .map(|key| table.column_or_error(&key.column).map(|col| (col, key)))
        .collect::<WindowResult<_>>()?;

    let mut sorted = rows.to_vec();
    sorted.sort_by(|&a, &b| {
        for (column, key) in &key_columns {
            let cmp = compare_keyed(&column[a], &column[b], key);
            if cmp != Ordering::Equal {
                return cmp;
            }
        }
        Ordering::Equal
    });
    Ok(sorted)
}

/// Compares two key values. Null placement is decided before the
/// direction reversal so that `nulls_first` holds for descending keys too.
fn compare_keyed(a: &Value, b: &Value, key: &SortKey) -> Ordering {
    match (a.is_null(), b.is_null()) {
        (true, true) => Ordering::Equal,
        (true, false) => {
            if key.nulls_first {
                Ordering::Less
            } else {
                Ordering::Greater
            }
        }
        (false, true) => {
            if key.nulls_first {
                Ordering::Greater
            } else {
                Ordering::Less
            }
        }
        (false, false) => {
            let cmp = compare_values(a, b);
            if key.ascending {
                cmp
            } else {
                cmp.reverse()
            }
        }
    }
}

/// Compares two non-null values.
///
/// NaN floats compare equal to keep the sort stable; mismatched types
/// compare equal.
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
