//! Grouping of table rows by partition-key values.
//!
//! The distributed shuffle that colocates rows of one partition key on one
//! worker lives outside this crate; [`GroupPartitioner`] is the seam it
//! plugs into. [`LocalPartitioner`] is the in-process implementation used
//! for single-node execution and tests.

use orieldb_core::Value;

use crate::error::WindowResult;
use crate::exec::table::Table;

/// Groups table rows by the values of key columns.
///
/// Implementations must satisfy the colocation contract: every row of a
/// key lands in exactly one group, and grouping completes for a key before
/// any of its rows are processed. The returned groups drive independent,
/// isolated partition executions.
pub trait GroupPartitioner: Send + Sync {
    /// Partitions `table` by the given key columns, returning one row-index
    /// group per distinct key combination. Nulls group together like any
    /// other value.
    fn partition(&self, table: &Table, keys: &[String]) -> WindowResult<Vec<Vec<usize>>>;
}

/// In-process hash partitioner.
///
/// Groups are returned in first-appearance order of their keys, so the
/// result is deterministic for a given input regardless of hashing.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalPartitioner;

impl GroupPartitioner for LocalPartitioner {
    fn partition(&self, table: &Table, keys: &[String]) -> WindowResult<Vec<Vec<usize>>> {
        let key_columns: Vec<&[Value]> =
            keys.iter().map(|name| table.column_or_error(name)).collect::<WindowResult<_>>()?;

        let mut groups: Vec<Vec<usize>> = Vec::new();
        let mut index: std::collections::HashMap<Vec<u8>, usize> =
            std::collections::HashMap::new();
        let mut key_buffer = Vec::with_capacity(64);

        for row in 0..table.num_rows() {
            key_buffer.clear();
            for column in &key_columns {
                encode_value(&column[row], &mut key_buffer);
            }
            match index.get(&key_buffer) {
                Some(&group) => groups[group].push(row),
                None => {
                    index.insert(key_buffer.clone(), groups.len());
                    groups.push(vec![row]);
                }
            }
        }
        Ok(groups)
    }
}

/// Encodes a value to bytes for group-key hashing.
fn encode_value(value: &Value, buf: &mut Vec<u8>) {
    match value {
        Value::Null => buf.push(0),
        Value::Bool(b) => {
            buf.push(1);
            buf.push(u8::from(*b));
        }
        Value::Int(i) => {
            buf.push(2);
            buf.extend_from_slice(&i.to_le_bytes());
        }
        Value::Float(f) => {
            buf.push(3);
            buf.extend_from_slice(&f.to_le_bytes());
        }
        Value::String(s) => {
            buf.push(4);
            buf.extend_from_slice(s.as_bytes());
            buf.push(0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exec::table::Schema;

    fn make_table() -> Table {
        Table::new(
            Schema::from(vec!["k", "v"]),
            vec![
                vec![
                    Value::from("a"),
                    Value::from("b"),
                    Value::from("a"),
                    Value::Null,
                    Value::from("b"),
                ],
                (0..5).map(Value::Int).collect(),
            ],
        )
        .unwrap()
    }

    #[test]
    fn groups_in_first_appearance_order() {
        let groups =
            LocalPartitioner.partition(&make_table(), &["k".to_string()]).unwrap();
        assert_eq!(groups, vec![vec![0, 2], vec![1, 4], vec![3]]);
    }

    #[test]
    fn nulls_form_their_own_group() {
        let groups =
            LocalPartitioner.partition(&make_table(), &["k".to_string()]).unwrap();
        assert_eq!(groups[2], vec![3]);
    }

    #[test]
    fn multi_key_grouping() {
        let table = Table::new(
            Schema::from(vec!["a", "b"]),
            vec![
                vec![Value::Int(1), Value::Int(1), Value::Int(2)],
                vec![Value::Int(1), Value::Int(2), Value::Int(1)],
            ],
        )
        .unwrap();
        let groups = LocalPartitioner
            .partition(&table, &["a".to_string(), "b".to_string()])
            .unwrap();
        assert_eq!(groups, vec![vec![0], vec![1], vec![2]]);
    }

    #[test]
    fn missing_key_column() {
        let err = LocalPartitioner.partition(&make_table(), &["nope".to_string()]).unwrap_err();
        assert!(matches!(err, crate::error::WindowError::ColumnNotFound(_)));
    }
}
