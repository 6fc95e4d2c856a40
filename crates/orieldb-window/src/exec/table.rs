//! Column-major tables flowing through window execution.
//!
//! Window operators consume and produce whole columns, so the table keeps
//! its data column-major: a [`Schema`] mapping names to positions plus one
//! value vector per column, all of equal length.

use std::collections::HashMap;
use std::sync::Arc;

use orieldb_core::Value;

use crate::error::{WindowError, WindowResult};

/// A column of values.
pub type Column = Vec<Value>;

/// A schema defines the column names and their order in a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    /// Column names in order (using Arc<str> to avoid cloning).
    columns: Vec<Arc<str>>,
    /// Map from column name to index for fast lookup.
    name_to_index: HashMap<Arc<str>, usize>,
}

impl Schema {
    /// Creates a new schema from column names.
    #[must_use]
    pub fn new(columns: Vec<String>) -> Self {
        let arc_columns: Vec<Arc<str>> =
            columns.into_iter().map(|s| Arc::from(s.as_str())).collect();
        Self::from_arcs(arc_columns)
    }

    /// Creates a new schema from Arc<str> column names (avoids allocation).
    #[must_use]
    pub fn from_arcs(columns: Vec<Arc<str>>) -> Self {
        let name_to_index =
            columns.iter().enumerate().map(|(i, name)| (Arc::clone(name), i)).collect();
        Self { columns, name_to_index }
    }

    /// Creates an empty schema.
    #[must_use]
    pub fn empty() -> Self {
        Self { columns: Vec::new(), name_to_index: HashMap::new() }
    }

    /// Returns the column names as string slices.
    #[must_use]
    pub fn columns(&self) -> Vec<&str> {
        self.columns.iter().map(|s| s.as_ref()).collect()
    }

    /// Returns the number of columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Returns true if the schema has no columns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Gets the index for a column name.
    #[must_use]
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.name_to_index.get(name).copied()
    }

    /// Gets the column name at an index.
    #[must_use]
    pub fn column_at(&self, index: usize) -> Option<&str> {
        self.columns.get(index).map(|s| s.as_ref())
    }

    /// Returns true if the schema contains the given column.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.name_to_index.contains_key(name)
    }
}

impl From<Vec<String>> for Schema {
    fn from(columns: Vec<String>) -> Self {
        Self::new(columns)
    }
}

impl From<Vec<&str>> for Schema {
    fn from(columns: Vec<&str>) -> Self {
        Self::new(columns.into_iter().map(String::from).collect())
    }
}

/// A column-major table.
///
/// All columns have the same length; rows are addressed by index, and row
/// identity is positional. Window execution appends columns and never
/// reorders the rows of an existing table.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    schema: Schema,
    columns: Vec<Column>,
    num_rows: usize,
}

impl Table {
    /// Creates a table from a schema and matching columns.
    ///
    /// # Errors
    ///
    /// Returns [`WindowError::ColumnLengthMismatch`] if column lengths
    /// differ from one another.
    pub fn new(schema: Schema, columns: Vec<Column>) -> WindowResult<Self> {
        debug_assert_eq!(schema.len(), columns.len(), "schema and column count must match");
        let num_rows = columns.first().map_or(0, Vec::len);
        for (i, column) in columns.iter().enumerate() {
            if column.len() != num_rows {
                return Err(WindowError::ColumnLengthMismatch {
                    column: schema.column_at(i).unwrap_or("?").to_string(),
                    expected: num_rows,
                    actual: column.len(),
                });
            }
        }
        Ok(Self { schema, columns, num_rows })
    }

    /// Creates an empty table with no columns and no rows.
    #[must_use]
    pub fn empty() -> Self {
        Self { schema: Schema::empty(), columns: Vec::new(), num_rows: 0 }
    }

    /// Returns the schema.
    #[must_use]
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Returns the number of rows.
    #[must_use]
    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    /// Returns true if the table has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.num_rows == 0
    }

    /// Gets a column by name.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&[Value]> {
        self.schema.index_of(name).map(|i| self.columns[i].as_slice())
    }

    /// Gets a column by name, erroring if absent.
    pub fn column_or_error(&self, name: &str) -> WindowResult<&[Value]> {
        self.column(name).ok_or_else(|| WindowError::ColumnNotFound(name.to_string()))
    }

    /// Gets a single cell value.
    #[must_use]
    pub fn value(&self, column: &str, row: usize) -> Option<&Value> {
        self.column(column).and_then(|c| c.get(row))
    }

    /// Appends new columns in a single batch operation.
    ///
    /// A column whose name already exists replaces the existing column in
    /// place instead of being appended.
    ///
    /// # Errors
    ///
    /// Returns [`WindowError::ColumnLengthMismatch`] if a new column's
    /// length differs from the table's row count (unless the table has no
    /// columns yet, in which case the first column sets the row count).
    pub fn assign(&mut self, new_columns: Vec<(String, Column)>) -> WindowResult<()> {
        for (name, column) in new_columns {
            if self.columns.is_empty() {
                self.num_rows = column.len();
            } else if column.len() != self.num_rows {
                return Err(WindowError::ColumnLengthMismatch {
                    column: name,
                    expected: self.num_rows,
                    actual: column.len(),
                });
            }
            if let Some(i) = self.schema.index_of(&name) {
                self.columns[i] = column;
            } else {
                let mut names: Vec<Arc<str>> = self.schema.columns.clone();
                names.push(Arc::from(name.as_str()));
                self.schema = Schema::from_arcs(names);
                self.columns.push(column);
            }
        }
        Ok(())
    }

    /// Drops the named columns. Names absent from the schema are ignored.
    pub fn drop_columns(&mut self, names: &[String]) {
        let drop: Vec<usize> = names.iter().filter_map(|n| self.schema.index_of(n)).collect();
        if drop.is_empty() {
            return;
        }
        let mut kept_names: Vec<Arc<str>> = Vec::with_capacity(self.schema.len() - drop.len());
        let mut kept_columns: Vec<Column> = Vec::with_capacity(self.schema.len() - drop.len());
        for (i, column) in std::mem::take(&mut self.columns).into_iter().enumerate() {
            if !drop.contains(&i) {
                kept_names.push(Arc::clone(&self.schema.columns[i]));
                kept_columns.push(column);
            }
        }
        self.schema = Schema::from_arcs(kept_names);
        self.columns = kept_columns;
    }

    /// Projects the table onto a target row type, in target order.
    ///
    /// # Errors
    ///
    /// Returns [`WindowError::ColumnNotFound`] if a target field is absent.
    pub fn project_to(&self, fields: &[String]) -> WindowResult<Self> {
        let mut columns = Vec::with_capacity(fields.len());
        for field in fields {
            columns.push(self.column_or_error(field)?.to_vec());
        }
        Self::new(Schema::new(fields.to_vec()), columns)
    }
}
