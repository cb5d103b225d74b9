//! Raw table container.
//!
//! A [`Table`] is an ordered sequence of named columns of raw string cells,
//! aligned by row index. It is what the CSV reader produces and what the
//! pipeline consumes; no type information is attached until classification.

use super::error::TableError;

/// A single raw column: name plus one cell per row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawColumn {
    name: String,
    values: Vec<String>,
}

impl RawColumn {
    /// Create a column from a name and its cells.
    pub fn new(name: impl Into<String>, values: Vec<String>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    /// Column name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Cell values, one per row.
    pub fn values(&self) -> &[String] {
        &self.values
    }

    /// Number of rows in this column.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if the column has no rows.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// An in-memory table of named, equal-length columns.
///
/// # Invariants
///
/// - All columns have the same number of rows.
/// - Column names are unique.
/// - Row order is preserved end-to-end, so identifiers map back to cluster
///   assignments by index.
///
/// # Example
///
/// ```
/// use cohorts::data::{RawColumn, Table};
///
/// let table = Table::from_columns(vec![
///     RawColumn::new("name", vec!["Alice".into(), "Bob".into()]),
///     RawColumn::new("age", vec!["20".into(), "45".into()]),
/// ])
/// .unwrap();
///
/// assert_eq!(table.n_rows(), 2);
/// assert_eq!(table.n_cols(), 2);
/// assert_eq!(table.column("age").unwrap().values()[1], "45");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    columns: Vec<RawColumn>,
    n_rows: usize,
}

impl Table {
    /// Create a table from columns, validating shape invariants.
    ///
    /// # Errors
    ///
    /// Returns [`TableError`] if no columns are given, columns disagree on
    /// row count, or two columns share a name.
    pub fn from_columns(columns: Vec<RawColumn>) -> Result<Self, TableError> {
        if columns.is_empty() {
            return Err(TableError::NoColumns);
        }

        let n_rows = columns[0].len();
        for col in &columns {
            if col.len() != n_rows {
                return Err(TableError::RaggedColumns {
                    column: col.name().to_string(),
                    expected: n_rows,
                    got: col.len(),
                });
            }
        }

        for (i, col) in columns.iter().enumerate() {
            if columns[..i].iter().any(|c| c.name() == col.name()) {
                return Err(TableError::DuplicateColumn(col.name().to_string()));
            }
        }

        Ok(Self { columns, n_rows })
    }

    /// Number of rows.
    #[inline]
    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    /// Number of columns.
    #[inline]
    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    /// All columns in original order.
    pub fn columns(&self) -> &[RawColumn] {
        &self.columns
    }

    /// Look up a column by exact name.
    pub fn column(&self, name: &str) -> Option<&RawColumn> {
        self.columns.iter().find(|c| c.name() == name)
    }

    /// Column names in original order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name())
    }
}
