//! Shared error types for table construction and classification.

/// Errors that can occur when constructing a [`Table`](super::Table).
#[derive(Debug, Clone, thiserror::Error)]
pub enum TableError {
    #[error("table must contain at least one column")]
    NoColumns,

    #[error("inconsistent row count in column '{column}': expected {expected}, got {got}")]
    RaggedColumns {
        column: String,
        expected: usize,
        got: usize,
    },

    #[error("duplicate column name: '{0}'")]
    DuplicateColumn(String),
}

/// Errors that can occur when classifying a table's columns.
///
/// Both variants are non-retryable: the input data must be fixed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    #[error("dataset must contain a '{0}' column for person identification")]
    MissingIdentifier(&'static str),

    #[error("dataset must contain at least one numeric column for clustering")]
    NoNumericColumns,
}
