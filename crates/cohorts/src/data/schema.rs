//! Column classification.
//!
//! Classification happens once at pipeline start and produces a
//! [`TableSchema`]: one [`ColumnMeta`] per table column, in table order.
//! Later stages branch on the derived [`ColumnKind`] instead of re-inspecting
//! raw values.

use super::error::SchemaError;
use super::table::Table;

/// Name of the mandatory identifier column (case-sensitive).
pub const IDENTIFIER_COLUMN: &str = "name";

/// The fixed, closed set of recognized categorical attribute names.
///
/// Columns are categorical by membership in this set, not by value
/// inference.
pub const KNOWN_CATEGORICALS: [&str; 4] = [
    "gaming_platform_top1",
    "social_platform_top1",
    "ott_top1",
    "content_creation_freq",
];

/// Derived role of a column.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColumnKind {
    /// The row identifier column ([`IDENTIFIER_COLUMN`]).
    Identifier,

    /// A recognized categorical attribute, encoded to integer codes before
    /// clustering.
    Categorical,

    /// A column whose cells all parse as numbers; standardized before
    /// clustering.
    Numeric,

    /// Anything else. Carried through to the per-row export untouched, but
    /// contributes no feature.
    Ignored,
}

impl ColumnKind {
    /// Returns true if the column contributes a feature to clustering.
    #[inline]
    pub fn is_feature(&self) -> bool {
        matches!(self, ColumnKind::Categorical | ColumnKind::Numeric)
    }
}

/// Metadata for a single classified column.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColumnMeta {
    /// Column name.
    pub name: String,

    /// Derived kind.
    pub kind: ColumnKind,
}

/// Per-column classification for a whole table, in table column order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TableSchema {
    columns: Vec<ColumnMeta>,
}

impl TableSchema {
    /// Classify every column of a table.
    ///
    /// Rules:
    /// - exactly the column named [`IDENTIFIER_COLUMN`] is the identifier;
    /// - columns named in [`KNOWN_CATEGORICALS`] are categorical;
    /// - remaining columns are numeric iff all their cells parse as numbers,
    ///   otherwise ignored.
    ///
    /// # Errors
    ///
    /// - [`SchemaError::MissingIdentifier`] if no identifier column exists.
    /// - [`SchemaError::NoNumericColumns`] if no numeric column remains after
    ///   removing the identifier and the categorical columns.
    pub fn classify(table: &Table) -> Result<Self, SchemaError> {
        if table.column(IDENTIFIER_COLUMN).is_none() {
            return Err(SchemaError::MissingIdentifier(IDENTIFIER_COLUMN));
        }

        let columns: Vec<ColumnMeta> = table
            .columns()
            .iter()
            .map(|col| {
                let kind = if col.name() == IDENTIFIER_COLUMN {
                    ColumnKind::Identifier
                } else if KNOWN_CATEGORICALS.contains(&col.name()) {
                    ColumnKind::Categorical
                } else if is_numeric_column(col.values()) {
                    ColumnKind::Numeric
                } else {
                    ColumnKind::Ignored
                };
                ColumnMeta {
                    name: col.name().to_string(),
                    kind,
                }
            })
            .collect();

        if !columns.iter().any(|m| m.kind == ColumnKind::Numeric) {
            return Err(SchemaError::NoNumericColumns);
        }

        Ok(Self { columns })
    }

    /// Number of classified columns.
    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    /// Number of feature columns (categorical + numeric).
    pub fn n_features(&self) -> usize {
        self.columns.iter().filter(|m| m.kind.is_feature()).count()
    }

    /// Per-column metadata in table order.
    pub fn columns(&self) -> &[ColumnMeta] {
        &self.columns
    }

    /// Kind of the column at `index`.
    pub fn kind(&self, index: usize) -> ColumnKind {
        self.columns[index].kind
    }

    /// Names of categorical columns, in table order.
    pub fn categorical_names(&self) -> impl Iterator<Item = &str> {
        self.names_of(ColumnKind::Categorical)
    }

    /// Names of numeric columns, in table order.
    pub fn numeric_names(&self) -> impl Iterator<Item = &str> {
        self.names_of(ColumnKind::Numeric)
    }

    fn names_of(&self, kind: ColumnKind) -> impl Iterator<Item = &str> {
        self.columns
            .iter()
            .filter(move |m| m.kind == kind)
            .map(|m| m.name.as_str())
    }
}

/// A column is numeric when every cell parses as a finite number.
///
/// Empty columns are not numeric: they carry no evidence of type.
fn is_numeric_column(values: &[String]) -> bool {
    !values.is_empty()
        && values
            .iter()
            .all(|v| v.trim().parse::<f32>().map_or(false, |x| x.is_finite()))
}
