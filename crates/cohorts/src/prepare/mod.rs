//! Feature preparation: encoding, scaling, and matrix assembly.
//!
//! # Overview
//!
//! [`prepare`] takes a classified table and produces a [`PreparedTable`]:
//! categorical columns become integer codes ([`EncodingMap`]) which are then
//! standardized like any other numeric feature, numeric columns become
//! standardized floats ([`ScalingStats`]), identifier and ignored columns
//! pass through raw. Column order is preserved.
//!
//! The feature matrix for clustering is assembled from the prepared feature
//! columns in table order. It is built feature-major
//! `[n_features, n_samples]` and transposed to sample-major for the cluster
//! engine.

mod encode;
mod scale;

pub use encode::EncodingMap;
pub use scale::ScalingStats;

use ndarray::{Array2, ArrayView2};

use crate::data::{ColumnKind, Table, TableSchema};

/// Values of one prepared column.
#[derive(Debug, Clone, PartialEq)]
pub enum PreparedValues {
    /// Raw pass-through cells (identifier and ignored columns).
    Raw(Vec<String>),

    /// Standardized feature values (scaled numerics and encoded-then-scaled
    /// categoricals).
    Scaled(Vec<f32>),
}

/// A single prepared column.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedColumn {
    /// Column name.
    pub name: String,

    /// Derived kind, carried over from classification.
    pub kind: ColumnKind,

    /// Prepared cell values.
    pub values: PreparedValues,
}

/// A table after encoding and scaling, in original column and row order.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedTable {
    columns: Vec<PreparedColumn>,
    n_rows: usize,
}

impl PreparedTable {
    /// Number of rows.
    #[inline]
    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    /// Number of feature columns (categorical + numeric).
    pub fn n_features(&self) -> usize {
        self.columns.iter().filter(|c| c.kind.is_feature()).count()
    }

    /// Prepared columns in original order.
    pub fn columns(&self) -> &[PreparedColumn] {
        &self.columns
    }

    /// Identifier values in row order.
    ///
    /// Classification guarantees exactly one identifier column exists.
    pub fn identifiers(&self) -> &[String] {
        self.columns
            .iter()
            .find_map(|c| match (&c.kind, &c.values) {
                (ColumnKind::Identifier, PreparedValues::Raw(values)) => Some(values.as_slice()),
                _ => None,
            })
            .unwrap_or(&[])
    }

    /// Assemble the feature matrix, feature-major `[n_features, n_samples]`.
    ///
    /// Feature rows follow table column order: encoded categoricals and
    /// scaled numerics interleave exactly as their source columns do.
    pub fn feature_matrix(&self) -> Array2<f32> {
        let n_features = self.n_features();
        let mut matrix = Array2::zeros((n_features, self.n_rows));

        let mut feature = 0;
        for col in &self.columns {
            match &col.values {
                PreparedValues::Scaled(values) => {
                    for (sample, &value) in values.iter().enumerate() {
                        matrix[[feature, sample]] = value;
                    }
                }
                PreparedValues::Raw(_) => continue,
            }
            feature += 1;
        }

        matrix
    }

    /// Assemble the feature matrix, sample-major `[n_samples, n_features]`.
    ///
    /// This is the layout the cluster engine consumes: one contiguous
    /// feature vector per row.
    pub fn samples_matrix(&self) -> Array2<f32> {
        transpose_to_c_order(self.feature_matrix().view())
    }
}

/// Encode and scale a classified table.
///
/// Classification has already validated the schema, so preparation itself
/// cannot fail. Encoders and scaling statistics are fitted from this
/// table alone and discarded with the returned value.
pub fn prepare(table: &Table, schema: &TableSchema) -> PreparedTable {
    debug_assert_eq!(schema.n_columns(), table.n_cols());

    let columns = table
        .columns()
        .iter()
        .enumerate()
        .map(|(i, col)| {
            let kind = schema.kind(i);
            let values = match kind {
                ColumnKind::Categorical => {
                    // Encoded codes are numeric features and get standardized
                    // like any other numeric column.
                    let (codes, _map) = EncodingMap::fit_transform(col.values());
                    let as_floats: Vec<f32> = codes.iter().map(|&c| c as f32).collect();
                    let (scaled, _stats) = ScalingStats::fit_transform(&as_floats);
                    PreparedValues::Scaled(scaled)
                }
                ColumnKind::Numeric => {
                    let raw: Vec<f32> = col
                        .values()
                        .iter()
                        .map(|v| v.trim().parse::<f32>().unwrap_or(0.0))
                        .collect();
                    let (scaled, _stats) = ScalingStats::fit_transform(&raw);
                    PreparedValues::Scaled(scaled)
                }
                ColumnKind::Identifier | ColumnKind::Ignored => {
                    PreparedValues::Raw(col.values().to_vec())
                }
            };

            PreparedColumn {
                name: col.name().to_string(),
                kind,
                values,
            }
        })
        .collect();

    PreparedTable {
        columns,
        n_rows: table.n_rows(),
    }
}

/// Transpose a matrix into standard (C-order) layout.
fn transpose_to_c_order(matrix: ArrayView2<f32>) -> Array2<f32> {
    matrix.t().as_standard_layout().to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{RawColumn, Table, TableSchema};
    use approx::assert_abs_diff_eq;

    fn col(name: &str, values: &[&str]) -> RawColumn {
        RawColumn::new(name, values.iter().map(|v| v.to_string()).collect())
    }

    fn prepared(columns: Vec<RawColumn>) -> PreparedTable {
        let table = Table::from_columns(columns).unwrap();
        let schema = TableSchema::classify(&table).unwrap();
        prepare(&table, &schema)
    }

    #[test]
    fn prepare_encodes_and_scales() {
        let p = prepared(vec![
            col("name", &["Alice", "Bob", "Carol"]),
            col("age", &["20", "45", "22"]),
            col("gaming_platform_top1", &["PC", "Console", "PC"]),
        ]);

        assert_eq!(p.n_rows(), 3);
        assert_eq!(p.n_features(), 2);
        assert_eq!(p.identifiers(), &["Alice", "Bob", "Carol"]);

        // Platform codes (Console=0, PC=1) are standardized after encoding:
        // [1, 0, 1] scales to [1/sqrt(2), -sqrt(2), 1/sqrt(2)].
        let platform = match &p.columns()[2].values {
            PreparedValues::Scaled(v) => v.clone(),
            other => panic!("expected scaled column, got {other:?}"),
        };
        assert_abs_diff_eq!(platform[0], 0.707_106_8, epsilon = 1e-5);
        assert_abs_diff_eq!(platform[1], -1.414_213_5, epsilon = 1e-5);
        assert_eq!(platform[0], platform[2]);

        let age = match &p.columns()[1].values {
            PreparedValues::Scaled(v) => v.clone(),
            other => panic!("expected scaled column, got {other:?}"),
        };
        let mean: f32 = age.iter().sum::<f32>() / age.len() as f32;
        assert_abs_diff_eq!(mean, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn feature_matrix_follows_column_order() {
        let p = prepared(vec![
            col("name", &["Alice", "Bob"]),
            col("ott_top1", &["Netflix", "Hulu"]),
            col("age", &["20", "45"]),
        ]);

        let matrix = p.feature_matrix();
        assert_eq!(matrix.dim(), (2, 2));
        // Feature 0 is the encoded ott_top1 column (Hulu=0, Netflix=1),
        // standardized to [1, -1].
        assert_abs_diff_eq!(matrix[[0, 0]], 1.0, epsilon = 1e-6);
        assert_abs_diff_eq!(matrix[[0, 1]], -1.0, epsilon = 1e-6);
    }

    #[test]
    fn samples_matrix_is_transposed_and_contiguous() {
        let p = prepared(vec![
            col("name", &["Alice", "Bob", "Carol"]),
            col("age", &["20", "45", "22"]),
            col("income", &["10", "20", "30"]),
        ]);

        let fm = p.feature_matrix();
        let sm = p.samples_matrix();
        assert_eq!(sm.dim(), (3, 2));
        for sample in 0..3 {
            for feature in 0..2 {
                assert_eq!(sm[[sample, feature]], fm[[feature, sample]]);
            }
        }
        assert!(sm.is_standard_layout());
    }

    #[test]
    fn ignored_columns_pass_through_raw() {
        let p = prepared(vec![
            col("name", &["Alice", "Bob"]),
            col("age", &["20", "45"]),
            col("bio", &["likes cats", "likes dogs"]),
        ]);

        assert_eq!(p.n_features(), 1);
        assert_eq!(
            p.columns()[2].values,
            PreparedValues::Raw(vec!["likes cats".into(), "likes dogs".into()])
        );
    }

    #[test]
    fn constant_numeric_column_prepares_to_zeros() {
        let p = prepared(vec![
            col("name", &["Alice", "Bob"]),
            col("age", &["20", "45"]),
            col("height", &["170", "170"]),
        ]);

        let matrix = p.feature_matrix();
        // Second numeric feature (height) is all zeros, no NaN/Inf.
        assert_eq!(matrix[[1, 0]], 0.0);
        assert_eq!(matrix[[1, 1]], 0.0);
    }
}
