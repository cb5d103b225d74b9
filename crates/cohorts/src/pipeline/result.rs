//! Result assembly and serialization.
//!
//! [`ClusterResult`] is built once per run and immutable afterwards. Its
//! JSON form is
//!
//! ```json
//! {
//!   "number_of_clusters": 2,
//!   "clusters": { "Cluster 0": ["Alice"], "Cluster 1": ["Bob"] },
//!   "all_rows": [ { "name": "Alice", "age": -1.0, "Cluster": 0 }, ... ]
//! }
//! ```
//!
//! Cluster keys are emitted in ascending label order, empty clusters
//! included. The download export carries only `number_of_clusters` and
//! `clusters`, pretty-printed with 2-space indentation, and is byte-stable
//! for identical input and seed.

use serde::ser::{SerializeMap, SerializeStruct};
use serde::{Serialize, Serializer};

use crate::cluster::KMeansFit;
use crate::prepare::{PreparedTable, PreparedValues};

/// Key added to every exported row record with the assigned cluster label.
pub const CLUSTER_FIELD: &str = "Cluster";

/// A single exported cell value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    /// Raw text (identifier and ignored columns).
    Text(String),

    /// Integer (cluster labels).
    Int(i64),

    /// Standardized feature value.
    Float(f32),
}

/// One exported row: original columns (post-encoding, post-scaling) plus
/// the assigned cluster, in original column order.
#[derive(Debug, Clone, PartialEq)]
pub struct RowRecord {
    fields: Vec<(String, CellValue)>,
}

impl RowRecord {
    /// Field value by column name.
    pub fn get(&self, name: &str) -> Option<&CellValue> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value)
    }

    /// All fields in export order.
    pub fn fields(&self) -> &[(String, CellValue)] {
        &self.fields
    }

    /// The assigned cluster label.
    pub fn cluster(&self) -> Option<i64> {
        match self.get(CLUSTER_FIELD) {
            Some(CellValue::Int(label)) => Some(*label),
            _ => None,
        }
    }
}

impl Serialize for RowRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// The outcome of one pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterResult {
    cluster_count: usize,
    clusters: Vec<Vec<String>>,
    all_rows: Vec<RowRecord>,
}

impl ClusterResult {
    /// Number of requested clusters (k).
    pub fn cluster_count(&self) -> usize {
        self.cluster_count
    }

    /// Member identifiers per cluster label, ascending label order. Labels
    /// with no members are present as empty lists.
    pub fn clusters(&self) -> &[Vec<String>] {
        &self.clusters
    }

    /// Identifiers assigned to one cluster label, in original row order.
    pub fn members(&self, label: usize) -> &[String] {
        &self.clusters[label]
    }

    /// Every row with its transformed values and assigned cluster, in
    /// original row order.
    pub fn all_rows(&self) -> &[RowRecord] {
        &self.all_rows
    }

    /// Number of rows across all clusters.
    pub fn n_rows(&self) -> usize {
        self.all_rows.len()
    }

    /// Number of clusters with no members.
    pub fn n_empty_clusters(&self) -> usize {
        self.clusters.iter().filter(|c| c.is_empty()).count()
    }

    /// The downloadable export: only `number_of_clusters` and `clusters`,
    /// pretty-printed with 2-space indentation.
    pub fn to_download_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&DownloadExport { result: self })
    }
}

impl Serialize for ClusterResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut out = serializer.serialize_struct("ClusterResult", 3)?;
        out.serialize_field("number_of_clusters", &self.cluster_count)?;
        out.serialize_field("clusters", &ClustersMap(&self.clusters))?;
        out.serialize_field("all_rows", &self.all_rows)?;
        out.end()
    }
}

/// Serializes cluster member lists as `"Cluster {i}"` keys in label order.
struct ClustersMap<'a>(&'a [Vec<String>]);

impl Serialize for ClustersMap<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (label, members) in self.0.iter().enumerate() {
            map.serialize_entry(&format!("Cluster {label}"), members)?;
        }
        map.end()
    }
}

/// The persisted/downloadable subset of a result.
struct DownloadExport<'a> {
    result: &'a ClusterResult,
}

impl Serialize for DownloadExport<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut out = serializer.serialize_struct("DownloadExport", 2)?;
        out.serialize_field("number_of_clusters", &self.result.cluster_count)?;
        out.serialize_field("clusters", &ClustersMap(&self.result.clusters))?;
        out.end()
    }
}

/// Group identifiers by cluster label and build the per-row export.
///
/// Pure aggregation over already-validated data: every label is in
/// `[0, k-1]` and row order is preserved within each cluster and in
/// `all_rows`.
pub fn assemble(prepared: &PreparedTable, fit: &KMeansFit, k: usize) -> ClusterResult {
    debug_assert_eq!(fit.labels.len(), prepared.n_rows());

    let mut clusters: Vec<Vec<String>> = vec![Vec::new(); k];
    for (identifier, &label) in prepared.identifiers().iter().zip(&fit.labels) {
        clusters[label as usize].push(identifier.clone());
    }

    let all_rows = (0..prepared.n_rows())
        .map(|row| {
            let mut fields: Vec<(String, CellValue)> = prepared
                .columns()
                .iter()
                .map(|col| {
                    let value = match &col.values {
                        PreparedValues::Raw(values) => CellValue::Text(values[row].clone()),
                        PreparedValues::Scaled(values) => CellValue::Float(values[row]),
                    };
                    (col.name.clone(), value)
                })
                .collect();
            fields.push((
                CLUSTER_FIELD.to_string(),
                CellValue::Int(fit.labels[row] as i64),
            ));
            RowRecord { fields }
        })
        .collect();

    ClusterResult {
        cluster_count: k,
        clusters,
        all_rows,
    }
}
