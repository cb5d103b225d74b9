//! cohorts: behavioral cohort clustering for tabular people data.
//!
//! Takes a flat CSV table of people with numeric and categorical
//! attributes, partitions them into a fixed number of clusters with
//! k-means, and returns a summary plus a full per-row export.
//!
//! # Key Types
//!
//! - [`ClusterPipeline`] / [`PipelineConfig`] - The end-to-end run
//! - [`ClusterResult`] - Cluster summary and per-row export
//! - [`KMeans`] / [`KMeansParams`] - The cluster engine
//! - [`Table`] / [`TableSchema`] - Raw data and column classification
//! - [`TaskStore`] - Keyed processing/completed/failed result store
//!
//! # Pipeline
//!
//! `run_csv` decodes the bytes, classifies columns (the `"name"` column
//! identifies rows; a fixed set of attribute names is categorical; the rest
//! is numeric or ignored), label-encodes categoricals, standardizes
//! numerics, and clusters the combined feature matrix. Runs are
//! deterministic for a fixed seed.
//!
//! ```
//! use cohorts::{ClusterPipeline, PipelineConfig};
//!
//! let csv = b"name,age,gaming_platform_top1\n\
//!             Alice,20,PC\n\
//!             Bob,45,Console\n\
//!             Carol,22,PC\n";
//!
//! let pipeline = ClusterPipeline::new(PipelineConfig {
//!     n_clusters: 2,
//!     ..Default::default()
//! });
//! let result = pipeline.run_csv(csv)?;
//! println!("{}", result.to_download_json()?);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod cluster;
pub mod data;
pub mod pipeline;
pub mod prepare;
pub mod tasks;
pub mod utils;

// =============================================================================
// Convenience Re-exports
// =============================================================================

// High-level pipeline types
pub use pipeline::{ClusterPipeline, ClusterResult, PipelineConfig, PipelineError, Verbosity};

// Data types (for preparing input tables)
pub use data::{ColumnKind, RawColumn, SchemaError, Table, TableSchema};

// Cluster engine
pub use cluster::{ClusteringError, KMeans, KMeansParams};

// Task store
pub use tasks::{TaskId, TaskStatus, TaskStore};

// Shared utilities
pub use utils::{run_with_threads, Parallelism};
