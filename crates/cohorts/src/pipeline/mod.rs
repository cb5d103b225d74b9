//! Pipeline orchestration.
//!
//! [`ClusterPipeline`] sequences the stages: classify columns, encode
//! categoricals, scale numerics, run k-means, assemble the result. Any stage
//! failure aborts the whole run and surfaces as one [`PipelineError`]; there
//! is no partial recovery and no retry.
//!
//! The pipeline is synchronous and stateless between runs: each invocation
//! operates on its own table and produces its own [`ClusterResult`], so
//! concurrent invocations need no coordination. Callers that must not block
//! (request handlers) are expected to run it on their own worker, e.g.
//! through [`TaskStore::run_pipeline`](crate::tasks::TaskStore::run_pipeline).
//!
//! # Example
//!
//! ```
//! use cohorts::pipeline::{ClusterPipeline, PipelineConfig};
//!
//! let csv = b"name,age,gaming_platform_top1\n\
//!             Alice,20,PC\n\
//!             Bob,45,Console\n\
//!             Carol,22,PC\n\
//!             Dan,50,Console\n";
//!
//! let pipeline = ClusterPipeline::new(PipelineConfig {
//!     n_clusters: 2,
//!     ..Default::default()
//! });
//! let result = pipeline.run_csv(csv).unwrap();
//!
//! assert_eq!(result.cluster_count(), 2);
//! assert_eq!(result.n_rows(), 4);
//! ```

mod logger;
mod result;

pub use logger::{PipelineLogger, Verbosity};
pub use result::{assemble, CellValue, ClusterResult, RowRecord, CLUSTER_FIELD};

use crate::cluster::{ClusteringError, KMeans, KMeansParams};
use crate::data::io::{read_table, TableLoadError};
use crate::data::{ColumnKind, SchemaError, Table, TableSchema};
use crate::prepare::prepare;
use crate::utils::run_with_threads;

/// Default number of clusters when the caller does not override it.
pub const DEFAULT_CLUSTER_COUNT: usize = 3;

/// Pipeline configuration.
#[derive(Clone, Debug)]
pub struct PipelineConfig {
    /// Number of clusters to form.
    pub n_clusters: usize,

    /// K-means fitting parameters. The defaults pin the seed and restart
    /// count, which is what makes runs reproducible.
    pub kmeans: KMeansParams,

    /// Thread count for the clustering stage: 0 = auto, 1 = sequential.
    pub n_threads: usize,

    /// Verbosity of stage logging.
    pub verbosity: Verbosity,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            n_clusters: DEFAULT_CLUSTER_COUNT,
            kmeans: KMeansParams::default(),
            n_threads: 1,
            verbosity: Verbosity::default(),
        }
    }
}

/// Errors surfaced by a pipeline run, one terminal error per run.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Malformed input bytes (the parse-failure class).
    #[error(transparent)]
    Load(#[from] TableLoadError),

    /// The table's columns cannot support clustering.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// The clustering stage rejected the prepared data.
    #[error(transparent)]
    Clustering(#[from] ClusteringError),
}

/// The full dataset-to-clusters pipeline.
#[derive(Clone, Debug, Default)]
pub struct ClusterPipeline {
    config: PipelineConfig,
}

impl ClusterPipeline {
    /// Create a pipeline with the given configuration.
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// The active configuration.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Decode CSV bytes and run the pipeline on the decoded table.
    pub fn run_csv(&self, bytes: &[u8]) -> Result<ClusterResult, PipelineError> {
        let table = read_table(bytes)?;
        self.run(&table)
    }

    /// Run the pipeline on an already-decoded table.
    ///
    /// # Errors
    ///
    /// Propagates the first stage failure unchanged: [`SchemaError`] from
    /// classification, [`ClusteringError`] from the cluster engine.
    pub fn run(&self, table: &Table) -> Result<ClusterResult, PipelineError> {
        let logger = PipelineLogger::new(self.config.verbosity);
        logger.start_run(table.n_rows(), table.n_cols());

        let schema = TableSchema::classify(table)?;
        log_schema(&logger, &schema);

        let prepared = prepare(table, &schema);
        let data = prepared.samples_matrix();

        let k = self.config.n_clusters;
        let kmeans = KMeans::new(self.config.kmeans.clone());
        let fit = run_with_threads(self.config.n_threads, |parallelism| {
            kmeans.fit(data.view(), k, parallelism)
        })?;
        logger.log_clustering(k, fit.inertia, fit.n_iters);

        let result = assemble(&prepared, &fit, k);
        if result.n_empty_clusters() > 0 {
            logger.warn_empty_clusters(result.n_empty_clusters(), k);
        }

        Ok(result)
    }
}

fn log_schema(logger: &PipelineLogger, schema: &TableSchema) {
    let count = |kind: ColumnKind| {
        schema
            .columns()
            .iter()
            .filter(|meta| meta.kind == kind)
            .count()
    };
    logger.log_schema(
        count(ColumnKind::Categorical),
        count(ColumnKind::Numeric),
        count(ColumnKind::Ignored),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    const FOUR_PEOPLE: &[u8] = b"name,age,gaming_platform_top1\n\
                                 Alice,20,PC\n\
                                 Bob,45,Console\n\
                                 Carol,22,PC\n\
                                 Dan,50,Console\n";

    fn pipeline(n_clusters: usize) -> ClusterPipeline {
        ClusterPipeline::new(PipelineConfig {
            n_clusters,
            verbosity: Verbosity::Silent,
            ..Default::default()
        })
    }

    #[test]
    fn config_default() {
        let config = PipelineConfig::default();
        assert_eq!(config.n_clusters, DEFAULT_CLUSTER_COUNT);
        assert_eq!(config.n_threads, 1);
        assert_eq!(config.kmeans.seed, 42);
    }

    #[test]
    fn run_csv_end_to_end() {
        let result = pipeline(2).run_csv(FOUR_PEOPLE).unwrap();

        assert_eq!(result.cluster_count(), 2);
        assert_eq!(result.n_rows(), 4);
        let assigned: usize = result.clusters().iter().map(|c| c.len()).sum();
        assert_eq!(assigned, 4);
    }

    #[test]
    fn missing_identifier_propagates_as_schema_error() {
        let result = pipeline(2).run_csv(b"age\n20\n45\n");
        assert!(matches!(result, Err(PipelineError::Schema(_))));
    }

    #[test]
    fn empty_bytes_propagate_as_load_error() {
        let result = pipeline(2).run_csv(b"");
        assert!(matches!(
            result,
            Err(PipelineError::Load(TableLoadError::Empty))
        ));
    }

    #[test]
    fn oversized_k_propagates_as_clustering_error() {
        let result = pipeline(10).run_csv(FOUR_PEOPLE);
        assert!(matches!(
            result,
            Err(PipelineError::Clustering(ClusteringError::TooManyClusters {
                k: 10,
                rows: 4
            }))
        ));
    }

    #[test]
    fn error_messages_are_descriptive() {
        let err = pipeline(10).run_csv(FOUR_PEOPLE).unwrap_err();
        assert_eq!(err.to_string(), "cannot form 10 clusters from 4 rows");

        let err = pipeline(2).run_csv(b"age\n20\n").unwrap_err();
        assert_eq!(
            err.to_string(),
            "dataset must contain a 'name' column for person identification"
        );
    }
}
