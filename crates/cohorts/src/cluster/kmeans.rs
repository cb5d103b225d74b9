//! K-means partitional clustering.
//!
//! Squared-Euclidean k-means over a sample-major feature matrix. Centroids
//! are seeded with k-means++ (weighted sampling by squared distance to the
//! nearest already-chosen center), refined with Lloyd iterations, and the
//! whole procedure is restarted `n_init` times from independent RNG streams;
//! the restart with the lowest inertia wins.
//!
//! Determinism contract: a fixed seed, a fixed restart count, and sequential
//! reductions make repeated fits over the same matrix produce identical
//! labels. Cluster labels carry no meaning across datasets.

use ndarray::{Array2, ArrayView1, ArrayView2};
use rand::distributions::WeightedIndex;
use rand::prelude::*;
use rand_xoshiro::Xoshiro256PlusPlus;

use crate::utils::Parallelism;

// =============================================================================
// Params and errors
// =============================================================================

/// K-means fitting parameters.
#[derive(Clone, Debug)]
pub struct KMeansParams {
    /// Max Lloyd iterations per restart.
    pub max_iters: u32,

    /// Number of independent restarts; the lowest-inertia fit is kept.
    pub n_init: u32,

    /// Stop a restart when the inertia improvement falls below this
    /// threshold.
    pub tolerance: f32,

    /// Seed for centroid initialization. Pinned so identical inputs produce
    /// identical labels.
    pub seed: u64,
}

impl Default for KMeansParams {
    fn default() -> Self {
        Self {
            max_iters: 300,
            n_init: 10,
            tolerance: 1e-4,
            seed: 42,
        }
    }
}

/// Errors that can occur when fitting. Non-retryable.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClusteringError {
    #[error("cannot form {k} clusters from {rows} rows")]
    TooManyClusters { k: usize, rows: usize },

    #[error("cluster count must be at least 1")]
    ZeroClusters,

    #[error("no numeric features available for clustering")]
    NoFeatures,
}

// =============================================================================
// KMeans
// =============================================================================

/// A fitted partition.
#[derive(Debug, Clone, PartialEq)]
pub struct KMeansFit {
    /// One label per row, in `[0, k-1]`, same row order as the input.
    pub labels: Vec<u32>,

    /// Final centroids, `[k, n_features]`.
    pub centroids: Array2<f32>,

    /// Sum of squared distances from each row to its assigned centroid.
    pub inertia: f32,

    /// Lloyd iterations used by the winning restart.
    pub n_iters: u32,
}

/// K-means fitter.
#[derive(Debug, Clone, Default)]
pub struct KMeans {
    params: KMeansParams,
}

impl KMeans {
    /// Create a fitter with the given parameters.
    pub fn new(params: KMeansParams) -> Self {
        Self { params }
    }

    /// Partition `data` (`[n_samples, n_features]`, sample-major) into `k`
    /// clusters.
    ///
    /// # Errors
    ///
    /// - [`ClusteringError::ZeroClusters`] if `k == 0`.
    /// - [`ClusteringError::NoFeatures`] if the matrix has zero columns.
    /// - [`ClusteringError::TooManyClusters`] if `k` exceeds the row count.
    pub fn fit(
        &self,
        data: ArrayView2<f32>,
        k: usize,
        parallelism: Parallelism,
    ) -> Result<KMeansFit, ClusteringError> {
        let (rows, n_features) = data.dim();

        if k == 0 {
            return Err(ClusteringError::ZeroClusters);
        }
        if n_features == 0 {
            return Err(ClusteringError::NoFeatures);
        }
        if k > rows {
            return Err(ClusteringError::TooManyClusters { k, rows });
        }

        let mut rng = Xoshiro256PlusPlus::seed_from_u64(self.params.seed);
        let mut best = self.lloyd(data, k, next_stream(&mut rng), parallelism);
        for _ in 1..self.params.n_init.max(1) {
            let fit = self.lloyd(data, k, next_stream(&mut rng), parallelism);
            if fit.inertia < best.inertia {
                best = fit;
            }
        }

        Ok(best)
    }

    /// One full restart: seed with k-means++, iterate until assignments
    /// stabilize, the inertia improvement drops below tolerance, or the
    /// iteration cap is hit.
    fn lloyd(
        &self,
        data: ArrayView2<f32>,
        k: usize,
        mut rng: Xoshiro256PlusPlus,
        parallelism: Parallelism,
    ) -> KMeansFit {
        let n_samples = data.nrows();
        let mut centroids = init_plus_plus(data, k, &mut rng);
        let mut labels = vec![0u32; n_samples];
        let mut inertia = f32::INFINITY;
        let mut n_iters = 0;

        for iter in 0..self.params.max_iters.max(1) {
            n_iters = iter + 1;

            let assignment =
                parallelism.maybe_par_map(0..n_samples, |row| {
                    nearest_centroid(data.row(row), centroids.view())
                });

            let new_inertia: f32 = assignment.iter().map(|&(_, d)| d).sum();
            let changed = assignment
                .iter()
                .zip(&labels)
                .any(|(&(label, _), &prev)| label != prev);
            for (slot, &(label, _)) in labels.iter_mut().zip(&assignment) {
                *slot = label;
            }

            update_centroids(data, &labels, &mut centroids);

            let improvement = inertia - new_inertia;
            inertia = new_inertia;
            if !changed || improvement.abs() <= self.params.tolerance {
                break;
            }
        }

        KMeansFit {
            labels,
            centroids,
            inertia,
            n_iters,
        }
    }
}

/// Derive an independent RNG stream for one restart.
fn next_stream(rng: &mut Xoshiro256PlusPlus) -> Xoshiro256PlusPlus {
    let stream = rng.clone();
    rng.long_jump();
    stream
}

/// k-means++ seeding: the first centroid is uniform, each further centroid
/// is a data row sampled with probability proportional to its squared
/// distance to the nearest chosen centroid.
fn init_plus_plus(data: ArrayView2<f32>, k: usize, rng: &mut Xoshiro256PlusPlus) -> Array2<f32> {
    let n_samples = data.nrows();
    let mut centroids = Array2::zeros((k, data.ncols()));

    let first = rng.gen_range(0..n_samples);
    centroids.row_mut(0).assign(&data.row(first));

    let mut dist2: Vec<f32> = (0..n_samples)
        .map(|row| squared_distance(data.row(row), centroids.row(0)))
        .collect();

    for center in 1..k {
        // All-zero weights means every row coincides with a chosen centroid;
        // fall back to uniform and accept the duplicate.
        let chosen = match WeightedIndex::new(dist2.iter().copied()) {
            Ok(weights) => weights.sample(rng),
            Err(_) => rng.gen_range(0..n_samples),
        };
        centroids.row_mut(center).assign(&data.row(chosen));

        for (row, slot) in dist2.iter_mut().enumerate() {
            let d = squared_distance(data.row(row), centroids.row(center));
            if d < *slot {
                *slot = d;
            }
        }
    }

    centroids
}

/// Nearest centroid by squared Euclidean distance; ties break to the lowest
/// label.
fn nearest_centroid(point: ArrayView1<f32>, centroids: ArrayView2<f32>) -> (u32, f32) {
    let mut best = (0u32, f32::INFINITY);
    for (label, centroid) in centroids.rows().into_iter().enumerate() {
        let d = squared_distance(point, centroid);
        if d < best.1 {
            best = (label as u32, d);
        }
    }
    best
}

/// Recompute each centroid as the mean of its assigned rows. A cluster with
/// no members keeps its previous centroid.
fn update_centroids(data: ArrayView2<f32>, labels: &[u32], centroids: &mut Array2<f32>) {
    let k = centroids.nrows();
    let mut counts = vec![0usize; k];
    let mut sums = Array2::<f32>::zeros(centroids.dim());

    for (row, &label) in labels.iter().enumerate() {
        counts[label as usize] += 1;
        let mut sum = sums.row_mut(label as usize);
        sum += &data.row(row);
    }

    for cluster in 0..k {
        if counts[cluster] > 0 {
            let inv = 1.0 / counts[cluster] as f32;
            let mut centroid = centroids.row_mut(cluster);
            centroid.assign(&sums.row(cluster));
            centroid *= inv;
        }
    }
}

#[inline]
fn squared_distance(a: ArrayView1<f32>, b: ArrayView1<f32>) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y) * (x - y))
        .sum()
}
