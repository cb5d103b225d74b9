//! Partition-based clustering.

mod kmeans;

pub use kmeans::{ClusteringError, KMeans, KMeansFit, KMeansParams};
