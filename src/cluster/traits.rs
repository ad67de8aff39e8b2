//! Clustering traits.

use crate::error::Result;

/// Trait for hard clustering algorithms over point data.
pub trait Clustering {
    /// Fit the model to data and return cluster assignments.
    ///
    /// Returns a vector of cluster labels, one per input point.
    fn fit_predict(&self, data: &[Vec<f32>]) -> Result<Vec<usize>>;

    /// Get the number of clusters.
    fn n_clusters(&self) -> usize;
}
