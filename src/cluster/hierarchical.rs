//! Hierarchical clustering of points under Euclidean distance.
//!
//! Bottom-up clustering that builds a **dendrogram** by iteratively
//! merging the closest clusters. Unlike K-means or GMM, you don't
//! need to specify k in advance: cut the tree at any height.
//!
//! This is the point-data front end. It computes Euclidean distances and
//! hands them to a [`Clusterer`]; anything needing another metric should
//! build a [`DistanceMatrix`] and use the engine directly.
//!
//! # When to Use
//!
//! - **Exploratory analysis**: View cluster structure at multiple granularities
//! - **Unknown k**: Cut dendrogram at different heights to explore
//! - **Small-medium data**: O(n²) space for distance matrix, O(n³) time

use super::engine::Clusterer;
use super::linkage::Linkage;
use super::traits::Clustering;
use crate::distance::DistanceMatrix;
use crate::error::{Error, Result};
use crate::hierarchy::Dendrogram;

/// Hierarchical (agglomerative) clustering.
#[derive(Debug, Clone)]
pub struct HierarchicalClustering {
    /// Number of clusters to produce.
    n_clusters: usize,
    /// Linkage method.
    linkage: Linkage,
}

impl HierarchicalClustering {
    /// Create a new hierarchical clusterer.
    pub fn new(n_clusters: usize) -> Self {
        Self {
            n_clusters,
            linkage: Linkage::Average,
        }
    }

    /// Set linkage method.
    pub fn with_linkage(mut self, linkage: Linkage) -> Self {
        self.linkage = linkage;
        self
    }

    /// Linkage method in use.
    pub fn linkage(&self) -> Linkage {
        self.linkage
    }

    /// Euclidean distance matrix over `data`.
    pub fn distance_matrix(&self, data: &[Vec<f32>]) -> Result<DistanceMatrix> {
        if data.is_empty() {
            return Err(Error::EmptyInput);
        }

        let d = data[0].len();
        if let Some(p) = data.iter().find(|p| p.len() != d) {
            return Err(Error::DimensionMismatch {
                expected: d,
                found: p.len(),
            });
        }

        DistanceMatrix::from_fn(data.len(), |i, j| {
            euclidean_distance_f64(&data[i], &data[j])
        })
    }

    /// Fit and return the full dendrogram.
    pub fn fit_dendrogram(&self, data: &[Vec<f32>]) -> Result<Dendrogram> {
        let distances = self.distance_matrix(data)?;
        Clusterer::new(distances, self.linkage)?.run()
    }
}

/// Euclidean distance between two points.
#[inline]
fn euclidean_distance_f64(a: &[f32], b: &[f32]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let dx = *x as f64 - *y as f64;
            dx * dx
        })
        .sum::<f64>()
        .sqrt()
}

impl Clustering for HierarchicalClustering {
    fn fit_predict(&self, data: &[Vec<f32>]) -> Result<Vec<usize>> {
        let distances = self.distance_matrix(data)?;
        Clusterer::new(distances, self.linkage)?.run_to_count(self.n_clusters)
    }

    fn n_clusters(&self) -> usize {
        self.n_clusters
    }
}
