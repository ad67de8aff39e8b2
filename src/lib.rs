//! # hclust
//!
//! Agglomerative hierarchical clustering from pairwise distances, under single,
//! complete or average (UPGMA) linkage.
//!
//! The merge sequence is deterministic: ties are broken by the smallest
//! `(a, b)` cluster-id pair, and merge heights never decrease.
//!
//! ```rust
//! use hclust::{Clusterer, DistanceMatrix, Linkage};
//!
//! let m = DistanceMatrix::from_condensed(4, vec![2.0, 6.0, 10.0, 5.0, 9.0, 4.0]).unwrap();
//! let dendro = Clusterer::new(m, Linkage::Single).unwrap().run().unwrap();
//!
//! assert_eq!(dendro.heights(), vec![2.0, 4.0, 5.0]);
//! assert_eq!(dendro.cut_by_count(2).unwrap(), vec![0, 0, 1, 1]);
//! assert_eq!(dendro.cut_by_threshold(4.5).unwrap(), vec![0, 0, 1, 1]);
//! ```
//!
//! Cargo features:
//!
//! - `ndarray` (default): build distance matrices from `ndarray` views
//! - `parallel`: per-merge linkage updates on the rayon pool
//! - `serde`: serialize [`Linkage`], [`Merge`] and [`LinkageRow`]

pub mod cluster;
pub mod distance;
/// Error types used across `hclust`.
pub mod error;
pub mod hierarchy;

#[cfg(test)]
mod scenario_tests;

pub use cluster::{Clusterer, Clustering, EngineState, HierarchicalClustering, Linkage};
pub use distance::{DistanceMatrix, LabeledDistances};
pub use error::{Error, ErrorKind, Result};
pub use hierarchy::{Cluster, Dendrogram, LinkageRow, Merge, ValidationReport};
