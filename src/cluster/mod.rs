//! Agglomerative clustering.
//!
//! Bottom-up: start with each item as its own cluster, repeatedly merge
//! the two closest clusters until one remains. The merge history forms a
//! **dendrogram**: a binary tree you can cut at any height to get k clusters.
//!
//! ## Components
//!
//! ```text
//! DistanceMatrix ──▶ DistanceStore ──▶ closest_pair ──▶ Clusterer ──▶ Dendrogram
//!                                                         │
//!                                                  Linkage::update
//! ```
//!
//! - [`DistanceStore`]: distances between *active* clusters, addressed by id
//! - [`Linkage`]: the Lance–Williams update applied after every merge
//! - [`closest_pair`]: minimum-distance pair, ties to the smallest `(a, b)`
//! - [`Clusterer`]: the single-use merge loop
//! - [`HierarchicalClustering`]: Euclidean front end for point data
//!
//! **Linkage methods** determine "distance between clusters":
//!
//! | Linkage | Distance | Effect |
//! |---------|----------|--------|
//! | Single | min(pairwise) | Chaining; elongated clusters |
//! | Complete | max(pairwise) | Compact, spherical clusters |
//! | Average | mean(pairwise) | Balanced compromise |
//!
//! ## Determinism
//!
//! Given the same distances and linkage, the merge sequence is bit-identical
//! across runs and with or without the `parallel` feature: pair selection
//! uses an explicit tie-break, and parallel recomputation only changes where
//! each independent update is computed, not its value.
//!
//! ## Usage
//!
//! ```rust
//! use hclust::cluster::{Clustering, HierarchicalClustering, Linkage};
//!
//! let data = vec![
//!     vec![0.0, 0.0],
//!     vec![0.1, 0.1],
//!     vec![10.0, 10.0],
//!     vec![10.1, 10.1],
//! ];
//!
//! let labels = HierarchicalClustering::new(2)
//!     .with_linkage(Linkage::Complete)
//!     .fit_predict(&data)
//!     .unwrap();
//! assert_eq!(labels, vec![0, 0, 1, 1]);
//! ```

mod engine;
mod hierarchical;
mod linkage;
mod selector;
mod store;
mod traits;

pub use engine::{Clusterer, EngineState};
pub use hierarchical::HierarchicalClustering;
pub use linkage::Linkage;
pub use selector::{closest_pair, MergeCandidate};
pub use store::DistanceStore;
pub use traits::Clustering;
