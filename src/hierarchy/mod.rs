//! The merge tree and what can be read off it.
//!
//! ## [`Dendrogram`] - Agglomerative Clustering
//!
//! Records complete merge history from hierarchical clustering:
//!
//! ```text
//!         6 (height=1.0)
//!        / \
//!       4   5 (height=0.7)
//!      / \ / \
//!     0  1 2  3 (leaves)
//! ```
//!
//! Key property: "cut" at any height to get any number of clusters.
//!
//! | Question | Method |
//! |----------|--------|
//! | Exactly k groups | [`Dendrogram::cut_by_count`] |
//! | Groups closer than t | [`Dendrogram::cut_by_threshold`] |
//! | Which items are in cluster c | [`Dendrogram::members`] |
//! | Plotting order | [`Dendrogram::leaves`] |
//! | Export for plotting tools | [`Dendrogram::linkage_table`] |
//! | Tree distance between items | [`cophenetic_matrix`], [`UltrametricTree`] |
//! | Is this table a valid tree | [`validate_linkage_table`] |

mod dendrogram;
pub mod foundations;
mod union_find;
mod validate;

pub use dendrogram::{Cluster, Dendrogram, LinkageRow, Merge};
pub(crate) use dendrogram::replay;
pub use foundations::{cophenetic_matrix, is_ultrametric, subdominant_ultrametric, UltrametricTree};
pub use validate::{validate_linkage_table, Severity, ValidationIssue, ValidationReport};
