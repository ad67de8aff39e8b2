//! Dendrogram for hierarchical clustering.
//!
//! A dendrogram is the ordered record of merges produced by agglomerative
//! clustering. Cluster ids follow the SciPy convention: items are `0..n`, the
//! `i`-th merge creates cluster `n + i`, and the last merge creates the root.

use std::sync::OnceLock;

use super::foundations::cophenetic_matrix;
use super::union_find::UnionFind;
use super::validate::{validate_linkage_table, ValidationReport};
use crate::error::{Error, Result};

/// A dendrogram representing hierarchical cluster merges.
///
/// Each merge combines two clusters into one, recording:
/// - Which clusters were merged
/// - The id of the cluster it created
/// - The distance at which they merged
/// - The size of the resulting cluster
#[derive(Debug, Clone)]
pub struct Dendrogram {
    merges: Vec<Merge>,
    n_items: usize,
    /// Member items per cluster id, filled on first request.
    members: Vec<OnceLock<Vec<usize>>>,
}

/// A single merge operation in the dendrogram.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Merge {
    /// First cluster being merged (lower id).
    pub cluster_a: usize,
    /// Second cluster being merged (higher id).
    pub cluster_b: usize,
    /// Id of the cluster this merge created.
    pub cluster: usize,
    /// Distance at which the merge occurred.
    pub distance: f64,
    /// Size of the resulting cluster.
    pub size: usize,
}

/// One node of the dendrogram, leaf or internal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cluster {
    /// Cluster id.
    pub id: usize,
    /// Number of items it covers.
    pub size: usize,
    /// The two clusters it was formed from; `None` for items.
    pub children: Option<(usize, usize)>,
    /// Height it was formed at; `0.0` for items.
    pub height: f64,
}

impl Cluster {
    /// Singleton cluster for item `id`.
    pub fn leaf(id: usize) -> Self {
        Self {
            id,
            size: 1,
            children: None,
            height: 0.0,
        }
    }

    /// Whether this is an original item.
    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }
}

/// Row of a linkage table: `(cluster_a, cluster_b, distance, size)`.
///
/// Row `i` creates cluster `n + i`, so the table is the same information as a
/// SciPy linkage matrix `Z`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LinkageRow {
    /// First merged cluster.
    pub cluster_a: usize,
    /// Second merged cluster.
    pub cluster_b: usize,
    /// Merge height.
    pub distance: f64,
    /// Items in the merged cluster.
    pub size: usize,
}

impl LinkageRow {
    /// As a `[a, b, distance, size]` row of floats.
    pub fn to_array(self) -> [f64; 4] {
        [
            self.cluster_a as f64,
            self.cluster_b as f64,
            self.distance,
            self.size as f64,
        ]
    }
}

impl PartialEq for Dendrogram {
    fn eq(&self, other: &Self) -> bool {
        self.n_items == other.n_items && self.merges == other.merges
    }
}

impl Dendrogram {
    pub(crate) fn from_merges(n_items: usize, merges: Vec<Merge>) -> Self {
        debug_assert_eq!(merges.len() + 1, n_items);
        Self {
            members: (0..n_items + merges.len()).map(|_| OnceLock::new()).collect(),
            merges,
            n_items,
        }
    }

    /// Rebuild a dendrogram from an exported linkage table.
    ///
    /// The table must pass [`validate_linkage_table`] without errors: `n - 1`
    /// rows, each consuming two distinct, earlier, not-yet-merged clusters
    /// with the right combined size and non-decreasing heights.
    pub fn from_linkage_table(n_items: usize, rows: &[LinkageRow]) -> Result<Self> {
        if n_items < 2 {
            return Err(Error::TooFewItems { n_items });
        }
        let report = validate_linkage_table(n_items, rows);
        if let Some(issue) = report.first_problem() {
            return Err(Error::parameter("linkage_table", issue.to_string()));
        }

        let merges = rows
            .iter()
            .enumerate()
            .map(|(i, r)| Merge {
                cluster_a: r.cluster_a.min(r.cluster_b),
                cluster_b: r.cluster_a.max(r.cluster_b),
                cluster: n_items + i,
                distance: r.distance,
                size: r.size,
            })
            .collect();
        Ok(Self::from_merges(n_items, merges))
    }

    /// Number of original items.
    pub fn n_items(&self) -> usize {
        self.n_items
    }

    /// Number of merges recorded (`n_items - 1`).
    pub fn n_merges(&self) -> usize {
        self.merges.len()
    }

    /// Iterate over merges in creation order.
    pub fn merges(&self) -> impl Iterator<Item = &Merge> {
        self.merges.iter()
    }

    /// Merges as a slice.
    pub fn as_slice(&self) -> &[Merge] {
        &self.merges
    }

    /// Get the merge heights, in merge order.
    pub fn heights(&self) -> Vec<f64> {
        self.merges.iter().map(|m| m.distance).collect()
    }

    /// Id of the root cluster.
    pub fn root(&self) -> usize {
        self.n_items + self.merges.len() - 1
    }

    /// Look up any cluster, leaf or internal.
    pub fn cluster(&self, id: usize) -> Option<Cluster> {
        if id < self.n_items {
            return Some(Cluster::leaf(id));
        }
        self.merges.get(id - self.n_items).map(|m| Cluster {
            id,
            size: m.size,
            children: Some((m.cluster_a, m.cluster_b)),
            height: m.distance,
        })
    }

    /// Items covered by cluster `id`, ascending.
    pub fn members(&self, id: usize) -> Option<&[usize]> {
        let cell = self.members.get(id)?;
        Some(cell.get_or_init(|| self.collect_members(id)))
    }

    fn collect_members(&self, id: usize) -> Vec<usize> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(c) = stack.pop() {
            if c < self.n_items {
                out.push(c);
            } else if let Some(known) = self.members[c].get() {
                out.extend_from_slice(known);
            } else {
                let m = &self.merges[c - self.n_items];
                stack.push(m.cluster_b);
                stack.push(m.cluster_a);
            }
        }
        out.sort_unstable();
        out
    }

    /// Items in left-to-right plotting order, descending from the root with
    /// `cluster_a` drawn before `cluster_b`.
    pub fn leaves(&self) -> Vec<usize> {
        let mut order = Vec::with_capacity(self.n_items);
        let mut stack = vec![self.root()];
        while let Some(c) = stack.pop() {
            if c < self.n_items {
                order.push(c);
            } else {
                let m = &self.merges[c - self.n_items];
                stack.push(m.cluster_b);
                stack.push(m.cluster_a);
            }
        }
        order
    }

    /// Export as a linkage table.
    pub fn linkage_table(&self) -> Vec<LinkageRow> {
        self.merges
            .iter()
            .map(|m| LinkageRow {
                cluster_a: m.cluster_a,
                cluster_b: m.cluster_b,
                distance: m.distance,
                size: m.size,
            })
            .collect()
    }

    /// Label items after replaying the first `n_merges` merges.
    fn labels_after(&self, n_merges: usize) -> Vec<usize> {
        replay(self.n_items, &self.merges[..n_merges])
    }

    /// Cut the tree into exactly `k` clusters.
    ///
    /// Applies the first `n - k` merges. Returns one label per item, in
    /// `[0, k)`, numbered by first appearance (item 0 is always label 0).
    pub fn cut_by_count(&self, k: usize) -> Result<Vec<usize>> {
        if k == 0 || k > self.n_items {
            return Err(Error::InvalidClusterCount {
                requested: k,
                n_items: self.n_items,
            });
        }
        Ok(self.labels_after(self.n_items - k))
    }

    /// Get cluster assignments at a given distance threshold.
    ///
    /// All merges with distance `<= threshold` are applied; the rest are cut.
    pub fn cut_by_threshold(&self, threshold: f64) -> Result<Vec<usize>> {
        if threshold.is_nan() {
            return Err(Error::parameter("threshold", "threshold must not be NaN"));
        }
        let applied = self
            .merges
            .iter()
            .take_while(|m| m.distance <= threshold)
            .count();
        Ok(self.labels_after(applied))
    }

    /// Cophenetic distance between every pair of items.
    pub fn cophenetic(&self) -> Vec<Vec<f64>> {
        cophenetic_matrix(self)
    }

    /// Structural health check of this dendrogram.
    pub fn health_check(&self) -> ValidationReport {
        validate_linkage_table(self.n_items, &self.linkage_table())
    }
}

/// Replay merges over `n_items` singletons and label the resulting groups.
pub(crate) fn replay(n_items: usize, merges: &[Merge]) -> Vec<usize> {
    let mut uf = UnionFind::new(n_items);
    // Any one item of each cluster id stands in for the whole cluster.
    let mut representative: Vec<usize> = (0..n_items).collect();
    for m in merges {
        let (ra, rb) = (representative[m.cluster_a], representative[m.cluster_b]);
        uf.union(ra, rb);
        representative.push(ra);
    }
    uf.labels()
}
