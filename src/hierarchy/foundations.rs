//! Ultrametric view of a dendrogram.
//!
//! # Ultrametric Spaces
//!
//! An ultrametric satisfies a stronger triangle inequality:
//!
//! ```text
//! d(x, z) <= max(d(x, y), d(y, z))   (ultrametric inequality)
//! ```
//!
//! A finite metric space is ultrametric if and only if it is the leaf-to-leaf
//! "height of lowest common ancestor" distance of some rooted tree. A
//! dendrogram with non-decreasing heights is such a tree:
//!
//! ```text
//! Dendrogram                 Cophenetic distances
//! ----------                 --------------------
//!      *  (height=3)         d(a,d) = 3
//!     / \                    d(b,c) = 2
//!    *   d                   d(a,b) = 1
//!   / \                      d(a,c) = 2
//!  *   c                     d(c,d) = 3
//! / \                        d(b,d) = 3
//! a   b
//! ```
//!
//! ## Subdominant Ultrametric
//!
//! Given any metric d, the **subdominant ultrametric** u* is the largest
//! ultrametric that is pointwise <= d:
//!
//! ```text
//! u*(x, y) = min over all paths x = v0, v1, ..., vk = y of max{d(vi, vi+1)}
//! ```
//!
//! This is exactly the cophenetic distance of single linkage.
//!
//! # References
//!
//! - Carlsson & Mémoli (2010): "Characterization, Stability and Convergence
//!   of Hierarchical Clustering Methods"

use super::Dendrogram;

/// Parent pointers and heights of a dendrogram, for ancestor queries.
#[derive(Debug, Clone)]
pub struct UltrametricTree {
    /// Parent of each cluster id; `None` for the root.
    parents: Vec<Option<usize>>,
    /// Height of each cluster id (0 for items).
    heights: Vec<f64>,
    num_leaves: usize,
}

impl UltrametricTree {
    /// Build from a dendrogram.
    pub fn from_dendrogram(dendrogram: &Dendrogram) -> Self {
        let n_leaves = dendrogram.n_items();
        let n_total = n_leaves + dendrogram.n_merges();

        let mut parents = vec![None; n_total];
        let mut heights = vec![0.0f64; n_total];
        for m in dendrogram.merges() {
            parents[m.cluster_a] = Some(m.cluster);
            parents[m.cluster_b] = Some(m.cluster);
            heights[m.cluster] = m.distance;
        }

        Self {
            parents,
            heights,
            num_leaves: n_leaves,
        }
    }

    /// Lowest common ancestor of two cluster ids.
    ///
    /// Parents always have larger ids than their children, so walking up
    /// whichever side is smaller meets at the LCA.
    pub fn lca(&self, mut a: usize, mut b: usize) -> usize {
        while a != b {
            let lower = if a < b { &mut a } else { &mut b };
            match self.parents[*lower] {
                Some(p) => *lower = p,
                None => break,
            }
        }
        a.max(b)
    }

    /// Cophenetic distance: height of the LCA.
    pub fn distance(&self, a: usize, b: usize) -> f64 {
        if a == b {
            return 0.0;
        }
        self.heights[self.lca(a, b)]
    }

    /// Items within cophenetic distance `radius` of item `center`.
    ///
    /// Due to the ultrametric property, such balls are either disjoint or one
    /// contains the other.
    pub fn ball(&self, center: usize, radius: f64) -> Vec<usize> {
        let mut top = center;
        while let Some(p) = self.parents[top] {
            if self.heights[p] > radius {
                break;
            }
            top = p;
        }

        let mut out = Vec::new();
        let mut stack = vec![top];
        while let Some(c) = stack.pop() {
            if c < self.num_leaves {
                out.push(c);
            } else {
                stack.extend(
                    self.parents
                        .iter()
                        .enumerate()
                        .filter(|(_, p)| **p == Some(c))
                        .map(|(child, _)| child),
                );
            }
        }
        out.sort_unstable();
        out
    }

    /// Height of a cluster id.
    pub fn height(&self, node: usize) -> f64 {
        self.heights.get(node).copied().unwrap_or(0.0)
    }

    /// Number of leaf nodes.
    pub fn num_leaves(&self) -> usize {
        self.num_leaves
    }
}

/// Full `n x n` cophenetic distance matrix of a dendrogram.
///
/// Each merge at height h sets the distance between every item of one side
/// and every item of the other to h, which touches each item pair exactly
/// once: O(n²) overall.
pub fn cophenetic_matrix(dendrogram: &Dendrogram) -> Vec<Vec<f64>> {
    let n = dendrogram.n_items();
    let mut out = vec![vec![0.0; n]; n];
    for m in dendrogram.merges() {
        let (Some(left), Some(right)) = (
            dendrogram.members(m.cluster_a),
            dendrogram.members(m.cluster_b),
        ) else {
            continue;
        };
        for &x in left {
            for &y in right {
                out[x][y] = m.distance;
                out[y][x] = m.distance;
            }
        }
    }
    out
}

/// Compute subdominant ultrametric from a distance matrix.
///
/// u*(i, j) = min over all paths i -> j of max edge weight, via a
/// Floyd-Warshall variant for minimax paths. O(n³).
pub fn subdominant_ultrametric(distances: &[Vec<f64>]) -> Vec<Vec<f64>> {
    let n = distances.len();
    let mut u = distances.to_vec();

    for k in 0..n {
        for i in 0..n {
            for j in 0..n {
                let path_through_k = u[i][k].max(u[k][j]);
                if path_through_k < u[i][j] {
                    u[i][j] = path_through_k;
                }
            }
        }
    }

    u
}

/// Verify a distance matrix satisfies the ultrametric inequality.
pub fn is_ultrametric(distances: &[Vec<f64>], tolerance: f64) -> bool {
    let n = distances.len();
    for i in 0..n {
        for j in 0..n {
            for k in 0..n {
                if distances[i][k] > distances[i][j].max(distances[j][k]) + tolerance {
                    return false;
                }
            }
        }
    }
    true
}
