//! The agglomeration loop.
//!
//! ```text
//!   Ready ──run()──▶ Active ◀──────┐
//!                      │           │
//!                      ▼           │
//!                   Merging ───────┘   (while ≥ 2 clusters remain)
//!                      │
//!                      ▼
//!                    Done             (dendrogram frozen)
//! ```
//!
//! Each merge depends on the exact outcome of the previous one, so the loop is
//! strictly sequential. Within a merge, the distances from the new cluster to
//! every other active cluster are independent; with the `parallel` feature they
//! are computed on the rayon pool and then written back by the engine alone.

use std::fmt;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use super::linkage::Linkage;
use super::selector::{closest_pair, MergeCandidate};
use super::store::DistanceStore;
use crate::distance::DistanceMatrix;
use crate::error::{Error, Result};
use crate::hierarchy::{replay, Cluster, Dendrogram, Merge};

/// Lifecycle of a [`Clusterer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EngineState {
    /// Singletons initialized, nothing merged.
    Ready,
    /// Selecting the next pair.
    Active,
    /// Applying one merge.
    Merging,
    /// One cluster left; dendrogram available.
    Done,
    /// Stopped at a requested cluster count; no full dendrogram.
    Stopped,
}

impl fmt::Display for EngineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EngineState::Ready => "ready",
            EngineState::Active => "active",
            EngineState::Merging => "merging",
            EngineState::Done => "done",
            EngineState::Stopped => "stopped early",
        };
        f.write_str(s)
    }
}

/// Single-use agglomerative clustering engine.
///
/// Owns the distance store and the cluster arena for the whole run. A
/// `Clusterer` runs exactly once; build a new one for another run.
///
/// ```rust
/// use hclust::{Clusterer, DistanceMatrix, Linkage};
///
/// let m = DistanceMatrix::from_square(&[
///     [0.0, 2.0, 6.0, 10.0],
///     [2.0, 0.0, 5.0, 9.0],
///     [6.0, 5.0, 0.0, 4.0],
///     [10.0, 9.0, 4.0, 0.0],
/// ])
/// .unwrap();
///
/// let mut engine = Clusterer::new(m, Linkage::Average).unwrap();
/// let dendro = engine.run().unwrap();
/// assert_eq!(dendro.heights(), vec![2.0, 4.0, 7.5]);
/// assert_eq!(engine.cut_by_count(2).unwrap(), vec![0, 0, 1, 1]);
/// ```
#[derive(Debug, Clone)]
pub struct Clusterer {
    linkage: Linkage,
    n_items: usize,
    store: DistanceStore,
    /// Every cluster created so far, indexed by id.
    clusters: Vec<Cluster>,
    merges: Vec<Merge>,
    state: EngineState,
    dendrogram: Option<Dendrogram>,
}

impl Clusterer {
    /// Set up a run over `distances` with the given linkage.
    pub fn new(distances: DistanceMatrix, linkage: Linkage) -> Result<Self> {
        let n_items = distances.n_items();
        if n_items < 2 {
            return Err(Error::TooFewItems { n_items });
        }

        let mut clusters = Vec::with_capacity(2 * n_items - 1);
        clusters.extend((0..n_items).map(Cluster::leaf));

        Ok(Self {
            linkage,
            n_items,
            store: DistanceStore::new(distances),
            clusters,
            merges: Vec::with_capacity(n_items - 1),
            state: EngineState::Ready,
            dendrogram: None,
        })
    }

    /// Set up a run from a distance callback.
    pub fn from_fn<F>(n_items: usize, dist: F, linkage: Linkage) -> Result<Self>
    where
        F: FnMut(usize, usize) -> f64,
    {
        Self::new(DistanceMatrix::from_fn(n_items, dist)?, linkage)
    }

    /// Current state.
    pub fn state(&self) -> EngineState {
        self.state
    }

    /// Linkage used for this run.
    pub fn linkage(&self) -> Linkage {
        self.linkage
    }

    /// Number of input items.
    pub fn n_items(&self) -> usize {
        self.n_items
    }

    /// Number of currently active clusters.
    pub fn n_active(&self) -> usize {
        self.store.n_active()
    }

    /// Current distance between two active clusters.
    pub fn distance(&self, a: usize, b: usize) -> Result<f64> {
        self.store.get(a, b)
    }

    /// Merge until one cluster remains and return the dendrogram.
    pub fn run(&mut self) -> Result<Dendrogram> {
        self.expect_ready("run")?;
        tracing::debug!(
            n_items = self.n_items,
            linkage = %self.linkage,
            "starting agglomeration"
        );

        while self.store.n_active() > 1 {
            self.merge_closest()?;
        }

        let dendrogram = Dendrogram::from_merges(self.n_items, std::mem::take(&mut self.merges));
        tracing::debug!(
            n_merges = dendrogram.n_merges(),
            root_height = dendrogram.merges().last().map_or(0.0, |m| m.distance),
            "agglomeration finished"
        );
        self.state = EngineState::Done;
        self.dendrogram = Some(dendrogram.clone());
        Ok(dendrogram)
    }

    /// Merge only until `k` clusters remain and return the item labels.
    ///
    /// Skips the remaining `k - 1` merges. The engine ends in
    /// [`EngineState::Stopped`], without a dendrogram.
    pub fn run_to_count(&mut self, k: usize) -> Result<Vec<usize>> {
        if k == 0 || k > self.n_items {
            return Err(Error::InvalidClusterCount {
                requested: k,
                n_items: self.n_items,
            });
        }
        self.expect_ready("run")?;
        tracing::debug!(
            n_items = self.n_items,
            linkage = %self.linkage,
            target = k,
            "starting agglomeration with early stop"
        );

        while self.store.n_active() > k {
            self.merge_closest()?;
        }

        self.state = EngineState::Stopped;
        Ok(replay(self.n_items, &self.merges))
    }

    /// The finished dendrogram.
    pub fn dendrogram(&self) -> Result<&Dendrogram> {
        self.dendrogram.as_ref().ok_or(Error::InvalidState {
            operation: "read the dendrogram",
            state: self.state,
        })
    }

    /// [`Dendrogram::cut_by_count`] on the finished run.
    pub fn cut_by_count(&self, k: usize) -> Result<Vec<usize>> {
        self.finished("cut")?.cut_by_count(k)
    }

    /// [`Dendrogram::cut_by_threshold`] on the finished run.
    pub fn cut_by_threshold(&self, threshold: f64) -> Result<Vec<usize>> {
        self.finished("cut")?.cut_by_threshold(threshold)
    }

    fn finished(&self, operation: &'static str) -> Result<&Dendrogram> {
        self.dendrogram.as_ref().ok_or(Error::InvalidState {
            operation,
            state: self.state,
        })
    }

    fn expect_ready(&self, operation: &'static str) -> Result<()> {
        if self.state != EngineState::Ready {
            return Err(Error::InvalidState {
                operation,
                state: self.state,
            });
        }
        Ok(())
    }

    /// One Active -> Merging -> Active round.
    fn merge_closest(&mut self) -> Result<()> {
        self.state = EngineState::Active;
        let Some(MergeCandidate {
            cluster_a: a,
            cluster_b: b,
            distance: height,
        }) = closest_pair(&self.store)
        else {
            return Err(Error::InvalidState {
                operation: "select a merge",
                state: self.state,
            });
        };

        self.state = EngineState::Merging;
        let id = self.clusters.len();
        let (size_a, size_b) = (self.clusters[a].size, self.clusters[b].size);

        let targets: Vec<usize> = self
            .store
            .active_ids()
            .iter()
            .copied()
            .filter(|&c| c != a && c != b)
            .collect();
        let updated = self.recompute(a, b, size_a, size_b, &targets)?;

        self.store.retire(a)?;
        self.store.retire(b)?;
        self.store.activate(id)?;
        for (&c, d) in targets.iter().zip(updated) {
            self.store.set_distance(id, c, d)?;
        }

        let size = size_a + size_b;
        self.clusters.push(Cluster {
            id,
            size,
            children: Some((a, b)),
            height,
        });
        self.merges.push(Merge {
            cluster_a: a,
            cluster_b: b,
            cluster: id,
            distance: height,
            size,
        });
        tracing::trace!(a, b, id, height, size, "merged");

        self.state = EngineState::Active;
        Ok(())
    }

    /// Linkage distances from `a ∪ b` to each target, in target order.
    #[cfg(not(feature = "parallel"))]
    fn recompute(
        &self,
        a: usize,
        b: usize,
        size_a: usize,
        size_b: usize,
        targets: &[usize],
    ) -> Result<Vec<f64>> {
        targets
            .iter()
            .map(|&c| {
                let (d_ac, d_bc) = (self.store.get(a, c)?, self.store.get(b, c)?);
                Ok(self.linkage.update(d_ac, d_bc, size_a, size_b))
            })
            .collect()
    }

    /// Linkage distances from `a ∪ b` to each target, in target order.
    #[cfg(feature = "parallel")]
    fn recompute(
        &self,
        a: usize,
        b: usize,
        size_a: usize,
        size_b: usize,
        targets: &[usize],
    ) -> Result<Vec<f64>> {
        let store = &self.store;
        let linkage = self.linkage;
        targets
            .par_iter()
            .map(|&c| {
                let (d_ac, d_bc) = (store.get(a, c)?, store.get(b, c)?);
                Ok(linkage.update(d_ac, d_bc, size_a, size_b))
            })
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn scenario(linkage: Linkage) -> Clusterer {
        let m = DistanceMatrix::from_condensed(4, vec![2.0, 6.0, 10.0, 5.0, 9.0, 4.0]).unwrap();
        Clusterer::new(m, linkage).unwrap()
    }

    #[test]
    fn lifecycle() {
        let mut engine = scenario(Linkage::Single);
        assert_eq!(engine.state(), EngineState::Ready);
        assert_eq!(engine.n_active(), 4);
        assert_eq!(engine.distance(0, 3).unwrap(), 10.0);

        let err = engine.cut_by_count(2).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::State);
        assert!(engine.dendrogram().is_err());

        let d = engine.run().unwrap();
        assert_eq!(engine.state(), EngineState::Done);
        assert_eq!(engine.n_active(), 1);
        assert_eq!(engine.dendrogram().unwrap(), &d);

        let err = engine.run().unwrap_err();
        assert_eq!(
            err,
            Error::InvalidState {
                operation: "run",
                state: EngineState::Done
            }
        );
    }

    #[test]
    fn new_cluster_ids_are_sequential() {
        let mut engine = scenario(Linkage::Complete);
        let d = engine.run().unwrap();
        let ids: Vec<usize> = d.merges().map(|m| m.cluster).collect();
        assert_eq!(ids, vec![4, 5, 6]);
        let pairs: Vec<(usize, usize)> = d.merges().map(|m| (m.cluster_a, m.cluster_b)).collect();
        assert_eq!(pairs, vec![(0, 1), (2, 3), (4, 5)]);
    }

    #[test]
    fn retired_clusters_are_invalid_after_run() {
        let mut engine = scenario(Linkage::Average);
        let _ = engine.run().unwrap();
        let err = engine.distance(0, 1).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidCluster);
    }

    #[test]
    fn early_stop_labels_and_state() {
        let mut engine = scenario(Linkage::Single);
        let labels = engine.run_to_count(2).unwrap();
        assert_eq!(labels, vec![0, 0, 1, 1]);
        assert_eq!(engine.state(), EngineState::Stopped);
        assert_eq!(engine.n_active(), 2);
        // Remaining clusters still carry their linkage distance.
        assert_eq!(engine.distance(4, 5).unwrap(), 5.0);

        assert_eq!(engine.cut_by_threshold(1.0).unwrap_err().kind(), ErrorKind::State);
        assert_eq!(engine.run().unwrap_err().kind(), ErrorKind::State);
    }

    #[test]
    fn early_stop_validates_count() {
        let mut engine = scenario(Linkage::Single);
        assert!(matches!(
            engine.run_to_count(0),
            Err(Error::InvalidClusterCount { requested: 0, .. })
        ));
        assert!(engine.run_to_count(5).is_err());
        // Nothing ran, so a full run is still allowed.
        assert_eq!(engine.state(), EngineState::Ready);
        assert_eq!(engine.run_to_count(4).unwrap(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn two_items() {
        let mut engine = Clusterer::from_fn(2, |i, j| if i == j { 0.0 } else { 3.0 }, Linkage::Average)
            .unwrap();
        let d = engine.run().unwrap();
        assert_eq!(d.n_merges(), 1);
        assert_eq!(d.as_slice()[0].distance, 3.0);
        assert_eq!(d.as_slice()[0].size, 2);
    }

    #[test]
    fn too_few_items() {
        let err = Clusterer::from_fn(1, |_, _| 0.0, Linkage::Single).unwrap_err();
        assert_eq!(err, Error::TooFewItems { n_items: 1 });
    }

    #[test]
    fn state_display() {
        assert_eq!(EngineState::Merging.to_string(), "merging");
        assert_eq!(EngineState::Stopped.to_string(), "stopped early");
    }
}
