//! Distances between the currently active clusters.
//!
//! Cluster ids run `0..2n-1` over a whole run, but at most `n` clusters are
//! ever active at once. The store keeps one condensed `n x n` triangle over
//! physical *slots* and maps ids onto slots. A retired cluster frees its slot;
//! the next activated cluster takes a free slot over. Ids stay stable, lookups
//! stay O(1), and memory stays at `n(n-1)/2` distances.

use crate::distance::{condensed_index, DistanceMatrix};
use crate::error::{Error, Result};

/// Pairwise distances between active clusters, addressed by cluster id.
#[derive(Debug, Clone)]
pub struct DistanceStore {
    n_slots: usize,
    table: Vec<f64>,
    /// Cluster id -> slot, for active ids only. Sized `2n - 1`.
    slot_of: Vec<Option<usize>>,
    /// Ids that have ever been activated. Sized `2n - 1`.
    used: Vec<bool>,
    /// Active ids, ascending.
    active: Vec<usize>,
    free_slots: Vec<usize>,
}

impl DistanceStore {
    /// Start with every item of `matrix` active as a singleton cluster.
    pub fn new(matrix: DistanceMatrix) -> Self {
        let n = matrix.n_items();
        let capacity = 2 * n - 1;

        let mut slot_of = vec![None; capacity];
        let mut used = vec![false; capacity];
        for id in 0..n {
            slot_of[id] = Some(id);
            used[id] = true;
        }

        Self {
            n_slots: n,
            table: matrix.into_condensed(),
            slot_of,
            used,
            active: (0..n).collect(),
            free_slots: Vec::with_capacity(2),
        }
    }

    /// Largest number of cluster ids a run over these items can create.
    pub fn capacity(&self) -> usize {
        self.slot_of.len()
    }

    /// Number of active clusters.
    pub fn n_active(&self) -> usize {
        self.active.len()
    }

    /// Active cluster ids in ascending order.
    pub fn active_ids(&self) -> &[usize] {
        &self.active
    }

    /// Whether `id` is currently active.
    pub fn is_active(&self, id: usize) -> bool {
        self.slot_of.get(id).is_some_and(Option::is_some)
    }

    fn slot(&self, id: usize) -> Result<usize> {
        self.slot_of
            .get(id)
            .copied()
            .flatten()
            .ok_or(Error::InvalidCluster { id })
    }

    fn index(&self, a: usize, b: usize) -> Result<usize> {
        let (sa, sb) = (self.slot(a)?, self.slot(b)?);
        match sa.cmp(&sb) {
            std::cmp::Ordering::Less => Ok(condensed_index(self.n_slots, sa, sb)),
            std::cmp::Ordering::Greater => Ok(condensed_index(self.n_slots, sb, sa)),
            // Only reachable with a == b.
            std::cmp::Ordering::Equal => Err(Error::InvalidCluster { id: b }),
        }
    }

    /// Current distance between two distinct active clusters.
    pub fn get(&self, a: usize, b: usize) -> Result<f64> {
        let d = self.table[self.index(a, b)?];
        debug_assert!(!d.is_nan(), "read of unset distance ({a}, {b})");
        Ok(d)
    }

    /// Overwrite the distance between two distinct active clusters.
    pub fn set_distance(&mut self, a: usize, b: usize, value: f64) -> Result<()> {
        let k = self.index(a, b)?;
        self.table[k] = value;
        Ok(())
    }

    /// Remove `id` from the active set and drop all of its entries.
    pub fn retire(&mut self, id: usize) -> Result<()> {
        let slot = self.slot(id)?;
        self.slot_of[id] = None;
        if let Ok(pos) = self.active.binary_search(&id) {
            let _ = self.active.remove(pos);
        }

        for other in 0..self.n_slots {
            let k = match other.cmp(&slot) {
                std::cmp::Ordering::Less => condensed_index(self.n_slots, other, slot),
                std::cmp::Ordering::Greater => condensed_index(self.n_slots, slot, other),
                std::cmp::Ordering::Equal => continue,
            };
            self.table[k] = f64::NAN;
        }

        self.free_slots.push(slot);
        Ok(())
    }

    /// Activate a never-before-used id. Its distances must then be written
    /// with [`set_distance`](Self::set_distance) before they are read.
    pub fn activate(&mut self, id: usize) -> Result<()> {
        if id >= self.capacity() || self.used[id] {
            return Err(Error::InvalidCluster { id });
        }
        let slot = self.free_slots.pop().ok_or(Error::InvalidCluster { id })?;
        self.slot_of[id] = Some(slot);
        self.used[id] = true;
        match self.active.last() {
            Some(&last) if last > id => {
                let pos = self.active.partition_point(|&x| x < id);
                self.active.insert(pos, id);
            }
            _ => self.active.push(id),
        }
        Ok(())
    }
}
