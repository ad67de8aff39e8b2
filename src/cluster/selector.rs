//! Choosing the next pair to merge.

use super::store::DistanceStore;

/// The closest active pair, `cluster_a < cluster_b`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MergeCandidate {
    /// Lower id.
    pub cluster_a: usize,
    /// Higher id.
    pub cluster_b: usize,
    /// Their current distance.
    pub distance: f64,
}

/// Find the active pair at minimum distance.
///
/// Pairs are scanned in lexicographic `(a, b)` order and only a strictly
/// smaller distance replaces the current best, so among equal minima the
/// lexicographically smallest pair wins. O(k²) for `k` active clusters.
///
/// Returns `None` when fewer than two clusters are active.
pub fn closest_pair(store: &DistanceStore) -> Option<MergeCandidate> {
    let ids = store.active_ids();
    let mut best: Option<MergeCandidate> = None;

    for (x, &a) in ids.iter().enumerate() {
        for &b in &ids[x + 1..] {
            // Both ids come from the active list.
            let Ok(distance) = store.get(a, b) else {
                continue;
            };
            if best.map_or(true, |c| distance < c.distance) {
                best = Some(MergeCandidate {
                    cluster_a: a,
                    cluster_b: b,
                    distance,
                });
            }
        }
    }

    best
}
