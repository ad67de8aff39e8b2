//! Linkage criteria as Lance–Williams updates.
//!
//! When clusters A and B merge, the distance from the new cluster to any
//! other active cluster C is computed from the two pre-merge distances and the
//! cluster sizes alone. Raw item-level distances are never revisited.
//!
//! | Linkage | Update | Effect |
//! |---------|--------|--------|
//! | Single | `min(d(A,C), d(B,C))` | Chaining; elongated clusters |
//! | Complete | `max(d(A,C), d(B,C))` | Compact, spherical clusters |
//! | Average | `(|A|·d(A,C) + |B|·d(B,C)) / (|A|+|B|)` | Balanced compromise (UPGMA) |
//!
//! Every update lies within `[min(d(A,C), d(B,C)), max(d(A,C), d(B,C))]`, so
//! no new distance can drop below the height just merged at. That is what
//! makes the merge heights non-decreasing.

use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Linkage method for hierarchical clustering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Linkage {
    /// Single linkage: minimum distance between clusters.
    Single,
    /// Complete linkage: maximum distance between clusters.
    Complete,
    /// Average linkage: mean distance over all cross-cluster item pairs (UPGMA).
    #[default]
    Average,
}

impl Linkage {
    /// All supported methods.
    pub const ALL: [Linkage; 3] = [Linkage::Single, Linkage::Complete, Linkage::Average];

    /// Distance from `A ∪ B` to `C`.
    ///
    /// `d_ac` and `d_bc` are the current distances from the two merging
    /// clusters to `C`; `size_a` and `size_b` are their item counts.
    #[inline]
    pub fn update(self, d_ac: f64, d_bc: f64, size_a: usize, size_b: usize) -> f64 {
        match self {
            Linkage::Single => d_ac.min(d_bc),
            Linkage::Complete => d_ac.max(d_bc),
            Linkage::Average => {
                if d_ac == d_bc {
                    return d_ac;
                }
                let (wa, wb) = (size_a as f64, size_b as f64);
                let mean = (wa * d_ac + wb * d_bc) / (wa + wb);
                // Rounding must not push the mean outside its inputs.
                mean.clamp(d_ac.min(d_bc), d_ac.max(d_bc))
            }
        }
    }

    /// Lowercase name.
    pub fn name(self) -> &'static str {
        match self {
            Linkage::Single => "single",
            Linkage::Complete => "complete",
            Linkage::Average => "average",
        }
    }
}

impl fmt::Display for Linkage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Linkage {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "single" | "min" => Ok(Linkage::Single),
            "complete" | "max" => Ok(Linkage::Complete),
            "average" | "mean" | "upgma" => Ok(Linkage::Average),
            other => Err(Error::parameter(
                "linkage",
                format!("unknown linkage method '{other}'"),
            )),
        }
    }
}
