//! Validated pairwise distances between items.
//!
//! Every clustering run starts from a [`DistanceMatrix`]: a symmetric,
//! non-negative table with a zero diagonal, stored condensed (upper triangle,
//! row-major, `n(n-1)/2` entries), the layout SciPy and `kodama` use.
//!
//! ```text
//!        0    1    2    3
//!   0    -   c0   c1   c2
//!   1         -   c3   c4
//!   2              -   c5
//!   3                   -
//! ```
//!
//! Construction is the only place input is checked. Once a matrix exists the
//! engine treats it as trusted.
//!
//! Sources:
//!
//! - [`DistanceMatrix::from_fn`]: a callback `dist(i, j)`
//! - [`DistanceMatrix::from_square`]: a full `n x n` matrix
//! - [`DistanceMatrix::from_condensed`]: an upper triangle
//! - `DistanceMatrix::from_array`: an `ndarray` view (feature `ndarray`)
//! - [`LabeledDistances`]: tab-delimited text with observation names

mod text;

pub use text::LabeledDistances;

use crate::error::{Error, Result};

/// A validated, symmetric distance matrix over `n >= 2` items.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceMatrix {
    n_items: usize,
    condensed: Vec<f64>,
}

/// Position of `(i, j)`, `i < j`, in a condensed matrix over `n` items.
#[inline]
pub(crate) fn condensed_index(n: usize, i: usize, j: usize) -> usize {
    debug_assert!(i < j && j < n);
    n * i - i * (i + 1) / 2 + (j - i - 1)
}

fn check_distance(i: usize, j: usize, value: f64) -> Result<()> {
    // `!(value >= 0.0)` also rejects NaN.
    if !(value >= 0.0) {
        return Err(Error::InvalidDistance { i, j, value });
    }
    Ok(())
}

fn check_item_count(n: usize) -> Result<()> {
    match n {
        0 => Err(Error::EmptyInput),
        1 => Err(Error::TooFewItems { n_items: 1 }),
        _ => Ok(()),
    }
}

impl DistanceMatrix {
    /// Build from a distance callback.
    ///
    /// `dist` is evaluated on the diagonal and on both orders of every pair,
    /// so asymmetric or non-zero-diagonal callbacks are rejected up front.
    ///
    /// ```rust
    /// use hclust::DistanceMatrix;
    ///
    /// let xs = [0.0_f64, 1.0, 5.0];
    /// let m = DistanceMatrix::from_fn(3, |i, j| (xs[i] - xs[j]).abs()).unwrap();
    /// assert_eq!(m.get(0, 2), 5.0);
    /// ```
    pub fn from_fn<F>(n: usize, mut dist: F) -> Result<Self>
    where
        F: FnMut(usize, usize) -> f64,
    {
        check_item_count(n)?;

        let mut condensed = Vec::with_capacity(n * (n - 1) / 2);
        for i in 0..n {
            let d_ii = dist(i, i);
            check_distance(i, i, d_ii)?;
            if d_ii != 0.0 {
                return Err(Error::NonZeroDiagonal { i, value: d_ii });
            }
            for j in (i + 1)..n {
                let d_ij = dist(i, j);
                let d_ji = dist(j, i);
                check_distance(i, j, d_ij)?;
                check_distance(j, i, d_ji)?;
                if d_ij != d_ji {
                    return Err(Error::Asymmetric { i, j, d_ij, d_ji });
                }
                condensed.push(d_ij);
            }
        }

        Ok(Self {
            n_items: n,
            condensed,
        })
    }

    /// Build from a full square matrix given as rows.
    pub fn from_square<R: AsRef<[f64]>>(rows: &[R]) -> Result<Self> {
        let n = rows.len();
        if let Some(row) = rows.iter().find(|r| r.as_ref().len() != n) {
            return Err(Error::DimensionMismatch {
                expected: n,
                found: row.as_ref().len(),
            });
        }
        Self::from_fn(n, |i, j| rows[i].as_ref()[j])
    }

    /// Build from a condensed upper triangle of length `n(n-1)/2`.
    pub fn from_condensed(n: usize, condensed: Vec<f64>) -> Result<Self> {
        check_item_count(n)?;
        let expected = n * (n - 1) / 2;
        if condensed.len() != expected {
            return Err(Error::DimensionMismatch {
                expected,
                found: condensed.len(),
            });
        }

        let mut k = 0;
        for i in 0..n {
            for j in (i + 1)..n {
                check_distance(i, j, condensed[k])?;
                k += 1;
            }
        }

        Ok(Self {
            n_items: n,
            condensed,
        })
    }

    /// Build from a square `ndarray` view.
    #[cfg(feature = "ndarray")]
    pub fn from_array(matrix: ndarray::ArrayView2<'_, f64>) -> Result<Self> {
        let (rows, cols) = matrix.dim();
        if rows != cols {
            return Err(Error::DimensionMismatch {
                expected: rows,
                found: cols,
            });
        }
        Self::from_fn(rows, |i, j| matrix[[i, j]])
    }

    /// Number of items.
    pub fn n_items(&self) -> usize {
        self.n_items
    }

    /// Distance between items `i` and `j`. Zero when `i == j`.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of range.
    pub fn get(&self, i: usize, j: usize) -> f64 {
        assert!(
            i < self.n_items && j < self.n_items,
            "item index out of range"
        );
        match i.cmp(&j) {
            std::cmp::Ordering::Equal => 0.0,
            std::cmp::Ordering::Less => self.condensed[condensed_index(self.n_items, i, j)],
            std::cmp::Ordering::Greater => self.condensed[condensed_index(self.n_items, j, i)],
        }
    }

    /// The condensed upper triangle.
    pub fn as_condensed(&self) -> &[f64] {
        &self.condensed
    }

    /// Consume into the condensed upper triangle.
    pub fn into_condensed(self) -> Vec<f64> {
        self.condensed
    }

    /// Expand to a full `n x n` matrix.
    pub fn to_square(&self) -> Vec<Vec<f64>> {
        (0..self.n_items)
            .map(|i| (0..self.n_items).map(|j| self.get(i, j)).collect())
            .collect()
    }
}
