use crate::cluster::EngineState;

/// Result alias for `hclust`.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by distance input, the clustering engine and dendrogram cuts.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// Input was empty.
    #[error("empty input provided")]
    EmptyInput,

    /// Fewer than two items; not even one merge is possible.
    #[error("need at least 2 items to cluster, got {n_items}")]
    TooFewItems {
        /// Number of items supplied.
        n_items: usize,
    },

    /// Matrix dimension mismatch.
    #[error("dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch {
        /// Expected dimension.
        expected: usize,
        /// Found dimension.
        found: usize,
    },

    /// `d(i, j) != d(j, i)`.
    #[error("distance matrix is not symmetric at ({i}, {j}): {d_ij} != {d_ji}")]
    Asymmetric {
        /// Row index.
        i: usize,
        /// Column index.
        j: usize,
        /// Value at (i, j).
        d_ij: f64,
        /// Value at (j, i).
        d_ji: f64,
    },

    /// Negative or NaN distance.
    #[error("invalid distance {value} between items {i} and {j}")]
    InvalidDistance {
        /// First item.
        i: usize,
        /// Second item.
        j: usize,
        /// Offending value.
        value: f64,
    },

    /// `d(i, i) != 0`.
    #[error("self-distance of item {i} is {value}, expected 0")]
    NonZeroDiagonal {
        /// Item index.
        i: usize,
        /// Offending value.
        value: f64,
    },

    /// Invalid number of clusters requested.
    #[error("cannot create {requested} clusters from {n_items} items")]
    InvalidClusterCount {
        /// Requested count.
        requested: usize,
        /// Number of items.
        n_items: usize,
    },

    /// Invalid parameter value.
    #[error("invalid parameter '{name}': {message}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Error message.
        message: String,
    },

    /// Malformed distance-matrix text.
    #[error("parse error on line {line}: {message}")]
    Parse {
        /// 1-based line number.
        line: usize,
        /// What went wrong.
        message: String,
    },

    /// Lookup on a retired or unknown cluster id.
    #[error("cluster {id} is not active")]
    InvalidCluster {
        /// Cluster id.
        id: usize,
    },

    /// Operation not allowed in the engine's current state.
    #[error("cannot {operation} while engine is {state}")]
    InvalidState {
        /// Attempted operation.
        operation: &'static str,
        /// State the engine was in.
        state: EngineState,
    },
}

/// Coarse classification of [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Bad construction parameters or call arguments.
    Validation,
    /// Internal invariant violation: a cluster id that is not active.
    InvalidCluster,
    /// Call made in the wrong engine state.
    State,
}

impl Error {
    /// Which class of failure this is.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidCluster { .. } => ErrorKind::InvalidCluster,
            Error::InvalidState { .. } => ErrorKind::State,
            _ => ErrorKind::Validation,
        }
    }

    pub(crate) fn parameter(name: &'static str, message: impl Into<String>) -> Self {
        Error::InvalidParameter {
            name,
            message: message.into(),
        }
    }

    pub(crate) fn parse(line: usize, message: impl Into<String>) -> Self {
        Error::Parse {
            line,
            message: message.into(),
        }
    }
}
