use thiserror::Error;

use crate::note::NoteId;
use crate::pipeline::Stage;

/// Errors returned by the clustering pipeline and its components.
#[derive(Debug, Error)]
pub enum Error {
    /// The cluster engine was handed an empty vector set.
    #[error("empty input")]
    EmptyInput,

    /// No document survived preprocessing (no notes, or only empty texts).
    #[error("empty corpus: no note has non-empty text")]
    EmptyCorpus,

    /// Invalid parameter value.
    #[error("invalid parameter {name}: {message}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Human-readable explanation.
        message: &'static str,
    },

    /// Requested cluster count is incompatible with the dataset.
    #[error("invalid cluster count: requested {requested}, but dataset has {n_items} items")]
    InvalidClusterCount {
        /// Requested number of clusters.
        requested: usize,
        /// Number of items in the dataset.
        n_items: usize,
    },

    /// Points in a dataset have inconsistent dimensionality.
    #[error("dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch {
        /// Expected dimensionality.
        expected: usize,
        /// Found dimensionality.
        found: usize,
    },

    /// The same note id appears twice in one snapshot.
    #[error("duplicate note id {0}")]
    DuplicateNoteId(NoteId),

    /// A pipeline was asked to move to a stage it cannot reach.
    #[error("illegal stage transition: {from:?} -> {to:?}")]
    StageViolation {
        /// Stage the pipeline was in.
        from: Stage,
        /// Stage that was requested.
        to: Stage,
    },
}

impl Error {
    /// True for errors caused by a bad `k` or other parameter.
    pub fn is_invalid_parameter(&self) -> bool {
        matches!(
            self,
            Error::InvalidParameter { .. } | Error::InvalidClusterCount { .. }
        )
    }
}

/// Result type used by this crate.
pub type Result<T> = std::result::Result<T, Error>;
