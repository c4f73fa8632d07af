//! Vector index error types

use pantry_core::RecordId;
use thiserror::Error;

/// Result type for index operations
pub type IndexResult<T> = Result<T, IndexError>;

/// Errors from the IVF vector index
#[derive(Debug, Clone, PartialEq, Error)]
pub enum IndexError {
    /// Vector or query length differs from the index dimension
    #[error("Dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch {
        /// Configured dimension
        expected: usize,
        /// Length supplied
        got: usize,
    },

    /// Clustering could not be computed
    #[error("Index build failed: {0}")]
    Build(String),

    /// Bad search parameters
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// An entry for this id already exists
    #[error("Duplicate index entry for record {0}")]
    DuplicateId(RecordId),
}

impl From<IndexError> for pantry_core::Error {
    fn from(e: IndexError) -> Self {
        match e {
            IndexError::DimensionMismatch { expected, got } => {
                pantry_core::Error::DimensionMismatch { expected, got }
            }
            IndexError::Build(reason) => pantry_core::Error::IndexBuild { reason },
            IndexError::InvalidArgument(reason) => pantry_core::Error::InvalidArgument { reason },
            IndexError::DuplicateId(id) => {
                pantry_core::Error::Internal(format!("duplicate index entry for record {}", id))
            }
        }
    }
}
