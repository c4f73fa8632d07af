//! Embedding adapter seam
//!
//! The database never embeds text itself; it calls an injected [`Embedder`].
//! Concrete adapters (feature hashing, HTTP) live in `pantry-intelligence`.

use thiserror::Error;

/// Errors from an embedding adapter
#[derive(Debug, Error)]
pub enum EmbedError {
    /// The adapter could not be reached or is not configured
    #[error("embedder unavailable: {0}")]
    Unavailable(String),

    /// The request was made but failed
    #[error("embedding request failed: {0}")]
    Request(String),

    /// The adapter answered with something that is not a usable vector
    #[error("invalid embedding response: {0}")]
    InvalidResponse(String),

    /// The vector has the wrong length
    #[error("embedding has dimension {got}, expected {expected}")]
    DimensionMismatch {
        /// Declared dimension
        expected: usize,
        /// Returned length
        got: usize,
    },
}

impl From<EmbedError> for pantry_core::Error {
    fn from(e: EmbedError) -> Self {
        match e {
            EmbedError::DimensionMismatch { expected, got } => {
                pantry_core::Error::DimensionMismatch { expected, got }
            }
            other => pantry_core::Error::Embedding {
                reason: other.to_string(),
            },
        }
    }
}

/// Text to fixed-length vector
///
/// Implementations must be deterministic for a given model and return
/// vectors of exactly `dimension()` finite floats.
pub trait Embedder: Send + Sync {
    /// Identity of the underlying model
    fn model_id(&self) -> &str;

    /// Length of every returned vector
    fn dimension(&self) -> usize;

    /// Embed one text
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError>;
}

/// Check a vector returned by an adapter
pub fn check_embedding(vector: &[f32], expected: usize) -> Result<(), EmbedError> {
    if vector.len() != expected {
        return Err(EmbedError::DimensionMismatch {
            expected,
            got: vector.len(),
        });
    }
    if vector.iter().any(|x| !x.is_finite()) {
        return Err(EmbedError::InvalidResponse(
            "embedding contains non-finite values".into(),
        ));
    }
    Ok(())
}
