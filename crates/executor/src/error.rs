//! Error types for command execution.
//!
//! All errors from command execution are represented by the [`Error`] enum.
//! These errors are:
//! - **Structured**: Each variant has typed fields for error details
//! - **Serializable**: Can be converted to/from JSON
//!
//! Conversions from the internal error types live in `convert.rs`.

use serde::{Deserialize, Serialize};

/// Command execution errors.
///
/// # Categories
///
/// | Category | Variants | Description |
/// |----------|----------|-------------|
/// | Not Found | `RecipeNotFound` | Record doesn't exist |
/// | Input | `Validation`, `InvalidArgument`, `Translation` | Bad input |
/// | Configuration | `DimensionMismatch`, `IndexBuild` | Setup or index shape |
/// | Adapter | `Embedding` | Embedding model failed |
/// | System | `Io`, `Serialization`, `Corruption`, `Internal` | Infrastructure errors |
///
/// # Example
///
/// ```ignore
/// use pantry_executor::{Error, Pantry};
///
/// match db.get(7) {
///     Ok(recipe) => println!("{}", recipe.name()),
///     Err(Error::RecipeNotFound { id }) => println!("no recipe {}", id),
///     Err(e) => println!("Error: {}", e),
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, thiserror::Error)]
pub enum Error {
    // ==================== Not Found ====================
    /// Recipe not found
    #[error("recipe not found: {id}")]
    RecipeNotFound { id: u64 },

    // ==================== Input Errors ====================
    /// Record or plan failed validation
    #[error("validation error: {reason}")]
    Validation { reason: String },

    /// Invalid argument (k = 0, probe = 0, bad config value)
    #[error("invalid argument: {reason}")]
    InvalidArgument { reason: String },

    /// Request could not be turned into a plan
    #[error("cannot satisfy request: {reason}")]
    Translation { reason: String },

    // ==================== Configuration ====================
    /// Vector length differs from the configured dimension
    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    /// Clustering could not be built
    #[error("index build failed: {reason}")]
    IndexBuild { reason: String },

    // ==================== Adapter ====================
    /// Embedding adapter failure
    #[error("embedding failed: {reason}")]
    Embedding { reason: String },

    // ==================== System Errors ====================
    /// I/O error
    #[error("I/O error: {reason}")]
    Io { reason: String },

    /// Serialization error
    #[error("serialization error: {reason}")]
    Serialization { reason: String },

    /// Persisted data is damaged
    #[error("corruption: {reason}")]
    Corruption { reason: String },

    /// Internal error (bug or invariant violation)
    #[error("internal error: {reason}")]
    Internal { reason: String },
}

impl Error {
    /// Check if this is a not found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::RecipeNotFound { .. })
    }

    /// Check if this error was caused by caller input
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            Error::Validation { .. } | Error::InvalidArgument { .. } | Error::Translation { .. }
        )
    }

    /// Check if this is a translation error
    pub fn is_translation_error(&self) -> bool {
        matches!(self, Error::Translation { .. })
    }

    /// Configuration-level errors that should abort startup
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::DimensionMismatch { .. } | Error::IndexBuild { .. } | Error::Corruption { .. }
        )
    }
}
