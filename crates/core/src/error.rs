//! Error types for pantry
//!
//! This module defines the error type shared by every layer of the system.
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.
//!
//! # Categories
//!
//! | Category | Variants | Handling |
//! |----------|----------|----------|
//! | Input | `Validation`, `InvalidArgument` | Surfaced to caller, never retried |
//! | Lookup | `NotFound` | Surfaced, not fatal |
//! | Setup | `DimensionMismatch`, `IndexBuild` | Fatal: abort startup |
//! | Translation | `Translation` | "Cannot satisfy request" |
//! | Adapter | `Embedding` | Propagated, caller decides on retry |
//! | System | `Io`, `Serialization`, `Corruption`, `Internal` | Infrastructure |

use crate::types::RecordId;
use std::io;
use thiserror::Error;

/// Result type alias for pantry operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for pantry
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed record or query arguments
    #[error("validation error: {reason}")]
    Validation {
        /// What was wrong with the input
        reason: String,
    },

    /// Record id not present in the store
    #[error("record not found: {id}")]
    NotFound {
        /// The missing id
        id: RecordId,
    },

    /// Vector length differs from the configured dimension
    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch {
        /// Configured dimension
        expected: usize,
        /// Length of the offending vector
        got: usize,
    },

    /// Index (re)build could not be performed
    #[error("index build error: {reason}")]
    IndexBuild {
        /// Why the build was rejected
        reason: String,
    },

    /// Out-of-range argument to a read operation (k, probe count, limit)
    #[error("invalid argument: {reason}")]
    InvalidArgument {
        /// Which argument and why
        reason: String,
    },

    /// A natural-language request could not be turned into a valid plan
    #[error("cannot satisfy request: {reason}")]
    Translation {
        /// Why the proposal was rejected
        reason: String,
    },

    /// The embedding adapter failed for this request
    #[error("embedding error: {reason}")]
    Embedding {
        /// Adapter-provided description
        reason: String,
    },

    /// I/O error (log file, config file)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Serialization/deserialization error
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Persisted data failed an integrity check
    #[error("data corruption: {0}")]
    Corruption(String),

    /// Internal error (bug or invariant violation)
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Build a validation error
    pub fn validation(reason: impl Into<String>) -> Self {
        Error::Validation {
            reason: reason.into(),
        }
    }

    /// Build an invalid-argument error
    pub fn invalid_argument(reason: impl Into<String>) -> Self {
        Error::InvalidArgument {
            reason: reason.into(),
        }
    }

    /// Build a translation error
    pub fn translation(reason: impl Into<String>) -> Self {
        Error::Translation {
            reason: reason.into(),
        }
    }

    /// Build an index build error
    pub fn index_build(reason: impl Into<String>) -> Self {
        Error::IndexBuild {
            reason: reason.into(),
        }
    }

    /// Check if this error indicates an absent record
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }

    /// Check if this error was caused by caller input
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            Error::Validation { .. } | Error::InvalidArgument { .. } | Error::Translation { .. }
        )
    }

    /// Configuration-level errors that should abort startup
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::DimensionMismatch { .. } | Error::IndexBuild { .. } | Error::Corruption(_)
        )
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
