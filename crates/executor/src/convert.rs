//! Error conversion from internal error types.
//!
//! Maps [`pantry_core::Error`] (and the module errors that convert into it)
//! to the executor's serializable [`Error`].

use crate::Error;
use pantry_intelligence::TranslateError;

impl From<pantry_core::Error> for Error {
    fn from(err: pantry_core::Error) -> Self {
        use pantry_core::Error as E;
        match err {
            E::Validation { reason } => Error::Validation { reason },
            E::NotFound { id } => Error::RecipeNotFound { id: id.as_u64() },
            E::DimensionMismatch { expected, got } => Error::DimensionMismatch { expected, got },
            E::IndexBuild { reason } => Error::IndexBuild { reason },
            E::InvalidArgument { reason } => Error::InvalidArgument { reason },
            E::Translation { reason } => Error::Translation { reason },
            E::Embedding { reason } => Error::Embedding { reason },
            E::Io(e) => Error::Io {
                reason: e.to_string(),
            },
            E::Serialization(reason) => Error::Serialization { reason },
            E::Corruption(reason) => Error::Corruption { reason },
            E::Internal(reason) => Error::Internal { reason },
        }
    }
}

impl From<TranslateError> for Error {
    fn from(err: TranslateError) -> Self {
        Error::Translation {
            reason: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization {
            reason: err.to_string(),
        }
    }
}
