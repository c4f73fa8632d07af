//! Error types for query translation

use crate::llm_client::LlmClientError;
use std::fmt;

/// Errors that can occur while turning a request into a plan
#[derive(Debug)]
pub enum TranslateError {
    /// The request was empty or whitespace
    EmptyRequest,
    /// The request asks to change data; carries the offending wording
    MutatingIntent(String),
    /// No plan proposer is configured
    NoProposer,
    /// HTTP request to the proposer failed
    Network(String),
    /// Proposer request timed out
    Timeout,
    /// The proposer answered with an error
    Model(String),
    /// The proposal is not valid JSON in the closed grammar
    Parse(String),
    /// The proposal names a column that does not exist
    UnknownColumn(String),
    /// The proposal uses an operator the grammar does not know
    UnsupportedOperator {
        /// Column the operator was applied to
        column: String,
        /// Operator as proposed
        op: String,
    },
    /// The proposal carries a value of the wrong shape for its column
    InvalidValue {
        /// Column the value was compared against
        column: String,
        /// What is wrong with it
        detail: String,
    },
    /// The proposer declined the request; carries its reason
    Refused(String),
    /// The proposal parsed but failed schema validation
    Invalid(String),
    /// Required cargo feature (translate) is not enabled
    FeatureDisabled(&'static str),
}

impl fmt::Display for TranslateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TranslateError::EmptyRequest => write!(f, "empty request"),
            TranslateError::MutatingIntent(word) => write!(
                f,
                "request asks to modify data ('{}'); only read queries are supported",
                word
            ),
            TranslateError::NoProposer => write!(f, "no plan proposer configured"),
            TranslateError::Network(msg) => write!(f, "network error: {}", msg),
            TranslateError::Timeout => write!(f, "model request timed out"),
            TranslateError::Model(msg) => write!(f, "model error: {}", msg),
            TranslateError::Parse(msg) => write!(f, "parse error: {}", msg),
            TranslateError::UnknownColumn(col) => write!(f, "unknown column '{}'", col),
            TranslateError::UnsupportedOperator { column, op } => {
                write!(f, "unsupported operator '{}' on column '{}'", op, column)
            }
            TranslateError::InvalidValue { column, detail } => {
                write!(f, "invalid value for column '{}': {}", column, detail)
            }
            TranslateError::Refused(reason) => write!(f, "request refused: {}", reason),
            TranslateError::Invalid(msg) => write!(f, "invalid plan: {}", msg),
            TranslateError::FeatureDisabled(feat) => {
                write!(f, "feature '{}' not enabled", feat)
            }
        }
    }
}

impl std::error::Error for TranslateError {}

impl From<LlmClientError> for TranslateError {
    fn from(e: LlmClientError) -> Self {
        match e {
            LlmClientError::Network(msg) => TranslateError::Network(msg),
            LlmClientError::Parse(msg) => TranslateError::Parse(msg),
            LlmClientError::Timeout => TranslateError::Timeout,
            LlmClientError::FeatureDisabled(feat) => TranslateError::FeatureDisabled(feat),
        }
    }
}

impl From<TranslateError> for pantry_core::Error {
    fn from(e: TranslateError) -> Self {
        pantry_core::Error::Translation {
            reason: e.to_string(),
        }
    }
}
