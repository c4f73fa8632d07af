//! Proposer that returns a canned response

use super::{PlanProposer, TranslateError};
use pantry_core::SchemaDescriptor;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Proposer that answers every request with the same text.
///
/// Useful offline and in tests; `calls()` reports how often it was asked.
#[derive(Debug, Default)]
pub struct FixedProposer {
    response: String,
    calls: AtomicUsize,
}

impl FixedProposer {
    /// Proposer answering with `response`
    pub fn new(response: impl Into<String>) -> Self {
        FixedProposer {
            response: response.into(),
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of `propose` calls so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }
}

impl PlanProposer for FixedProposer {
    fn propose(&self, _request: &str, _schema: &SchemaDescriptor) -> Result<String, TranslateError> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        Ok(self.response.clone())
    }
}
