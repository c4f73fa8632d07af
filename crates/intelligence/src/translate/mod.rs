//! Natural-language requests to validated query plans
//!
//! ```text
//! request ──► mutation screen ──► PlanProposer ──► extract JSON
//!                                                     │
//!        ValidatedPlan ◄── schema validation ◄── closed grammar
//! ```
//!
//! The proposer (usually a language model) only ever produces data in the
//! proposal grammar. Nothing it writes is executed as query text, and every
//! proposal is validated against the schema descriptor before it reaches
//! the executor.

pub mod api;
pub mod buckets;
pub mod error;
pub mod fixed;
pub mod parser;
pub mod prompt;
pub mod safety;

pub use api::ApiProposer;
pub use buckets::bucket_for_phrase;
pub use error::TranslateError;
pub use fixed::FixedProposer;
pub use parser::{extract_json, parse_proposal, parse_response, Proposal};
pub use safety::find_mutating_intent;

use pantry_core::{SchemaDescriptor, ValidatedPlan};
use std::sync::Arc;
use tracing::debug;

/// Drafts a plan proposal for a request.
///
/// The trait is object-safe for use as `Arc<dyn PlanProposer>`.
///
/// # Implementations
///
/// - `ApiProposer` calls an OpenAI-compatible endpoint
/// - `FixedProposer` returns a canned response
pub trait PlanProposer: Send + Sync {
    /// Return raw proposal text (expected to contain one JSON object).
    fn propose(&self, request: &str, schema: &SchemaDescriptor) -> Result<String, TranslateError>;
}

/// Turns a proposal response into a validated plan
pub fn plan_from_response(
    response: &str,
    schema: &SchemaDescriptor,
) -> Result<ValidatedPlan, TranslateError> {
    let plan = parse_response(response)?.into_plan()?;
    plan.validate(schema)
        .map_err(|e| TranslateError::Invalid(e.to_string()))
}

/// Request-to-plan translator
pub struct QueryTranslator {
    proposer: Arc<dyn PlanProposer>,
}

impl QueryTranslator {
    /// Translator using `proposer`
    pub fn new(proposer: Arc<dyn PlanProposer>) -> Self {
        QueryTranslator { proposer }
    }

    /// Translate `request` into a plan valid for `schema`.
    ///
    /// Mutating requests are refused before the proposer is consulted.
    pub fn translate(
        &self,
        request: &str,
        schema: &SchemaDescriptor,
    ) -> Result<ValidatedPlan, TranslateError> {
        let request = request.trim();
        if request.is_empty() {
            return Err(TranslateError::EmptyRequest);
        }
        if let Some(word) = find_mutating_intent(request) {
            debug!(target: "pantry::translate", word = %word, "Refused mutating request");
            return Err(TranslateError::MutatingIntent(word));
        }

        let response = self.proposer.propose(request, schema)?;
        let plan = plan_from_response(&response, schema).map_err(|e| {
            debug!(target: "pantry::translate", error = %e, "Rejected proposal");
            e
        })?;

        debug!(
            target: "pantry::translate",
            filters = plan.filters().len(),
            similarity = plan.similarity().is_some(),
            group_by = ?plan.group_by(),
            "Translated request"
        );
        Ok(plan)
    }
}

impl std::fmt::Debug for QueryTranslator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryTranslator").finish_non_exhaustive()
    }
}
