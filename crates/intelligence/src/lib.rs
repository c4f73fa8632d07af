//! Intelligence layer for Pantry
//!
//! Everything that talks to (or stands in for) a model:
//! - Embedding adapters implementing [`pantry_engine::Embedder`]
//!   ([`HashEmbedder`] offline, [`ApiEmbedder`] over HTTP)
//! - The query translator turning a natural-language request into a
//!   validated, read-only [`pantry_core::ValidatedPlan`]
//! - Shared HTTP client and retry helper for OpenAI-compatible endpoints
//!
//! # Usage
//!
//! ```ignore
//! use pantry_intelligence::{ApiProposer, QueryTranslator};
//!
//! let translator = QueryTranslator::new(Arc::new(ApiProposer::from_config(&model)));
//! let plan = translator.translate("quick recipes with potatoes", db.schema())?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod embed;
pub mod llm_client;
pub mod translate;

pub use embed::{ApiEmbedder, HashEmbedder};
pub use llm_client::LlmClientError;
pub use translate::{
    bucket_for_phrase, find_mutating_intent, plan_from_response, ApiProposer, FixedProposer,
    PlanProposer, QueryTranslator, TranslateError,
};
