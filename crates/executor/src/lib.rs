//! # Pantry Executor
//!
//! The public API for Pantry - an embedded recipe store with hybrid
//! structured and vector retrieval.
//!
//! This is the only crate users need to import. It provides:
//! - [`Pantry`] - The main database interface
//! - [`Plan`] - Structured query plans (filters, similarity, grouping)
//! - [`ResultSet`] - Query results, serializable to JSON
//! - [`Command`]/[`Output`] - Low-level command interface (for SDKs)
//!
//! ## Quick Start
//!
//! ```text
//! use pantry_executor::{Column, HashEmbedder, Pantry, PantryConfig, Plan, Predicate};
//!
//! let db = Pantry::ephemeral(PantryConfig::with_dimension(256), Arc::new(HashEmbedder::new(256)))?;
//! db.add_recipe(fields)?;
//!
//! // Similarity
//! let hits = db.similar("Potatoes", 3)?;
//!
//! // Structured + similarity
//! let rows = db.execute(
//!     Plan::select([Column::Name, Column::Similarity])
//!         .filter(Predicate::contains(Column::Ingredients, "potato"))
//!         .similar_to_text("hearty winter food")
//!         .limit(5),
//! )?;
//! ```
//!
//! ## Query paths
//!
//! | Path | Entry point | Notes |
//! |------|-------------|-------|
//! | Point | `get` | by id |
//! | Scan | `scan`, `recipes` | ascending id |
//! | Similarity | `similar` | IVF probe |
//! | Hybrid | `execute`, `explain` | validated [`Plan`] |
//! | Natural language | `ask`, `translate` | read-only, needs a plan proposer |

#![warn(missing_docs)]

mod api;
mod command;
mod convert;
mod error;
mod executor;
mod output;
pub mod query;

// Test modules
#[cfg(test)]
mod tests;

// =============================================================================
// Public API - Everything users need is re-exported here
// =============================================================================

pub use api::Pantry;
pub use command::{Command, NewRecipe};
pub use error::Error;
pub use executor::Executor;
pub use output::{Output, PlanEstimate, ResultSet, Row, SimilarHit, Strategy};
pub use query::QueryExecutor;

// Re-export core types so users don't need pantry-core directly
pub use pantry_core::{
    BucketThresholds, Column, DurationBucket, Filter, Ingredient, Literal, Op, Plan, Predicate,
    Recipe, RecipeFields, RecordId, SchemaDescriptor, Similarity, SimilarityQuery, ValidatedPlan,
    Value,
};

// Re-export configuration and index types so users don't need pantry-engine directly
pub use pantry_engine::{
    DistanceMetric, EmbedError, Embedder, IndexConfig, IndexStats, ModelConfig, PantryConfig,
    QueryConfig, SchemaConfig,
};

// Re-export adapters and translator types
pub use pantry_intelligence::{
    ApiEmbedder, ApiProposer, FixedProposer, HashEmbedder, PlanProposer, QueryTranslator,
    TranslateError,
};

/// Result type for executor operations
pub type Result<T> = std::result::Result<T, Error>;
