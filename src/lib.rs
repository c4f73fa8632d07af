//! Pantry - embedded recipe store with hybrid structured and vector retrieval
//!
//! Recipes are appended to an id-ordered store, embedded into an IVF vector
//! index, and queried with validated read-only plans that combine column
//! filters, similarity ranking and grouping. Natural-language requests are
//! translated into the same plans by a pluggable proposer.
//!
//! # Quick Start
//!
//! ```ignore
//! use pantry::{HashEmbedder, Pantry, PantryConfig};
//! use std::sync::Arc;
//!
//! // In-memory database with the offline embedder
//! let db = Pantry::ephemeral(PantryConfig::with_dimension(256), Arc::new(HashEmbedder::new(256)))?;
//! db.seed_from_json(&std::fs::read_to_string("recipes.json")?)?;
//!
//! for (recipe, score) in db.similar("Potatoes", 3)? {
//!     println!("{:.3} {}", score, recipe.name());
//! }
//! ```
//!
//! # Architecture
//!
//! All operations go through the [`Executor`] which provides a command-based API.
//! The [`Pantry`] struct provides a convenient high-level interface.
//!
//! Internal implementation details (record log, store, vector index) are not
//! exposed - only the executor API is public.

// Re-export the public API from pantry-executor
pub use pantry_executor::*;
