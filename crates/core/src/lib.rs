//! Core types for pantry
//!
//! This crate defines the foundational types used throughout the system:
//! - RecordId, Recipe, RecipeFields, Ingredient: the record model
//! - Plan, Filter, Predicate, Column: the read-only query plan grammar
//! - SchemaDescriptor, DurationBucket: what plans may reference
//! - Value: executor output cells
//! - Error: error type hierarchy

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod plan;
pub mod schema;
pub mod types;
pub mod value;

pub use error::{Error, Result};
pub use plan::{
    Column, ColumnKind, Filter, Literal, Op, Plan, Predicate, Similarity, SimilarityQuery,
    ValidatedPlan,
};
pub use schema::{BucketThresholds, DurationBucket, SchemaDescriptor};
pub use types::{Ingredient, Recipe, RecipeFields, RecordId};
pub use value::Value;
