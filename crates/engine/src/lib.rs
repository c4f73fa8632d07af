//! Database engine for pantry
//!
//! This crate orchestrates the record store, the IVF vector index and the
//! record log behind a single [`Database`] handle:
//! - Database: open/replay, atomic append, lazy scan, search, index builds
//! - RecordStore: id-ordered committed recipes
//! - vector: distance metrics, seeded k-means, IVF index
//! - Embedder: injected text-to-vector adapter
//! - PantryConfig: `pantry.toml` configuration

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod database;
pub mod embed;
pub mod store;
pub mod vector;

pub use config::{
    IndexConfig, ModelConfig, PantryConfig, QueryConfig, SchemaConfig, CONFIG_FILE_NAME,
    DEFAULT_DIMENSION,
};
pub use database::{Database, Scan};
pub use embed::{check_embedding, EmbedError, Embedder};
pub use store::RecordStore;
pub use vector::{DistanceMetric, IndexError, IndexStats, IvfIndex, IvfParams, KMeansParams};
