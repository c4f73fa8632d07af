//! Database configuration via `pantry.toml`
//!
//! On first open, a default `pantry.toml` is created in the data directory.
//! To change settings, edit the file and reopen.

use crate::vector::{DistanceMetric, IvfParams, KMeansParams};
use pantry_core::schema::{
    DEFAULT_MAX_DEPTH, DEFAULT_MAX_LIMIT, DEFAULT_MEDIUM_MAX_MINUTES, DEFAULT_SHORT_MAX_MINUTES,
};
use pantry_core::{BucketThresholds, Column, ColumnKind, Error, Result, SchemaDescriptor};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Config file name placed in the database data directory.
pub const CONFIG_FILE_NAME: &str = "pantry.toml";

/// Default embedding dimension (nomic-embed-text-v1)
pub const DEFAULT_DIMENSION: usize = 768;

/// Configuration for an external model endpoint.
///
/// Used for the plan proposer (`[model]`) and the HTTP embedder
/// (`[embedding]`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelConfig {
    /// OpenAI-compatible API endpoint (e.g. "http://localhost:11434/v1")
    pub endpoint: String,
    /// Model name (e.g. "qwen3:1.7b")
    pub model: String,
    /// Optional API key for authenticated endpoints
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Request timeout in milliseconds (default: 5000)
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_timeout_ms() -> u64 {
    5000
}

/// `[index]` section
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct IndexConfig {
    /// Cluster count for the lazy build and for `build_index` without an argument
    pub num_clusters: usize,
    /// Clusters probed per search
    pub probe_clusters: usize,
    /// Population at which the index first clusters itself
    pub min_build_population: usize,
    /// Upper bound on Lloyd iterations
    pub max_iterations: usize,
    /// Stop when no centroid moves farther than this
    pub convergence_threshold: f32,
    /// k-means++ seed
    pub seed: u64,
}

impl Default for IndexConfig {
    fn default() -> Self {
        IndexConfig {
            num_clusters: 8,
            probe_clusters: 2,
            min_build_population: 64,
            max_iterations: 25,
            convergence_threshold: 1e-4,
            seed: 42,
        }
    }
}

impl IndexConfig {
    /// Index parameters derived from this section
    pub fn ivf_params(&self) -> IvfParams {
        IvfParams {
            num_clusters: self.num_clusters,
            min_build_population: self.min_build_population,
            kmeans: KMeansParams {
                max_iterations: self.max_iterations,
                convergence_threshold: self.convergence_threshold,
                seed: self.seed,
            },
        }
    }
}

/// `[query]` section
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct QueryConfig {
    /// Candidates fetched per requested row when a plan has a similarity clause
    pub overfetch_factor: usize,
    /// Limit applied when a plan has none and ranks by similarity
    pub default_limit: usize,
    /// Largest limit a plan may request
    pub max_limit: usize,
}

impl Default for QueryConfig {
    fn default() -> Self {
        QueryConfig {
            overfetch_factor: 4,
            default_limit: 10,
            max_limit: DEFAULT_MAX_LIMIT,
        }
    }
}

/// `[schema]` section
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SchemaConfig {
    /// Inclusive upper bound of the `short` bucket, in minutes
    pub short_max_minutes: i64,
    /// Inclusive upper bound of the `medium` bucket, in minutes
    pub medium_max_minutes: i64,
    /// Maximum filter nesting depth
    pub max_depth: usize,
    /// Columns a plan may project or group by
    pub output_columns: Vec<Column>,
    /// Columns a plan may filter on
    pub predicate_columns: Vec<Column>,
}

impl Default for SchemaConfig {
    fn default() -> Self {
        let columns = SchemaDescriptor::default();
        SchemaConfig {
            short_max_minutes: DEFAULT_SHORT_MAX_MINUTES,
            medium_max_minutes: DEFAULT_MEDIUM_MAX_MINUTES,
            max_depth: DEFAULT_MAX_DEPTH,
            output_columns: columns.output_columns,
            predicate_columns: columns.predicate_columns,
        }
    }
}

/// Database configuration loaded from `pantry.toml`.
///
/// # Example
///
/// ```toml
/// dimension = 768
/// metric = "inner_product"
///
/// [index]
/// num_clusters = 8
/// probe_clusters = 2
///
/// # [model]
/// # endpoint = "http://localhost:11434/v1"
/// # model = "qwen3:1.7b"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PantryConfig {
    /// Embedding dimension; must equal the embedder's dimension
    #[serde(default = "default_dimension")]
    pub dimension: usize,
    /// Distance metric
    #[serde(default)]
    pub metric: DistanceMetric,
    /// Append ingredient names to the embedded text
    #[serde(default)]
    pub embed_ingredients: bool,
    /// Vector index settings
    #[serde(default)]
    pub index: IndexConfig,
    /// Executor settings
    #[serde(default)]
    pub query: QueryConfig,
    /// Plan schema settings
    #[serde(default)]
    pub schema: SchemaConfig,
    /// Optional plan proposer endpoint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<ModelConfig>,
    /// Optional HTTP embedding endpoint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<ModelConfig>,
}

fn default_dimension() -> usize {
    DEFAULT_DIMENSION
}

impl Default for PantryConfig {
    fn default() -> Self {
        PantryConfig {
            dimension: DEFAULT_DIMENSION,
            metric: DistanceMetric::default(),
            embed_ingredients: false,
            index: IndexConfig::default(),
            query: QueryConfig::default(),
            schema: SchemaConfig::default(),
            model: None,
            embedding: None,
        }
    }
}

impl PantryConfig {
    /// Default config with a different embedding dimension
    pub fn with_dimension(dimension: usize) -> Self {
        PantryConfig {
            dimension,
            ..PantryConfig::default()
        }
    }

    /// Check ranges and cross-field constraints.
    pub fn validate(&self) -> Result<()> {
        let bad = |msg: String| Err(Error::invalid_argument(format!("{} in {}", msg, CONFIG_FILE_NAME)));
        if self.dimension == 0 {
            return bad("dimension must be positive".into());
        }
        if self.index.num_clusters == 0 {
            return bad("index.num_clusters must be at least 1".into());
        }
        if self.index.probe_clusters == 0 {
            return bad("index.probe_clusters must be at least 1".into());
        }
        if self.index.max_iterations == 0 {
            return bad("index.max_iterations must be at least 1".into());
        }
        if !self.index.convergence_threshold.is_finite() || self.index.convergence_threshold < 0.0
        {
            return bad(format!(
                "index.convergence_threshold {} is invalid",
                self.index.convergence_threshold
            ));
        }
        if self.query.overfetch_factor == 0 {
            return bad("query.overfetch_factor must be at least 1".into());
        }
        if self.query.max_limit == 0 {
            return bad("query.max_limit must be at least 1".into());
        }
        if self.query.default_limit == 0 || self.query.default_limit > self.query.max_limit {
            return bad(format!(
                "query.default_limit must be between 1 and {}",
                self.query.max_limit
            ));
        }
        if !self.buckets().is_valid() {
            return bad(
                "schema.short_max_minutes must be positive and below schema.medium_max_minutes"
                    .into(),
            );
        }
        if self.schema.max_depth == 0 {
            return bad("schema.max_depth must be at least 1".into());
        }
        if self.schema.output_columns.is_empty() {
            return bad("schema.output_columns must not be empty".into());
        }
        if self.schema.predicate_columns.is_empty() {
            return bad("schema.predicate_columns must not be empty".into());
        }
        if let Some(c) = self
            .schema
            .predicate_columns
            .iter()
            .find(|c| c.kind() == ColumnKind::Derived)
        {
            return bad(format!(
                "schema.predicate_columns lists '{}', which is computed and cannot be filtered",
                c
            ));
        }
        Ok(())
    }

    /// Bucket thresholds from `[schema]`
    pub fn buckets(&self) -> BucketThresholds {
        BucketThresholds {
            short_max_minutes: self.schema.short_max_minutes,
            medium_max_minutes: self.schema.medium_max_minutes,
        }
    }

    /// Schema descriptor plans are validated against
    pub fn schema_descriptor(&self) -> SchemaDescriptor {
        SchemaDescriptor {
            buckets: self.buckets(),
            max_depth: self.schema.max_depth,
            max_limit: self.query.max_limit,
            output_columns: self.schema.output_columns.clone(),
            predicate_columns: self.schema.predicate_columns.clone(),
        }
    }

    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# Pantry database configuration
#
# Embedding dimension. Must match the embedding model (nomic-embed-text-v1 = 768).
dimension = 768

# Distance metric: "inner_product" (default), "cosine" or "euclidean".
# Scores are always the negated distance (higher = more similar).
metric = "inner_product"

# Append ingredient names to the text each recipe embedding is computed from.
embed_ingredients = false

[index]
# Clusters used by the automatic first build and by build_index()
num_clusters = 8
# Clusters probed per search. Equal to num_clusters = exact search.
probe_clusters = 2
# Recipes needed before the index clusters itself; linear scan until then
min_build_population = 64
max_iterations = 25
convergence_threshold = 0.0001
seed = 42

[query]
# Candidates fetched per requested row for similarity plans
overfetch_factor = 4
default_limit = 10
max_limit = 1000

[schema]
# Duration buckets: short <= short_max_minutes < medium <= medium_max_minutes < long
short_max_minutes = 30
medium_max_minutes = 60
max_depth = 2
# Columns plans may project (similarity and count are computed per query)
output_columns = [
    "id", "name", "description", "servings", "total_time", "duration_bucket",
    "equipment", "ingredients", "steps", "similarity", "count",
]
# Columns plans may filter on
predicate_columns = [
    "id", "name", "description", "servings", "total_time", "duration_bucket",
    "equipment", "ingredients", "steps",
]

# Model used to turn questions into query plans.
# [model]
# endpoint = "http://localhost:11434/v1"
# model = "qwen3:1.7b"
# api_key = "your-api-key"      # optional
# timeout_ms = 5000              # optional, default 5000

# HTTP embedding endpoint (requires the "embed" feature).
# [embedding]
# endpoint = "http://localhost:11434/v1"
# model = "nomic-embed-text"
"#
    }

    /// Read, parse and validate config from a file path.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Internal(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        let config: PantryConfig = toml::from_str(&content).map_err(|e| {
            Error::invalid_argument(format!(
                "Failed to parse config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Write the default config file if it does not already exist.
    pub fn write_default_if_missing(path: &Path) -> Result<()> {
        if !path.exists() {
            std::fs::write(path, Self::default_toml()).map_err(|e| {
                Error::Internal(format!(
                    "Failed to write default config file '{}': {}",
                    path.display(),
                    e
                ))
            })?;
        }
        Ok(())
    }

    /// Serialize this config to TOML and write it to the given path.
    pub fn write_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Internal(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content).map_err(|e| {
            Error::Internal(format!(
                "Failed to write config file '{}': {}",
                path.display(),
                e
            ))
        })
    }
}
