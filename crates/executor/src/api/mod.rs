//! High-level typed wrapper for the Executor.
//!
//! The [`Pantry`] struct provides a convenient Rust API that wraps the
//! [`Executor`] and [`Command`]/[`Output`] enums with typed method calls.
//!
//! # Example
//!
//! ```text
//! use pantry_executor::{Pantry, HashEmbedder};
//!
//! let db = Pantry::open("/var/data/recipes", Arc::new(HashEmbedder::new(768)))?;
//! db.seed_from_json(&std::fs::read_to_string("recipes.json")?)?;
//!
//! for (recipe, score) in db.similar("Potatoes", 3)? {
//!     println!("{:.3} {}", score, recipe.name());
//! }
//! ```

mod query;
mod recipes;

use std::path::Path;
use std::sync::Arc;

use pantry_engine::{Database, Embedder, IndexStats, PantryConfig};
use pantry_intelligence::{ApiProposer, PlanProposer, QueryTranslator};
use tracing::info;

use crate::{Command, Error, Executor, Output, Result};

/// Recipe database with hybrid retrieval.
///
/// Cheap to share behind an `Arc`; every method takes `&self`.
#[derive(Debug)]
pub struct Pantry {
    executor: Executor,
}

impl Pantry {
    /// Open (or create) a database at `path`.
    ///
    /// The config is read from `pantry.toml` in the data directory, written
    /// with defaults on first open. When the config has a `[model]` section
    /// an HTTP plan proposer is attached.
    pub fn open<P: AsRef<Path>>(path: P, embedder: Arc<dyn Embedder>) -> Result<Self> {
        let db = Database::open(path, embedder)?;
        let proposer = proposer_from_config(db.config());
        Ok(Self::from_database(db, proposer))
    }

    /// Open (or create) a database at `path` with an explicit config.
    ///
    /// `config` is written to `pantry.toml` only if none exists yet.
    pub fn open_with_config<P: AsRef<Path>>(
        path: P,
        config: PantryConfig,
        embedder: Arc<dyn Embedder>,
    ) -> Result<Self> {
        let db = Database::open_with_config(path, config, embedder)?;
        let proposer = proposer_from_config(db.config());
        Ok(Self::from_database(db, proposer))
    }

    /// In-memory database; nothing is persisted.
    pub fn ephemeral(config: PantryConfig, embedder: Arc<dyn Embedder>) -> Result<Self> {
        let db = Database::ephemeral(config, embedder)?;
        let proposer = proposer_from_config(db.config());
        Ok(Self::from_database(db, proposer))
    }

    /// Wrap an opened database, with an optional plan proposer.
    pub fn from_database(db: Database, proposer: Option<Arc<dyn PlanProposer>>) -> Self {
        let translator = proposer.map(QueryTranslator::new);
        info!(
            target: "pantry::executor",
            recipes = db.count(),
            translator = translator.is_some(),
            "Pantry ready"
        );
        Pantry {
            executor: Executor::new(Arc::new(db), translator),
        }
    }

    /// Replace the plan proposer used by [`Pantry::ask`].
    pub fn with_proposer(self, proposer: Arc<dyn PlanProposer>) -> Self {
        let db = self.executor.database().clone();
        Pantry {
            executor: Executor::new(db, Some(QueryTranslator::new(proposer))),
        }
    }

    /// The command executor
    pub fn executor(&self) -> &Executor {
        &self.executor
    }

    /// The underlying database
    pub fn database(&self) -> &Database {
        self.executor.database()
    }

    /// Run a raw command
    pub fn execute_command(&self, cmd: Command) -> Result<Output> {
        self.executor.execute(cmd)
    }

    // =========================================================================
    // Index administration
    // =========================================================================

    /// Recluster the vector index with `num_clusters` (configured default
    /// when None).
    pub fn build_index(&self, num_clusters: Option<usize>) -> Result<IndexStats> {
        match self.executor.execute(Command::BuildIndex { num_clusters })? {
            Output::IndexStats(stats) => Ok(stats),
            _ => Err(Error::Internal {
                reason: "Unexpected output for BuildIndex".into(),
            }),
        }
    }

    /// Cluster statistics
    pub fn index_stats(&self) -> Result<IndexStats> {
        match self.executor.execute(Command::IndexStats)? {
            Output::IndexStats(stats) => Ok(stats),
            _ => Err(Error::Internal {
                reason: "Unexpected output for IndexStats".into(),
            }),
        }
    }
}

fn proposer_from_config(config: &PantryConfig) -> Option<Arc<dyn PlanProposer>> {
    config
        .model
        .as_ref()
        .map(|model| Arc::new(ApiProposer::from_config(model)) as Arc<dyn PlanProposer>)
}
