//! Database: record store + vector index + record log
//!
//! ## Concurrency
//!
//! Single writer, many readers:
//! - `writer` is the mutation mutex. Appends and index builds hold it, so
//!   they are serialized. It also owns the record log.
//! - `committed` holds the store and the index behind one RwLock, so a
//!   record and its vector become visible together.
//! - Builds train under a shared lock (readers keep going) and swap the new
//!   clusters in under a brief exclusive lock.
//! - Embedding calls happen before any lock is taken.
//!
//! ## Atomic append
//!
//! validate → log append (fsync) → store insert → index insert. If either
//! insert fails, the store entry is reverted and the log is truncated back
//! to its previous length, so the log, the store and the index never diverge.

use crate::config::{PantryConfig, CONFIG_FILE_NAME};
use crate::embed::{check_embedding, Embedder};
use crate::store::RecordStore;
use crate::vector::{IndexStats, IvfIndex};
use pantry_core::{Error, Recipe, RecipeFields, RecordId, Result, SchemaDescriptor};
use pantry_durability::{RecordLog, StoredRecord, RECORD_LOG_FILE};
use parking_lot::{Mutex, RwLock};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Lock file placed in the data directory
const LOCK_FILE_NAME: &str = ".lock";

struct Writer {
    /// None for ephemeral databases
    log: Option<RecordLog>,
}

struct Committed {
    store: RecordStore,
    index: IvfIndex,
}

/// Recipe database
///
/// Open with [`Database::open`] (on disk) or [`Database::ephemeral`]
/// (in memory). The embedder is injected and must match the configured
/// dimension.
pub struct Database {
    data_dir: Option<PathBuf>,
    config: PantryConfig,
    schema: SchemaDescriptor,
    embedder: Arc<dyn Embedder>,
    writer: Mutex<Writer>,
    committed: RwLock<Committed>,
    /// Held for the lifetime of the database to keep other processes out
    _lock_file: Option<File>,
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("data_dir", &self.data_dir)
            .field("model", &self.embedder.model_id())
            .field("count", &self.count())
            .finish()
    }
}

impl Database {
    /// Open (or create) a database in `path`, reading `pantry.toml`.
    ///
    /// A default `pantry.toml` is written on first open.
    pub fn open<P: AsRef<Path>>(path: P, embedder: Arc<dyn Embedder>) -> Result<Self> {
        let data_dir = path.as_ref();
        std::fs::create_dir_all(data_dir)?;
        let config_path = data_dir.join(CONFIG_FILE_NAME);
        PantryConfig::write_default_if_missing(&config_path)?;
        let config = PantryConfig::from_file(&config_path)?;
        Self::open_inner(data_dir, config, embedder)
    }

    /// Open (or create) a database in `path` with an explicit config.
    ///
    /// The config is written to `pantry.toml` if that file does not exist;
    /// an existing file is left untouched.
    pub fn open_with_config<P: AsRef<Path>>(
        path: P,
        config: PantryConfig,
        embedder: Arc<dyn Embedder>,
    ) -> Result<Self> {
        let data_dir = path.as_ref();
        std::fs::create_dir_all(data_dir)?;
        config.validate()?;
        let config_path = data_dir.join(CONFIG_FILE_NAME);
        if !config_path.exists() {
            config.write_to_file(&config_path)?;
        }
        Self::open_inner(data_dir, config, embedder)
    }

    /// In-memory database; nothing is persisted.
    pub fn ephemeral(config: PantryConfig, embedder: Arc<dyn Embedder>) -> Result<Self> {
        config.validate()?;
        check_embedder(&config, embedder.as_ref())?;
        let committed = Committed {
            store: RecordStore::new(),
            index: IvfIndex::new(config.dimension, config.metric, config.index.ivf_params()),
        };
        debug!(target: "pantry::db", model = embedder.model_id(), "Opened ephemeral database");
        Ok(Database {
            data_dir: None,
            schema: config.schema_descriptor(),
            config,
            embedder,
            writer: Mutex::new(Writer { log: None }),
            committed: RwLock::new(committed),
            _lock_file: None,
        })
    }

    fn open_inner(data_dir: &Path, config: PantryConfig, embedder: Arc<dyn Embedder>) -> Result<Self> {
        check_embedder(&config, embedder.as_ref())?;
        let canonical = data_dir.canonicalize()?;

        // Exclusive filesystem lock: interleaved appends from two processes
        // would corrupt the log.
        let lock_path = canonical.join(LOCK_FILE_NAME);
        let lock_file = std::fs::OpenOptions::new()
            .create(true)
            .truncate(false)
            .read(true)
            .write(true)
            .open(&lock_path)?;
        fs2::FileExt::try_lock_exclusive(&lock_file).map_err(|_| {
            Error::invalid_argument(format!(
                "database at '{}' is already in use by another process",
                canonical.display()
            ))
        })?;

        let mut log = RecordLog::open(&canonical.join(RECORD_LOG_FILE))?;
        let replay = log.replay()?;

        let mut store = RecordStore::new();
        let mut index = IvfIndex::new(config.dimension, config.metric, config.index.ivf_params());
        let mut entries = Vec::with_capacity(replay.records.len());
        for record in replay.records {
            if record.embedding.len() != config.dimension {
                return Err(Error::Corruption(format!(
                    "record {} has a {}-dimensional embedding, database is configured for {}",
                    record.id,
                    record.embedding.len(),
                    config.dimension
                )));
            }
            store.insert(Recipe::new(record.id, record.fields))?;
            entries.push((record.id, record.embedding));
        }
        index.bulk_load(entries)?;

        info!(
            target: "pantry::db",
            path = %canonical.display(),
            records = store.count(),
            index_built = index.is_built(),
            truncated_bytes = replay.truncated_bytes,
            model = embedder.model_id(),
            "Database opened"
        );

        Ok(Database {
            data_dir: Some(canonical),
            schema: config.schema_descriptor(),
            config,
            embedder,
            writer: Mutex::new(Writer { log: Some(log) }),
            committed: RwLock::new(Committed { store, index }),
            _lock_file: Some(lock_file),
        })
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Active configuration
    pub fn config(&self) -> &PantryConfig {
        &self.config
    }

    /// Schema descriptor plans are validated against
    pub fn schema(&self) -> &SchemaDescriptor {
        &self.schema
    }

    /// Injected embedder
    pub fn embedder(&self) -> &Arc<dyn Embedder> {
        &self.embedder
    }

    /// Data directory, if persistent
    pub fn data_dir(&self) -> Option<&Path> {
        self.data_dir.as_deref()
    }

    // ========================================================================
    // Writes
    // ========================================================================

    /// Embed a text with the injected embedder and check the result.
    ///
    /// Takes no locks.
    pub fn embed_text(&self, text: &str) -> Result<Vec<f32>> {
        let vector = self.embedder.embed(text)?;
        check_embedding(&vector, self.config.dimension)?;
        Ok(vector)
    }

    /// Embed a recipe's canonical text and append it.
    pub fn add(&self, fields: RecipeFields) -> Result<RecordId> {
        fields.validate()?;
        let text = fields.canonical_text(self.config.embed_ingredients);
        let vector = self.embed_text(&text)?;
        self.append(fields, vector)
    }

    /// Append a recipe with a precomputed embedding.
    ///
    /// Either the record, its index entry and its log frame all become
    /// visible, or nothing changes.
    pub fn append(&self, fields: RecipeFields, vector: Vec<f32>) -> Result<RecordId> {
        fields.validate()?;
        if vector.len() != self.config.dimension {
            return Err(Error::validation(format!(
                "embedding has {} dimensions, expected {}",
                vector.len(),
                self.config.dimension
            )));
        }
        if vector.iter().any(|x| !x.is_finite()) {
            return Err(Error::validation("embedding contains non-finite values"));
        }

        let mut writer = self.writer.lock();
        let id = self.committed.read().store.next_id();
        let stored = StoredRecord {
            id,
            fields,
            embedding: vector,
        };

        let rollback = match writer.log.as_mut() {
            Some(log) => Some(log.append(&stored)?),
            None => None,
        };
        let StoredRecord {
            id,
            fields,
            embedding,
        } = stored;

        let mut committed = self.committed.write();
        let mut applied = committed.store.insert(Recipe::new(id, fields));
        if applied.is_ok() {
            if let Err(e) = committed.index.insert(id, embedding) {
                committed.store.revert(id);
                applied = Err(e.into());
            }
        }
        drop(committed);
        if let Err(e) = applied {
            if let (Some(log), Some(offset)) = (writer.log.as_mut(), rollback) {
                if let Err(te) = log.truncate(offset) {
                    warn!(target: "pantry::db", id = %id, error = %te, "Failed to roll back log append");
                }
            }
            return Err(e);
        }

        debug!(target: "pantry::db", id = %id, "Appended recipe");
        Ok(id)
    }

    /// Recluster the index with `num_clusters` (configured default if None).
    ///
    /// Blocks appends for the duration; readers are blocked only while the
    /// new clusters are swapped in.
    pub fn build(&self, num_clusters: Option<usize>) -> Result<IndexStats> {
        let _writer = self.writer.lock();
        let c = num_clusters.unwrap_or(self.config.index.num_clusters);
        let clustering = {
            let committed = self.committed.read();
            committed.index.train(c)?
        };
        let mut committed = self.committed.write();
        committed.index.install(clustering);
        Ok(committed.index.stats())
    }

    // ========================================================================
    // Reads
    // ========================================================================

    /// Fetch a recipe by id
    pub fn get(&self, id: RecordId) -> Result<Arc<Recipe>> {
        self.committed.read().store.get(id)
    }

    /// Fetch several recipes, preserving the order of `ids`
    pub fn get_many(&self, ids: &[RecordId]) -> Result<Vec<Arc<Recipe>>> {
        let committed = self.committed.read();
        ids.iter().map(|id| committed.store.get(*id)).collect()
    }

    /// Number of recipes
    pub fn count(&self) -> usize {
        self.committed.read().store.count()
    }

    /// All recipes in id order
    pub fn recipes(&self) -> Vec<Arc<Recipe>> {
        self.committed.read().store.iter().cloned().collect()
    }

    /// Lazily iterate recipes matching `predicate` in ascending id order.
    ///
    /// The shared lock is taken per step, so a scan never blocks writers for
    /// longer than one lookup and sees records appended while it runs.
    pub fn scan<F>(&self, predicate: F) -> Scan<'_, F>
    where
        F: Fn(&Recipe) -> bool,
    {
        Scan {
            db: self,
            predicate,
            last: None,
            done: false,
        }
    }

    /// Top-`k` ids nearest to `query`, probing `probe_clusters` lists
    /// (configured default if None)
    pub fn search(
        &self,
        query: &[f32],
        k: usize,
        probe_clusters: Option<usize>,
    ) -> Result<Vec<(RecordId, f32)>> {
        check_query(query)?;
        let probe = probe_clusters.unwrap_or(self.config.index.probe_clusters);
        let results = self.committed.read().index.search(query, k, probe)?;
        debug!(target: "pantry::db", k, probe, hits = results.len(), "Vector search");
        Ok(results)
    }

    /// Embed `text` then [`Database::search`]
    pub fn search_text(
        &self,
        text: &str,
        k: usize,
        probe_clusters: Option<usize>,
    ) -> Result<Vec<(RecordId, f32)>> {
        let query = self.embed_text(text)?;
        self.search(&query, k, probe_clusters)
    }

    /// Exact top-`k`, ignoring clusters
    pub fn search_exact(&self, query: &[f32], k: usize) -> Result<Vec<(RecordId, f32)>> {
        check_query(query)?;
        Ok(self.committed.read().index.search_exact(query, k)?)
    }

    /// Index shape summary
    pub fn index_stats(&self) -> IndexStats {
        self.committed.read().index.stats()
    }

    /// Ids present in the index, ascending
    pub fn indexed_ids(&self) -> Vec<RecordId> {
        self.committed.read().index.ids().collect()
    }
}

fn check_query(query: &[f32]) -> Result<()> {
    if query.iter().any(|x| !x.is_finite()) {
        return Err(Error::validation("query vector contains non-finite values"));
    }
    Ok(())
}

fn check_embedder(config: &PantryConfig, embedder: &dyn Embedder) -> Result<()> {
    if embedder.dimension() != config.dimension {
        return Err(Error::DimensionMismatch {
            expected: config.dimension,
            got: embedder.dimension(),
        });
    }
    Ok(())
}

/// Lazy, restartable scan returned by [`Database::scan`]
pub struct Scan<'a, F> {
    db: &'a Database,
    predicate: F,
    last: Option<RecordId>,
    done: bool,
}

impl<F> Iterator for Scan<'_, F>
where
    F: Fn(&Recipe) -> bool,
{
    type Item = Arc<Recipe>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let found = {
            let committed = self.db.committed.read();
            committed.store.next_matching(self.last, &self.predicate)
        };
        match found {
            Some(recipe) => {
                self.last = Some(recipe.id);
                Some(recipe)
            }
            None => {
                self.done = true;
                None
            }
        }
    }
}
