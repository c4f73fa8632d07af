//! Inverted-file (IVF) vector index
//!
//! Vectors are partitioned into clusters around k-means centroids. A search
//! ranks the centroids against the query, probes the nearest
//! `probe_clusters` of them and scores their members exactly.
//!
//! Lifecycle:
//! - Unbuilt: inserts are buffered and every search is a linear scan.
//! - Lazy build: once the population reaches `min_build_population` (and at
//!   least `num_clusters`), the first insert to cross it clusters everything.
//! - Built: inserts join the nearest existing centroid. Centroids only move
//!   on an explicit rebuild.
//!
//! Ordering: results are sorted by (score desc, RecordId asc). Centroid ties
//! resolve to the lower cluster index.

use super::distance::DistanceMetric;
use super::error::{IndexError, IndexResult};
use super::kmeans::{self, KMeansParams};
use pantry_core::RecordId;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Static parameters of an index
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IvfParams {
    /// Cluster count used by the lazy build
    pub num_clusters: usize,
    /// Population at which the lazy build runs
    pub min_build_population: usize,
    /// k-means settings
    pub kmeans: KMeansParams,
}

impl Default for IvfParams {
    fn default() -> Self {
        IvfParams {
            num_clusters: 8,
            min_build_population: 64,
            kmeans: KMeansParams::default(),
        }
    }
}

/// One inverted list
#[derive(Debug, Clone, PartialEq)]
pub struct Cluster {
    /// Cluster centroid
    pub centroid: Vec<f32>,
    /// Member ids in ascending order
    pub members: Vec<RecordId>,
}

/// Computed clustering, ready to be installed with [`IvfIndex::install`]
#[derive(Debug, Clone)]
pub struct Clustering {
    clusters: Vec<Cluster>,
    /// Population the clustering was computed over
    trained_on: usize,
    iterations: usize,
}

impl Clustering {
    /// Number of clusters
    pub fn num_clusters(&self) -> usize {
        self.clusters.len()
    }
}

/// Summary of the index shape
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexStats {
    /// Whether clusters exist
    pub built: bool,
    /// Indexed vectors
    pub len: usize,
    /// Embedding dimension
    pub dimension: usize,
    /// Metric name
    pub metric: String,
    /// Number of clusters (0 when unbuilt)
    pub num_clusters: usize,
    /// Members per cluster, in cluster order
    pub cluster_sizes: Vec<usize>,
}

impl IndexStats {
    /// Vectors compared when probing `probe` clusters: centroids plus the
    /// expected members of the probed lists
    pub fn estimated_comparisons(&self, probe: usize) -> (usize, usize) {
        if !self.built || self.num_clusters == 0 {
            return (0, self.len);
        }
        let probed = probe.min(self.num_clusters);
        let expected_members =
            (self.len as f64 * probed as f64 / self.num_clusters as f64).ceil() as usize;
        (probed, self.num_clusters + expected_members)
    }
}

/// IVF index over record embeddings
#[derive(Debug, Clone)]
pub struct IvfIndex {
    dimension: usize,
    metric: DistanceMetric,
    params: IvfParams,
    /// All entries, in id order
    vectors: BTreeMap<RecordId, Vec<f32>>,
    /// Empty until built
    clusters: Vec<Cluster>,
    /// Set once the automatic build has run, whatever its outcome
    lazy_build_attempted: bool,
}

impl IvfIndex {
    /// Create an empty, unbuilt index
    pub fn new(dimension: usize, metric: DistanceMetric, params: IvfParams) -> Self {
        IvfIndex {
            dimension,
            metric,
            params,
            vectors: BTreeMap::new(),
            clusters: Vec::new(),
            lazy_build_attempted: false,
        }
    }

    /// Embedding dimension
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Distance metric
    pub fn metric(&self) -> DistanceMetric {
        self.metric
    }

    /// Number of indexed vectors
    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    /// True if no vectors are indexed
    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// True once clusters exist
    pub fn is_built(&self) -> bool {
        !self.clusters.is_empty()
    }

    /// Current cluster count (0 when unbuilt)
    pub fn num_clusters(&self) -> usize {
        self.clusters.len()
    }

    /// Current clusters
    pub fn clusters(&self) -> &[Cluster] {
        &self.clusters
    }

    /// Whether an entry exists for `id`
    pub fn contains(&self, id: RecordId) -> bool {
        self.vectors.contains_key(&id)
    }

    /// Stored vector for `id`
    pub fn get(&self, id: RecordId) -> Option<&[f32]> {
        self.vectors.get(&id).map(|v| v.as_slice())
    }

    /// Ids of all entries, ascending
    pub fn ids(&self) -> impl Iterator<Item = RecordId> + '_ {
        self.vectors.keys().copied()
    }

    fn check_dimension(&self, len: usize) -> IndexResult<()> {
        if len != self.dimension {
            return Err(IndexError::DimensionMismatch {
                expected: self.dimension,
                got: len,
            });
        }
        Ok(())
    }

    /// Compute a clustering of the current entries without modifying the index.
    ///
    /// Fails if `num_clusters < 1` or `num_clusters > len()`.
    pub fn train(&self, num_clusters: usize) -> IndexResult<Clustering> {
        let n = self.vectors.len();
        if num_clusters < 1 {
            return Err(IndexError::Build("num_clusters must be at least 1".into()));
        }
        if num_clusters > n {
            return Err(IndexError::Build(format!(
                "num_clusters {} exceeds vector count {}",
                num_clusters, n
            )));
        }

        let ids: Vec<RecordId> = self.vectors.keys().copied().collect();
        let refs: Vec<&[f32]> = self.vectors.values().map(|v| v.as_slice()).collect();
        let result = kmeans::train(&refs, num_clusters, self.metric, &self.params.kmeans);

        let mut clusters: Vec<Cluster> = result
            .centroids
            .into_iter()
            .map(|centroid| Cluster {
                centroid,
                members: Vec::new(),
            })
            .collect();
        // ids are ascending, so member lists come out ascending
        for (id, c) in ids.into_iter().zip(result.assignments) {
            clusters[c].members.push(id);
        }

        Ok(Clustering {
            clusters,
            trained_on: n,
            iterations: result.iterations,
        })
    }

    /// Replace the clusters with a computed clustering.
    ///
    /// Entries added after the clustering was trained are assigned to their
    /// nearest new centroid.
    pub fn install(&mut self, clustering: Clustering) {
        let Clustering {
            clusters,
            trained_on,
            iterations,
        } = clustering;
        self.clusters = clusters;

        if trained_on < self.vectors.len() {
            let assigned: std::collections::BTreeSet<RecordId> = self
                .clusters
                .iter()
                .flat_map(|c| c.members.iter().copied())
                .collect();
            let late: Vec<RecordId> = self
                .vectors
                .keys()
                .filter(|id| !assigned.contains(id))
                .copied()
                .collect();
            for id in late {
                self.assign(id);
            }
        }

        info!(
            target: "pantry::index",
            num_clusters = self.clusters.len(),
            vectors = self.vectors.len(),
            iterations,
            "Index built"
        );
    }

    /// Cluster all entries into `num_clusters` lists, replacing any existing
    /// clustering.
    pub fn build(&mut self, num_clusters: usize) -> IndexResult<()> {
        let clustering = self.train(num_clusters)?;
        self.install(clustering);
        Ok(())
    }

    /// Add an entry.
    ///
    /// Built indexes assign it to the nearest centroid. Unbuilt indexes run
    /// the lazy build once the population threshold is reached. On error the
    /// index is unchanged.
    pub fn insert(&mut self, id: RecordId, vector: Vec<f32>) -> IndexResult<()> {
        self.check_dimension(vector.len())?;
        if self.vectors.contains_key(&id) {
            return Err(IndexError::DuplicateId(id));
        }
        self.vectors.insert(id, vector);

        if self.is_built() {
            self.assign(id);
        } else if self.wants_lazy_build() {
            self.lazy_build();
        }
        debug!(target: "pantry::index", id = %id, built = self.is_built(), "Inserted vector");
        Ok(())
    }

    /// Load many entries, then run the lazy build at most once.
    ///
    /// Used when rebuilding the index from the record log.
    pub fn bulk_load(
        &mut self,
        entries: impl IntoIterator<Item = (RecordId, Vec<f32>)>,
    ) -> IndexResult<()> {
        for (id, vector) in entries {
            self.check_dimension(vector.len())?;
            if self.vectors.insert(id, vector).is_some() {
                return Err(IndexError::DuplicateId(id));
            }
            if self.is_built() {
                self.assign(id);
            }
        }
        if !self.is_built() && self.wants_lazy_build() {
            self.lazy_build();
        }
        Ok(())
    }

    fn wants_lazy_build(&self) -> bool {
        let n = self.vectors.len();
        !self.lazy_build_attempted
            && n >= self.params.min_build_population
            && n >= self.params.num_clusters
    }

    /// Runs at most once per index; later builds are explicit
    fn lazy_build(&mut self) {
        self.lazy_build_attempted = true;
        match self.build(self.params.num_clusters) {
            Ok(()) => {}
            Err(e) => {
                warn!(
                    target: "pantry::index",
                    error = %e,
                    "Lazy index build failed, staying on linear scan"
                );
            }
        }
    }

    fn assign(&mut self, id: RecordId) {
        let Some(vector) = self.vectors.get(&id) else {
            return;
        };
        let c = nearest_cluster(vector, &self.clusters, self.metric);
        let members = &mut self.clusters[c].members;
        // Ids normally arrive ascending; keep lists sorted regardless
        match members.last() {
            Some(last) if *last > id => {
                let pos = members.partition_point(|m| *m < id);
                members.insert(pos, id);
            }
            _ => members.push(id),
        }
    }

    /// Top-`k` entries nearest to `query`, probing `probe_clusters` lists.
    ///
    /// `probe_clusters` is clamped to the cluster count; probing every
    /// cluster is an exact search. Unbuilt indexes scan linearly.
    pub fn search(
        &self,
        query: &[f32],
        k: usize,
        probe_clusters: usize,
    ) -> IndexResult<Vec<(RecordId, f32)>> {
        if k == 0 {
            return Err(IndexError::InvalidArgument("k must be at least 1".into()));
        }
        if probe_clusters == 0 {
            return Err(IndexError::InvalidArgument(
                "probe_clusters must be at least 1".into(),
            ));
        }
        self.check_dimension(query.len())?;

        let mut results: Vec<(RecordId, f32)> = if self.is_built() {
            let probed = self.probe_order(query, probe_clusters);
            probed
                .iter()
                .flat_map(|&c| self.clusters[c].members.iter())
                .filter_map(|id| {
                    self.vectors
                        .get(id)
                        .map(|v| (*id, self.metric.score(query, v)))
                })
                .collect()
        } else {
            self.vectors
                .iter()
                .map(|(id, v)| (*id, self.metric.score(query, v)))
                .collect()
        };

        sort_ranked(&mut results);
        results.truncate(k);
        Ok(results)
    }

    /// Exact top-`k` over every entry, ignoring clusters
    pub fn search_exact(&self, query: &[f32], k: usize) -> IndexResult<Vec<(RecordId, f32)>> {
        if k == 0 {
            return Err(IndexError::InvalidArgument("k must be at least 1".into()));
        }
        self.check_dimension(query.len())?;
        let mut results: Vec<(RecordId, f32)> = self
            .vectors
            .iter()
            .map(|(id, v)| (*id, self.metric.score(query, v)))
            .collect();
        sort_ranked(&mut results);
        results.truncate(k);
        Ok(results)
    }

    /// Indices of the `probe` clusters nearest to `query`
    fn probe_order(&self, query: &[f32], probe: usize) -> Vec<usize> {
        let mut ranked: Vec<(usize, f32)> = self
            .clusters
            .iter()
            .enumerate()
            .map(|(i, c)| (i, self.metric.distance(query, &c.centroid)))
            .collect();
        ranked.sort_by(|(ia, da), (ib, db)| {
            da.partial_cmp(db)
                .unwrap_or(Ordering::Equal)
                .then_with(|| ia.cmp(ib))
        });
        ranked
            .into_iter()
            .take(probe.min(self.clusters.len()))
            .map(|(i, _)| i)
            .collect()
    }

    /// Shape summary
    pub fn stats(&self) -> IndexStats {
        IndexStats {
            built: self.is_built(),
            len: self.vectors.len(),
            dimension: self.dimension,
            metric: self.metric.to_string(),
            num_clusters: self.clusters.len(),
            cluster_sizes: self.clusters.iter().map(|c| c.members.len()).collect(),
        }
    }
}

/// Nearest cluster by centroid distance, ties to the lower index
fn nearest_cluster(vector: &[f32], clusters: &[Cluster], metric: DistanceMetric) -> usize {
    let mut best = 0;
    let mut best_dist = f32::INFINITY;
    for (i, c) in clusters.iter().enumerate() {
        let d = metric.distance(vector, &c.centroid);
        if d < best_dist {
            best_dist = d;
            best = i;
        }
    }
    best
}

/// Sort by (score desc, RecordId asc)
pub fn sort_ranked(results: &mut [(RecordId, f32)]) {
    results.sort_by(|(id_a, score_a), (id_b, score_b)| {
        score_b
            .partial_cmp(score_a)
            .unwrap_or(Ordering::Equal)
            .then_with(|| id_a.cmp(id_b))
    });
}
