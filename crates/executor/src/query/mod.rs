//! Hybrid query executor
//!
//! Answers a [`ValidatedPlan`] against the database:
//!
//! - **Similarity plans** fetch `limit * overfetch_factor` candidates from
//!   the vector index (configured probe count), keep the ones passing the
//!   filters in rank order, and truncate to `limit`. There is no second
//!   fetch round, so heavy filters can return fewer than `limit` rows.
//! - **Filter-only plans** scan in ascending id order and stop at `limit`.
//! - **Grouped plans** count matching records per key, then keep the first
//!   `limit` groups. With a similarity clause the counted records are all
//!   fetched candidates that pass the filters.
//!
//! Query embedding happens before any database lock is taken.

pub mod aggregate;
pub mod filter;

use crate::output::{PlanEstimate, ResultSet, Row, Strategy};
use aggregate::group_counts;
use filter::{matches_all, project};
use pantry_core::{Column, Error, Recipe, Result, SimilarityQuery, Value, ValidatedPlan};
use pantry_engine::Database;
use std::sync::Arc;
use tracing::debug;

/// Records selected by a plan, with weighted similarity when ranked
struct Selection {
    records: Vec<(Arc<Recipe>, Option<f32>)>,
}

/// Executes validated plans against a database
#[derive(Debug, Clone)]
pub struct QueryExecutor {
    db: Arc<Database>,
}

impl QueryExecutor {
    /// Executor over `db`
    pub fn new(db: Arc<Database>) -> Self {
        QueryExecutor { db }
    }

    fn effective_limit(&self, plan: &ValidatedPlan) -> usize {
        plan.limit()
            .unwrap_or(self.db.config().query.default_limit)
    }

    fn candidate_count(&self, plan: &ValidatedPlan) -> usize {
        self.effective_limit(plan)
            .saturating_mul(self.db.config().query.overfetch_factor)
            .max(1)
    }

    /// Run `plan` and return its rows
    pub fn execute(&self, plan: &ValidatedPlan) -> Result<ResultSet> {
        let selection = match plan.similarity() {
            Some(sim) => {
                let query = match &sim.query {
                    SimilarityQuery::Text(text) => self.db.embed_text(text)?,
                    SimilarityQuery::Vector(v) => {
                        let dimension = self.db.config().dimension;
                        if v.len() != dimension {
                            return Err(Error::validation(format!(
                                "similarity vector has {} components, expected {}",
                                v.len(),
                                dimension
                            )));
                        }
                        v.clone()
                    }
                };
                self.select_similar(plan, &query, sim.weight)?
            }
            None => self.select_scan(plan),
        };

        let result = match plan.group_by() {
            Some(column) => self.grouped_rows(plan, column, &selection),
            None => self.projected_rows(plan, &selection),
        };
        debug!(
            target: "pantry::executor",
            rows = result.len(),
            similarity = plan.similarity().is_some(),
            grouped = plan.group_by().is_some(),
            "Executed plan"
        );
        Ok(result)
    }

    fn select_similar(&self, plan: &ValidatedPlan, query: &[f32], weight: f32) -> Result<Selection> {
        let k = self.candidate_count(plan);
        // Grouped plans count every kept candidate; their limit applies to groups
        let limit = match plan.group_by() {
            Some(_) => usize::MAX,
            None => self.effective_limit(plan),
        };
        let candidates = self.db.search(query, k, None)?;
        let ids: Vec<_> = candidates.iter().map(|(id, _)| *id).collect();
        let recipes = self.db.get_many(&ids)?;
        let buckets = self.db.config().buckets();

        let fetched = candidates.len();
        let records: Vec<_> = recipes
            .into_iter()
            .zip(candidates)
            .filter(|(recipe, _)| matches_all(recipe, plan.filters(), &buckets))
            .take(limit)
            .map(|(recipe, (_, score))| (recipe, Some(weight * score)))
            .collect();
        debug!(
            target: "pantry::executor",
            fetched,
            kept = records.len(),
            limit,
            "Filtered similarity candidates"
        );
        Ok(Selection { records })
    }

    fn select_scan(&self, plan: &ValidatedPlan) -> Selection {
        let buckets = self.db.config().buckets();
        let filters = plan.filters().to_vec();
        let scan = self
            .db
            .scan(move |r: &Recipe| matches_all(r, &filters, &buckets));
        // Grouped plans count every match; their limit applies to groups
        let limit = match plan.group_by() {
            Some(_) => usize::MAX,
            None => plan.limit().unwrap_or(usize::MAX),
        };
        Selection {
            records: scan.take(limit).map(|r| (r, None)).collect(),
        }
    }

    fn projected_rows(&self, plan: &ValidatedPlan, selection: &Selection) -> ResultSet {
        let buckets = self.db.config().buckets();
        let columns = plan.columns();
        let rows = selection
            .records
            .iter()
            .map(|(recipe, score)| {
                let mut row = Row::new();
                for column in columns {
                    row.push(column.as_str(), project(recipe, *column, *score, &buckets));
                }
                row
            })
            .collect();
        ResultSet {
            columns: columns.iter().map(|c| c.as_str().to_string()).collect(),
            rows,
        }
    }

    fn grouped_rows(&self, plan: &ValidatedPlan, column: Column, selection: &Selection) -> ResultSet {
        let buckets = self.db.config().buckets();
        let mut groups = group_counts(
            selection.records.iter().map(|(r, _)| r.as_ref()),
            column,
            &buckets,
        );
        if let Some(limit) = plan.limit() {
            groups.truncate(limit);
        }
        let rows = groups
            .into_iter()
            .map(|(key, count)| {
                let mut row = Row::new();
                row.push(column.as_str(), Value::from(key));
                row.push(Column::Count.as_str(), Value::Int(count as i64));
                row
            })
            .collect();
        ResultSet {
            columns: vec![column.as_str().to_string(), Column::Count.as_str().to_string()],
            rows,
        }
    }

    /// Estimate the work `execute` would do, without reading records
    pub fn explain(&self, plan: &ValidatedPlan) -> PlanEstimate {
        match plan.similarity() {
            None => {
                let count = self.db.count();
                PlanEstimate {
                    strategy: Strategy::FullScan,
                    clusters_probed: 0,
                    vectors_compared: 0,
                    candidates_fetched: 0,
                    records_examined: count,
                }
            }
            Some(_) => {
                let stats = self.db.index_stats();
                let probe = self.db.config().index.probe_clusters;
                let (clusters_probed, vectors_compared) = stats.estimated_comparisons(probe);
                let members = vectors_compared - stats.num_clusters.min(vectors_compared);
                let fetched = self.candidate_count(plan).min(members);
                PlanEstimate {
                    strategy: Strategy::SimilarityProbe,
                    clusters_probed,
                    vectors_compared,
                    candidates_fetched: fetched,
                    records_examined: fetched,
                }
            }
        }
    }
}
