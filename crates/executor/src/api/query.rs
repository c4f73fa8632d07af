//! Retrieval: similarity, plans, natural-language requests.

use super::Pantry;
use crate::output::{PlanEstimate, ResultSet};
use crate::{Command, Error, Output, Result};
use pantry_core::{Plan, Recipe};

impl Pantry {
    /// The `k` recipes most similar to `text`, best first.
    ///
    /// Uses the configured probe count; ties are broken by lower id.
    pub fn similar(&self, text: &str, k: usize) -> Result<Vec<(Recipe, f32)>> {
        match self.executor.execute(Command::Similar {
            text: text.to_string(),
            k,
        })? {
            Output::Hits(hits) => Ok(hits.into_iter().map(|h| (h.recipe, h.score)).collect()),
            _ => Err(Error::Internal {
                reason: "Unexpected output for Similar".into(),
            }),
        }
    }

    /// Validate `plan` against the schema and run it.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let rows = db.execute(
    ///     Plan::select([Column::Name, Column::Similarity])
    ///         .filter(Predicate::bucket(DurationBucket::Short))
    ///         .similar_to_text("creamy soup")
    ///         .limit(5),
    /// )?;
    /// ```
    pub fn execute(&self, plan: Plan) -> Result<ResultSet> {
        match self.executor.execute(Command::Execute { plan })? {
            Output::Rows(rows) => Ok(rows),
            _ => Err(Error::Internal {
                reason: "Unexpected output for Execute".into(),
            }),
        }
    }

    /// Estimate what running `plan` would cost, without reading records.
    pub fn explain(&self, plan: Plan) -> Result<PlanEstimate> {
        match self.executor.execute(Command::Explain { plan })? {
            Output::Estimate(estimate) => Ok(estimate),
            _ => Err(Error::Internal {
                reason: "Unexpected output for Explain".into(),
            }),
        }
    }

    /// Translate a request into a validated plan without running it.
    pub fn translate(&self, request: &str) -> Result<Plan> {
        match self.executor.execute(Command::Translate {
            request: request.to_string(),
        })? {
            Output::Plan(plan) => Ok(plan),
            _ => Err(Error::Internal {
                reason: "Unexpected output for Translate".into(),
            }),
        }
    }

    /// Answer a natural-language request.
    ///
    /// Requests that ask to change data are refused with
    /// [`Error::Translation`] before any model is called.
    pub fn ask(&self, request: &str) -> Result<ResultSet> {
        match self.executor.execute(Command::Ask {
            request: request.to_string(),
        })? {
            Output::Rows(rows) => Ok(rows),
            _ => Err(Error::Internal {
                reason: "Unexpected output for Ask".into(),
            }),
        }
    }
}
