//! The Executor - single entry point to Pantry's engine.
//!
//! The Executor is a stateless dispatcher that routes commands to the
//! database, the query executor and the translator, and converts results
//! to outputs.

use std::sync::Arc;

use pantry_core::{Plan, Recipe, RecordId, ValidatedPlan};
use pantry_engine::Database;
use pantry_intelligence::{find_mutating_intent, QueryTranslator, TranslateError};
use tracing::debug;

use crate::command::NewRecipe;
use crate::output::SimilarHit;
use crate::query::QueryExecutor;
use crate::{Command, Output, Result};

/// The command executor.
///
/// Holds the database, a query executor over it, and an optional
/// translator for natural-language requests. All state lives in the
/// database.
///
/// # Thread Safety
///
/// Executor is `Send + Sync` and can be shared across threads.
///
/// # Example
///
/// ```ignore
/// use pantry_executor::{Command, Executor, Output};
///
/// let executor = Executor::new(db, None);
/// let out = executor.execute(Command::CountRecipes)?;
/// assert_eq!(out, Output::Uint(0));
/// ```
pub struct Executor {
    db: Arc<Database>,
    query: QueryExecutor,
    translator: Option<QueryTranslator>,
}

impl Executor {
    /// Create a new executor; without a translator `Ask` and `Translate`
    /// fail with a translation error.
    pub fn new(db: Arc<Database>, translator: Option<QueryTranslator>) -> Self {
        Self {
            query: QueryExecutor::new(db.clone()),
            db,
            translator,
        }
    }

    /// The underlying database
    pub fn database(&self) -> &Arc<Database> {
        &self.db
    }

    /// Whether natural-language requests can be answered
    pub fn has_translator(&self) -> bool {
        self.translator.is_some()
    }

    /// Execute a single command.
    pub fn execute(&self, cmd: Command) -> Result<Output> {
        debug!(target: "pantry::executor", command = cmd.name(), "Executing command");
        match cmd {
            Command::AddRecipe { recipe } => Ok(Output::RecipeId(self.add(recipe)?.as_u64())),
            Command::AddRecipes { recipes } => {
                let mut ids = Vec::with_capacity(recipes.len());
                for recipe in recipes {
                    ids.push(self.add(recipe)?.as_u64());
                }
                Ok(Output::RecipeIds(ids))
            }
            Command::GetRecipe { id } => {
                let recipe = self.db.get(RecordId::new(id))?;
                Ok(Output::Recipe(Recipe::clone(&recipe)))
            }
            Command::CountRecipes => Ok(Output::Uint(self.db.count() as u64)),
            Command::ListRecipes => Ok(Output::Recipes(
                self.db
                    .recipes()
                    .iter()
                    .map(|r| Recipe::clone(r))
                    .collect(),
            )),
            Command::Similar { text, k } => {
                let hits = self.db.search_text(&text, k, None)?;
                let ids: Vec<RecordId> = hits.iter().map(|(id, _)| *id).collect();
                let recipes = self.db.get_many(&ids)?;
                Ok(Output::Hits(
                    recipes
                        .into_iter()
                        .zip(hits)
                        .map(|(recipe, (_, score))| SimilarHit {
                            recipe: Recipe::clone(&recipe),
                            score,
                        })
                        .collect(),
                ))
            }
            Command::Execute { plan } => {
                let plan = self.validate(plan)?;
                Ok(Output::Rows(self.query.execute(&plan)?))
            }
            Command::Explain { plan } => {
                let plan = self.validate(plan)?;
                Ok(Output::Estimate(self.query.explain(&plan)))
            }
            Command::Translate { request } => {
                Ok(Output::Plan(self.translate(&request)?.into_inner()))
            }
            Command::Ask { request } => {
                let plan = self.translate(&request)?;
                Ok(Output::Rows(self.query.execute(&plan)?))
            }
            Command::BuildIndex { num_clusters } => {
                Ok(Output::IndexStats(self.db.build(num_clusters)?))
            }
            Command::IndexStats => Ok(Output::IndexStats(self.db.index_stats())),
        }
    }

    /// Execute a sequence of commands, collecting each result.
    pub fn execute_many(&self, cmds: Vec<Command>) -> Vec<Result<Output>> {
        cmds.into_iter().map(|cmd| self.execute(cmd)).collect()
    }

    fn add(&self, recipe: NewRecipe) -> Result<RecordId> {
        let id = match recipe.embedding {
            Some(vector) => self.db.append(recipe.fields, vector)?,
            None => self.db.add(recipe.fields)?,
        };
        Ok(id)
    }

    fn validate(&self, plan: Plan) -> Result<ValidatedPlan> {
        Ok(plan.validate(self.db.schema())?)
    }

    fn translate(&self, request: &str) -> Result<ValidatedPlan> {
        let translator = match &self.translator {
            Some(t) => t,
            None => {
                if let Some(word) = find_mutating_intent(request) {
                    return Err(TranslateError::MutatingIntent(word).into());
                }
                return Err(TranslateError::NoProposer.into());
            }
        };
        Ok(translator.translate(request, self.db.schema())?)
    }
}

impl std::fmt::Debug for Executor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Executor")
            .field("db", &self.db)
            .field("translator", &self.translator.is_some())
            .finish()
    }
}
