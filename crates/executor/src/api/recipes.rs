//! Record operations: append, fetch, list, scan, seed.

use super::Pantry;
use crate::command::NewRecipe;
use crate::{Command, Error, Output, Result};
use pantry_core::{Recipe, RecipeFields, RecordId};
use pantry_engine::Scan;

impl Pantry {
    /// Append a recipe, embedding its canonical text.
    ///
    /// Returns the assigned id. Nothing is stored if validation, embedding
    /// or persistence fails.
    pub fn add_recipe(&self, fields: RecipeFields) -> Result<RecordId> {
        self.add(NewRecipe::from(fields))
    }

    /// Append a recipe with a precomputed embedding.
    pub fn add_recipe_with_embedding(
        &self,
        fields: RecipeFields,
        embedding: Vec<f32>,
    ) -> Result<RecordId> {
        self.add(NewRecipe {
            fields,
            embedding: Some(embedding),
        })
    }

    fn add(&self, recipe: NewRecipe) -> Result<RecordId> {
        match self.executor.execute(Command::AddRecipe { recipe })? {
            Output::RecipeId(id) => Ok(RecordId::new(id)),
            _ => Err(Error::Internal {
                reason: "Unexpected output for AddRecipe".into(),
            }),
        }
    }

    /// Load a JSON array of recipes and append each in order.
    ///
    /// Objects use the generator shape (`name, description, servings,
    /// equipment, ingredients, steps, totalTime`) and may carry a
    /// precomputed `embedding`. Appending stops at the first invalid recipe;
    /// recipes before it stay committed.
    pub fn seed_from_json(&self, json: &str) -> Result<Vec<RecordId>> {
        let recipes: Vec<NewRecipe> = serde_json::from_str(json)?;
        match self.executor.execute(Command::AddRecipes { recipes })? {
            Output::RecipeIds(ids) => Ok(ids.into_iter().map(RecordId::new).collect()),
            _ => Err(Error::Internal {
                reason: "Unexpected output for AddRecipes".into(),
            }),
        }
    }

    /// Fetch a recipe by id.
    pub fn get(&self, id: RecordId) -> Result<Recipe> {
        match self.executor.execute(Command::GetRecipe { id: id.as_u64() })? {
            Output::Recipe(recipe) => Ok(recipe),
            _ => Err(Error::Internal {
                reason: "Unexpected output for GetRecipe".into(),
            }),
        }
    }

    /// Number of recipes.
    pub fn count(&self) -> Result<u64> {
        match self.executor.execute(Command::CountRecipes)? {
            Output::Uint(n) => Ok(n),
            _ => Err(Error::Internal {
                reason: "Unexpected output for CountRecipes".into(),
            }),
        }
    }

    /// All recipes in id order.
    pub fn recipes(&self) -> Result<Vec<Recipe>> {
        match self.executor.execute(Command::ListRecipes)? {
            Output::Recipes(recipes) => Ok(recipes),
            _ => Err(Error::Internal {
                reason: "Unexpected output for ListRecipes".into(),
            }),
        }
    }

    /// Lazily iterate recipes matching `predicate` in ascending id order.
    ///
    /// The scan sees recipes appended while it runs.
    pub fn scan<F>(&self, predicate: F) -> Scan<'_, F>
    where
        F: Fn(&Recipe) -> bool,
    {
        self.database().scan(predicate)
    }
}
