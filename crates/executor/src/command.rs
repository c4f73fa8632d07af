//! Command enum defining all Pantry operations.
//!
//! Commands are the "instruction set" of Pantry. Every operation that can be
//! performed through the executor is represented as a variant of this enum.
//!
//! Commands are:
//! - **Self-contained**: All parameters needed for execution are in the variant
//! - **Serializable**: Can be converted to/from JSON for cross-language use
//! - **Pure data**: No closures or executable code
//!
//! There are no update or delete commands: the store is append-only.

use pantry_core::{Plan, RecipeFields};
use serde::{Deserialize, Serialize};

/// A recipe to append, optionally with a precomputed embedding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewRecipe {
    /// Structured fields (`totalTime` accepted)
    #[serde(flatten)]
    pub fields: RecipeFields,
    /// Precomputed embedding; computed from the canonical text when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
}

impl From<RecipeFields> for NewRecipe {
    fn from(fields: RecipeFields) -> Self {
        NewRecipe {
            fields,
            embedding: None,
        }
    }
}

/// A command is a self-contained, serializable operation.
///
/// # Command Categories
///
/// | Category | Commands |
/// |----------|----------|
/// | Records | `AddRecipe`, `AddRecipes`, `GetRecipe`, `CountRecipes`, `ListRecipes` |
/// | Retrieval | `Similar`, `Execute`, `Explain` |
/// | Translation | `Translate`, `Ask` |
/// | Index | `BuildIndex`, `IndexStats` |
///
/// # Example
///
/// ```ignore
/// use pantry_executor::Command;
///
/// let cmd = Command::Similar { text: "Potatoes".into(), k: 3 };
/// let json = serde_json::to_string(&cmd)?;
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub enum Command {
    // ==================== Records ====================
    /// Append one recipe.
    /// Returns: `Output::RecipeId`
    AddRecipe {
        /// Recipe to append
        recipe: NewRecipe,
    },

    /// Append several recipes in order; stops at the first failure.
    /// Returns: `Output::RecipeIds`
    AddRecipes {
        /// Recipes to append
        recipes: Vec<NewRecipe>,
    },

    /// Fetch a recipe by id.
    /// Returns: `Output::Recipe`
    GetRecipe {
        /// Recipe id
        id: u64,
    },

    /// Number of recipes.
    /// Returns: `Output::Uint`
    CountRecipes,

    /// All recipes in id order.
    /// Returns: `Output::Recipes`
    ListRecipes,

    // ==================== Retrieval ====================
    /// Recipes most similar to a text.
    /// Returns: `Output::Hits`
    Similar {
        /// Query text, embedded with the database's embedder
        text: String,
        /// Number of hits
        k: usize,
    },

    /// Validate and run a plan.
    /// Returns: `Output::Rows`
    Execute {
        /// Plan to run
        plan: Plan,
    },

    /// Validate a plan and estimate its cost.
    /// Returns: `Output::Estimate`
    Explain {
        /// Plan to estimate
        plan: Plan,
    },

    // ==================== Translation ====================
    /// Turn a natural-language request into a plan without running it.
    /// Returns: `Output::Plan`
    Translate {
        /// Request text
        request: String,
    },

    /// Translate a request and run the plan.
    /// Returns: `Output::Rows`
    Ask {
        /// Request text
        request: String,
    },

    // ==================== Index ====================
    /// Recluster the vector index.
    /// Returns: `Output::IndexStats`
    BuildIndex {
        /// Cluster count; configured default when omitted
        #[serde(default, skip_serializing_if = "Option::is_none")]
        num_clusters: Option<usize>,
    },

    /// Vector index statistics.
    /// Returns: `Output::IndexStats`
    IndexStats,
}

impl Command {
    /// Name of the command, for logging
    pub fn name(&self) -> &'static str {
        match self {
            Command::AddRecipe { .. } => "AddRecipe",
            Command::AddRecipes { .. } => "AddRecipes",
            Command::GetRecipe { .. } => "GetRecipe",
            Command::CountRecipes => "CountRecipes",
            Command::ListRecipes => "ListRecipes",
            Command::Similar { .. } => "Similar",
            Command::Execute { .. } => "Execute",
            Command::Explain { .. } => "Explain",
            Command::Translate { .. } => "Translate",
            Command::Ask { .. } => "Ask",
            Command::BuildIndex { .. } => "BuildIndex",
            Command::IndexStats => "IndexStats",
        }
    }

    /// Whether the command appends data or rebuilds the index
    pub fn is_write(&self) -> bool {
        matches!(
            self,
            Command::AddRecipe { .. } | Command::AddRecipes { .. } | Command::BuildIndex { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pantry_core::Column;

    #[test]
    fn test_command_json_shape() {
        let cmd = Command::Similar {
            text: "Potatoes".into(),
            k: 3,
        };
        let json = serde_json::to_string(&cmd).unwrap();
        assert_eq!(json, r#"{"Similar":{"text":"Potatoes","k":3}}"#);
        assert_eq!(serde_json::from_str::<Command>(&json).unwrap(), cmd);
    }

    #[test]
    fn test_unknown_fields_rejected() {
        let json = r#"{"GetRecipe":{"id":1,"delete":true}}"#;
        assert!(serde_json::from_str::<Command>(json).is_err());
    }

    #[test]
    fn test_new_recipe_accepts_camel_case_and_embedding() {
        let json = r#"{
            "name": "Pesto",
            "description": "Basil sauce",
            "servings": 4,
            "totalTime": 10,
            "equipment": ["Blender"],
            "ingredients": [{"item": "Basil", "amount": 50, "unit": "grams"}],
            "steps": ["Blend."],
            "embedding": [0.1, 0.2]
        }"#;
        let recipe: NewRecipe = serde_json::from_str(json).unwrap();
        assert_eq!(recipe.fields.total_time, 10);
        assert_eq!(recipe.embedding, Some(vec![0.1, 0.2]));
    }

    #[test]
    fn test_execute_round_trip() {
        let cmd = Command::Execute {
            plan: Plan::select([Column::Name]).limit(2),
        };
        let json = serde_json::to_string(&cmd).unwrap();
        assert_eq!(serde_json::from_str::<Command>(&json).unwrap(), cmd);
        assert!(!cmd.is_write());
    }
}
