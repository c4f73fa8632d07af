//! Recipe record types
//!
//! This module defines:
//! - RecordId: store-assigned, monotonically increasing identifier
//! - Ingredient: one typed ingredient line
//! - RecipeFields: the structured fields supplied by callers
//! - Recipe: a committed record (id + fields)
//!
//! Nested sequences are explicit typed records, validated at the store
//! boundary by [`RecipeFields::validate`].

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Record identifier
///
/// IMPORTANT: RecordIds are never reused. The first record gets id 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub u64);

impl RecordId {
    /// Create a new RecordId
    pub fn new(id: u64) -> Self {
        RecordId(id)
    }

    /// Get the underlying u64 value
    pub fn as_u64(&self) -> u64 {
        self.0
    }

    /// The id following this one
    pub fn next(&self) -> RecordId {
        RecordId(self.0 + 1)
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One ingredient line of a recipe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Ingredient {
    /// Name of the ingredient
    pub item: String,
    /// Quantity of the ingredient
    pub amount: f64,
    /// Unit of measurement, if any ("grams", "cups", "pinch", ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

impl Ingredient {
    /// Create an ingredient with a unit
    pub fn new(item: impl Into<String>, amount: f64, unit: impl Into<String>) -> Self {
        Ingredient {
            item: item.into(),
            amount,
            unit: Some(unit.into()),
        }
    }

    /// Create a unitless ingredient ("2 eggs")
    pub fn counted(item: impl Into<String>, amount: f64) -> Self {
        Ingredient {
            item: item.into(),
            amount,
            unit: None,
        }
    }
}

/// Structured recipe fields as supplied by callers
///
/// Deserializes from the camelCase JSON shape used by recipe generators
/// (`totalTime`) as well as snake_case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeFields {
    /// Name of the recipe
    pub name: String,
    /// Two or three sentence description
    pub description: String,
    /// Number of people the recipe serves
    pub servings: i64,
    /// Total cooking time in minutes
    #[serde(alias = "totalTime")]
    pub total_time: i64,
    /// Kitchen equipment needed
    #[serde(default)]
    pub equipment: Vec<String>,
    /// Ingredients with quantities
    #[serde(default)]
    pub ingredients: Vec<Ingredient>,
    /// Step-by-step instructions
    #[serde(default)]
    pub steps: Vec<String>,
}

impl RecipeFields {
    /// Validate the fields for insertion
    ///
    /// Checks:
    /// - name and description are non-blank
    /// - servings and total_time are positive
    /// - every ingredient has a non-blank item and a finite, non-negative amount
    /// - no blank equipment or step entries
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::validation("name must not be empty"));
        }
        if self.description.trim().is_empty() {
            return Err(Error::validation("description must not be empty"));
        }
        if self.servings <= 0 {
            return Err(Error::validation(format!(
                "servings must be a positive integer, got {}",
                self.servings
            )));
        }
        if self.total_time <= 0 {
            return Err(Error::validation(format!(
                "total_time must be a positive integer, got {}",
                self.total_time
            )));
        }
        for (i, ingredient) in self.ingredients.iter().enumerate() {
            if ingredient.item.trim().is_empty() {
                return Err(Error::validation(format!(
                    "ingredient {} has an empty item",
                    i
                )));
            }
            if !ingredient.amount.is_finite() || ingredient.amount < 0.0 {
                return Err(Error::validation(format!(
                    "ingredient '{}' has invalid amount {}",
                    ingredient.item, ingredient.amount
                )));
            }
        }
        if self.equipment.iter().any(|e| e.trim().is_empty()) {
            return Err(Error::validation("equipment entries must not be empty"));
        }
        if self.steps.iter().any(|s| s.trim().is_empty()) {
            return Err(Error::validation("steps must not be empty"));
        }
        Ok(())
    }

    /// Canonical text the record's embedding is computed from
    ///
    /// `"Recipe: {name}. Description: {description}"`, optionally followed by
    /// `" Ingredients: a, b, c"`.
    pub fn canonical_text(&self, include_ingredients: bool) -> String {
        let mut text = format!("Recipe: {}. Description: {}", self.name, self.description);
        if include_ingredients && !self.ingredients.is_empty() {
            let items: Vec<&str> = self.ingredients.iter().map(|i| i.item.as_str()).collect();
            text.push_str(" Ingredients: ");
            text.push_str(&items.join(", "));
        }
        text
    }
}

/// A committed recipe record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    /// Store-assigned id
    pub id: RecordId,
    /// Structured fields
    #[serde(flatten)]
    pub fields: RecipeFields,
}

impl Recipe {
    /// Create a recipe from an id and validated fields
    pub fn new(id: RecordId, fields: RecipeFields) -> Self {
        Recipe { id, fields }
    }

    /// Recipe name
    pub fn name(&self) -> &str {
        &self.fields.name
    }
}
