//! Recipe aggregate: a recipe with its ordered ingredients and steps

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Recipe entity together with its owned ingredients and steps
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recipe {
    pub id: i64,
    pub title: String,
    #[serde(rename = "type")]
    pub recipe_type: String,
    pub min_time: i64,
    pub max_time: i64,
    /// Relative path of the normalized image, e.g. `static/uploads/<name>.jpg`
    pub image: Option<String>,
    pub author_id: i64,
    pub ingredients: Vec<Ingredient>,
    pub steps: Vec<Step>,
}

/// Ingredient row, owned by exactly one recipe
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Ingredient {
    pub id: i64,
    pub recipe_id: i64,
    pub name: String,
    pub qty: String,
}

/// Step row, owned by exactly one recipe
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Step {
    pub id: i64,
    pub recipe_id: i64,
    pub order: i64,
    pub description: String,
}

/// Ingredient parsed from a text block, not yet persisted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewIngredient {
    pub name: String,
    pub qty: String,
}

/// Step parsed from a text block, not yet persisted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStep {
    pub order: i64,
    pub description: String,
}

/// Validated recipe input for create and update
#[derive(Debug, Clone)]
pub struct RecipeDraft {
    pub title: String,
    pub recipe_type: String,
    pub min_time: i64,
    pub max_time: i64,
    pub ingredients: Vec<NewIngredient>,
    pub steps: Vec<NewStep>,
}

/// Listing filter, read from the index page query string
///
/// Every field is optional; present fields combine with AND. Empty strings
/// are treated as absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecipeFilter {
    /// Case-insensitive substring of the title
    #[serde(rename = "q")]
    pub title_substring: Option<String>,
    /// Case-insensitive full match of the type
    #[serde(rename = "type")]
    pub type_exact: Option<String>,
    /// Case-insensitive substring of any ingredient name
    #[serde(rename = "ingredient")]
    pub ingredient_substring: Option<String>,
}

impl RecipeFilter {
    /// Check whether a recipe passes every present criterion
    pub fn matches(&self, recipe: &Recipe) -> bool {
        if let Some(q) = non_empty(&self.title_substring) {
            if !recipe.title.to_lowercase().contains(&q.to_lowercase()) {
                return false;
            }
        }

        if let Some(t) = non_empty(&self.type_exact) {
            if recipe.recipe_type.to_lowercase() != t.to_lowercase() {
                return false;
            }
        }

        if let Some(needle) = non_empty(&self.ingredient_substring) {
            let needle = needle.to_lowercase();
            if !recipe
                .ingredients
                .iter()
                .any(|ing| ing.name.to_lowercase().contains(&needle))
            {
                return false;
            }
        }

        true
    }

    /// Keep only the recipes that match, preserving order
    pub fn apply(&self, recipes: Vec<Recipe>) -> Vec<Recipe> {
        recipes.into_iter().filter(|r| self.matches(r)).collect()
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}
