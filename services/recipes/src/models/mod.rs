//! Recipe service models

pub mod recipe;
pub mod user;

// Re-export for convenience
pub use recipe::{Ingredient, NewIngredient, NewStep, Recipe, RecipeDraft, RecipeFilter, Step};
pub use user::{Credentials, NewUser, User};
