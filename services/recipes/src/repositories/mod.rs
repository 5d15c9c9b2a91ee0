//! Repositories for database operations

pub mod recipe;
pub mod user;

pub use recipe::RecipeRepository;
pub use user::UserRepository;
