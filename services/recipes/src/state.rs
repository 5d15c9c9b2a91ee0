//! Application state shared across handlers

use sqlx::SqlitePool;

use crate::{
    config::Settings,
    credentials::CredentialStore,
    imaging::ImageNormalizer,
    recipes::RecipeService,
    repositories::{RecipeRepository, UserRepository},
    session::SessionManager,
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db_pool: SqlitePool,
    pub credentials: CredentialStore,
    pub sessions: SessionManager,
    pub recipes: RecipeService,
}

impl AppState {
    /// Wire the services over a migrated pool
    pub fn new(db_pool: SqlitePool, settings: &Settings) -> Self {
        let users = UserRepository::new(db_pool.clone());
        let images = ImageNormalizer::new(settings.upload_dir());

        Self {
            credentials: CredentialStore::new(users.clone()),
            sessions: SessionManager::new(users),
            recipes: RecipeService::new(RecipeRepository::new(db_pool.clone()), images),
            db_pool,
        }
    }
}
