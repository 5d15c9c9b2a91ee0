//! Recipe aggregate operations and their ownership rules
//!
//! Only the author of a recipe may edit or delete it. An uploaded image is
//! normalized and written before the database transaction starts, so a
//! corrupt upload never produces a recipe row. Image files no row refers to
//! any more are removed once the transaction has settled.

use tracing::{info, warn};

use crate::{
    error::{AppError, AppResult},
    imaging::{ImageNormalizer, ImageUpload},
    models::{Recipe, RecipeDraft, RecipeFilter},
    repositories::RecipeRepository,
};

/// Recipe operations over the repository and the image normalizer
#[derive(Clone)]
pub struct RecipeService {
    recipes: RecipeRepository,
    images: ImageNormalizer,
}

impl RecipeService {
    pub fn new(recipes: RecipeRepository, images: ImageNormalizer) -> Self {
        Self { recipes, images }
    }

    /// Create a recipe owned by `author_id`
    pub async fn create(
        &self,
        draft: RecipeDraft,
        author_id: i64,
        image: Option<ImageUpload>,
    ) -> AppResult<Recipe> {
        let image_path = self.store_image(image).await?;
        let recipe = match self
            .recipes
            .insert(author_id, &draft, image_path.as_deref())
            .await
        {
            Ok(recipe) => recipe,
            Err(e) => {
                self.discard(image_path.as_deref()).await;
                return Err(e.into());
            }
        };

        info!("Recipe {} created by user {}", recipe.id, author_id);
        Ok(recipe)
    }

    /// Fetch a single recipe
    pub async fn view(&self, id: i64) -> AppResult<Recipe> {
        self.recipes.find_by_id(id).await?.ok_or(AppError::NotFound)
    }

    /// Fetch a recipe the requester is allowed to modify
    pub async fn owned(&self, id: i64, requester_id: i64) -> AppResult<Recipe> {
        let recipe = self.view(id).await?;

        if recipe.author_id != requester_id {
            warn!(
                "User {} may not modify recipe {} owned by {}",
                requester_id, id, recipe.author_id
            );
            return Err(AppError::Forbidden);
        }

        Ok(recipe)
    }

    /// Replace a recipe's fields, ingredients and steps
    ///
    /// The stored image is kept unless a new one is uploaded.
    pub async fn update(
        &self,
        id: i64,
        requester_id: i64,
        draft: RecipeDraft,
        image: Option<ImageUpload>,
    ) -> AppResult<Recipe> {
        self.owned(id, requester_id).await?;

        let image_path = self.store_image(image).await?;
        let updated = match self.recipes.update(id, &draft, image_path.as_deref()).await {
            Ok(Some(updated)) => updated,
            Ok(None) => {
                self.discard(image_path.as_deref()).await;
                return Err(AppError::NotFound);
            }
            Err(e) => {
                self.discard(image_path.as_deref()).await;
                return Err(e.into());
            }
        };

        // The previous file is only replaced when a new one was stored
        if image_path.is_some() {
            self.discard(updated.previous_image.as_deref()).await;
        }

        Ok(updated.recipe)
    }

    /// Delete a recipe with its ingredients and steps
    pub async fn delete(&self, id: i64, requester_id: i64) -> AppResult<()> {
        self.owned(id, requester_id).await?;

        let deleted = self.recipes.delete(id).await?.ok_or(AppError::NotFound)?;
        self.discard(deleted.image.as_deref()).await;

        info!("Recipe {} deleted by user {}", id, requester_id);
        Ok(())
    }

    /// List recipes passing the filter
    pub async fn list(&self, filter: &RecipeFilter) -> AppResult<Vec<Recipe>> {
        let recipes = self.recipes.find_all().await?;
        Ok(filter.apply(recipes))
    }

    async fn store_image(&self, image: Option<ImageUpload>) -> AppResult<Option<String>> {
        match image {
            Some(upload) if !upload.is_empty() => Ok(Some(self.images.store(upload).await?)),
            _ => Ok(None),
        }
    }

    async fn discard(&self, image_path: Option<&str>) {
        if let Some(path) = image_path {
            self.images.remove(path).await;
        }
    }
}
