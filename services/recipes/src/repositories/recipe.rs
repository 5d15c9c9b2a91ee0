//! Recipe repository for database operations
//!
//! A recipe and its ingredient and step rows are always written together
//! inside one transaction. Dropping a transaction without committing rolls it
//! back, so every early return leaves the store untouched.

use common::error::{DatabaseError, DatabaseResult};
use sqlx::{FromRow, SqliteConnection, SqlitePool};
use std::collections::HashMap;
use tracing::info;

use crate::models::{Ingredient, Recipe, RecipeDraft, Step};

/// Recipe table row, without the owned collections
#[derive(Debug, FromRow)]
struct RecipeRow {
    id: i64,
    title: String,
    #[sqlx(rename = "type")]
    recipe_type: String,
    min_time: i64,
    max_time: i64,
    image: Option<String>,
    author_id: i64,
}

impl RecipeRow {
    fn into_recipe(self, ingredients: Vec<Ingredient>, steps: Vec<Step>) -> Recipe {
        Recipe {
            id: self.id,
            title: self.title,
            recipe_type: self.recipe_type,
            min_time: self.min_time,
            max_time: self.max_time,
            image: self.image,
            author_id: self.author_id,
            ingredients,
            steps,
        }
    }
}

/// Result of replacing a recipe
#[derive(Debug)]
pub struct UpdatedRecipe {
    pub recipe: Recipe,
    /// Image path stored before the update
    pub previous_image: Option<String>,
}

/// Result of deleting a recipe
#[derive(Debug)]
pub struct DeletedRecipe {
    /// Image path the deleted row referenced
    pub image: Option<String>,
}

/// Recipe repository
#[derive(Clone)]
pub struct RecipeRepository {
    pool: SqlitePool,
}

impl RecipeRepository {
    /// Create a new recipe repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a recipe with its ingredients and steps
    pub async fn insert(
        &self,
        author_id: i64,
        draft: &RecipeDraft,
        image: Option<&str>,
    ) -> DatabaseResult<Recipe> {
        info!("Creating recipe '{}' for user {}", draft.title, author_id);

        let mut tx = self.pool.begin().await.map_err(DatabaseError::Query)?;

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO recipe (title, type, min_time, max_time, image, author_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(&draft.title)
        .bind(&draft.recipe_type)
        .bind(draft.min_time)
        .bind(draft.max_time)
        .bind(image)
        .bind(author_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(DatabaseError::Query)?;

        insert_children(&mut tx, id, draft).await?;
        let recipe = load(&mut tx, id).await?.ok_or_else(|| {
            DatabaseError::Query(sqlx::Error::RowNotFound)
        })?;

        tx.commit().await.map_err(DatabaseError::Query)?;
        Ok(recipe)
    }

    /// Find a recipe by ID, with its ingredients and steps
    pub async fn find_by_id(&self, id: i64) -> DatabaseResult<Option<Recipe>> {
        let mut conn = self.pool.acquire().await.map_err(DatabaseError::Query)?;
        load(&mut conn, id).await
    }

    /// Load every recipe, ordered by ID
    pub async fn find_all(&self) -> DatabaseResult<Vec<Recipe>> {
        let rows = sqlx::query_as::<_, RecipeRow>(
            r#"
            SELECT id, title, type, min_time, max_time, image, author_id
            FROM recipe
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::Query)?;

        let ingredients = sqlx::query_as::<_, Ingredient>(
            "SELECT id, recipe_id, name, qty FROM ingredient ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::Query)?;

        let steps = sqlx::query_as::<_, Step>(
            r#"SELECT id, recipe_id, "order", description FROM step ORDER BY recipe_id, "order""#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::Query)?;

        let mut ingredients_by_recipe: HashMap<i64, Vec<Ingredient>> = HashMap::new();
        for ing in ingredients {
            ingredients_by_recipe.entry(ing.recipe_id).or_default().push(ing);
        }

        let mut steps_by_recipe: HashMap<i64, Vec<Step>> = HashMap::new();
        for step in steps {
            steps_by_recipe.entry(step.recipe_id).or_default().push(step);
        }

        let recipes = rows
            .into_iter()
            .map(|row| {
                let ingredients = ingredients_by_recipe.remove(&row.id).unwrap_or_default();
                let steps = steps_by_recipe.remove(&row.id).unwrap_or_default();
                row.into_recipe(ingredients, steps)
            })
            .collect();

        Ok(recipes)
    }

    /// Replace a recipe's fields and rebuild its ingredients and steps
    ///
    /// `image` replaces the stored path only when it is `Some`. Returns `None`
    /// when no recipe has this ID.
    pub async fn update(
        &self,
        id: i64,
        draft: &RecipeDraft,
        image: Option<&str>,
    ) -> DatabaseResult<Option<UpdatedRecipe>> {
        info!("Updating recipe {}", id);

        let mut tx = self.pool.begin().await.map_err(DatabaseError::Query)?;

        let previous: Option<Option<String>> =
            sqlx::query_scalar("SELECT image FROM recipe WHERE id = $1")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(DatabaseError::Query)?;

        let Some(previous_image) = previous else {
            return Ok(None);
        };

        sqlx::query(
            r#"
            UPDATE recipe
            SET title = $1, type = $2, min_time = $3, max_time = $4,
                image = COALESCE($5, image)
            WHERE id = $6
            "#,
        )
        .bind(&draft.title)
        .bind(&draft.recipe_type)
        .bind(draft.min_time)
        .bind(draft.max_time)
        .bind(image)
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(DatabaseError::Query)?;

        delete_children(&mut tx, id).await?;
        insert_children(&mut tx, id, draft).await?;
        let recipe = load(&mut tx, id)
            .await?
            .ok_or(DatabaseError::Query(sqlx::Error::RowNotFound))?;

        tx.commit().await.map_err(DatabaseError::Query)?;
        Ok(Some(UpdatedRecipe {
            recipe,
            previous_image,
        }))
    }

    /// Delete a recipe together with its ingredients and steps
    ///
    /// Returns `None` when no recipe has this ID.
    pub async fn delete(&self, id: i64) -> DatabaseResult<Option<DeletedRecipe>> {
        info!("Deleting recipe {}", id);

        let mut tx = self.pool.begin().await.map_err(DatabaseError::Query)?;

        delete_children(&mut tx, id).await?;
        let image: Option<Option<String>> =
            sqlx::query_scalar("DELETE FROM recipe WHERE id = $1 RETURNING image")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(DatabaseError::Query)?;

        tx.commit().await.map_err(DatabaseError::Query)?;
        Ok(image.map(|image| DeletedRecipe { image }))
    }

    /// Count ingredient and step rows still referencing a recipe ID
    pub async fn count_children(&self, recipe_id: i64) -> DatabaseResult<(i64, i64)> {
        let ingredients: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM ingredient WHERE recipe_id = $1")
                .bind(recipe_id)
                .fetch_one(&self.pool)
                .await
                .map_err(DatabaseError::Query)?;

        let steps: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM step WHERE recipe_id = $1")
            .bind(recipe_id)
            .fetch_one(&self.pool)
            .await
            .map_err(DatabaseError::Query)?;

        Ok((ingredients, steps))
    }
}

async fn load(conn: &mut SqliteConnection, id: i64) -> DatabaseResult<Option<Recipe>> {
    let row = sqlx::query_as::<_, RecipeRow>(
        r#"
        SELECT id, title, type, min_time, max_time, image, author_id
        FROM recipe
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(&mut *conn)
    .await
    .map_err(DatabaseError::Query)?;

    let Some(row) = row else {
        return Ok(None);
    };

    let ingredients = sqlx::query_as::<_, Ingredient>(
        "SELECT id, recipe_id, name, qty FROM ingredient WHERE recipe_id = $1 ORDER BY id",
    )
    .bind(id)
    .fetch_all(&mut *conn)
    .await
    .map_err(DatabaseError::Query)?;

    let steps = sqlx::query_as::<_, Step>(
        r#"SELECT id, recipe_id, "order", description FROM step WHERE recipe_id = $1 ORDER BY "order""#,
    )
    .bind(id)
    .fetch_all(&mut *conn)
    .await
    .map_err(DatabaseError::Query)?;

    Ok(Some(row.into_recipe(ingredients, steps)))
}

async fn insert_children(
    conn: &mut SqliteConnection,
    recipe_id: i64,
    draft: &RecipeDraft,
) -> DatabaseResult<()> {
    for ing in &draft.ingredients {
        sqlx::query("INSERT INTO ingredient (recipe_id, name, qty) VALUES ($1, $2, $3)")
            .bind(recipe_id)
            .bind(&ing.name)
            .bind(&ing.qty)
            .execute(&mut *conn)
            .await
            .map_err(DatabaseError::Query)?;
    }

    for step in &draft.steps {
        sqlx::query(r#"INSERT INTO step (recipe_id, "order", description) VALUES ($1, $2, $3)"#)
            .bind(recipe_id)
            .bind(step.order)
            .bind(&step.description)
            .execute(&mut *conn)
            .await
            .map_err(DatabaseError::Query)?;
    }

    Ok(())
}

async fn delete_children(conn: &mut SqliteConnection, recipe_id: i64) -> DatabaseResult<()> {
    sqlx::query("DELETE FROM ingredient WHERE recipe_id = $1")
        .bind(recipe_id)
        .execute(&mut *conn)
        .await
        .map_err(DatabaseError::Query)?;

    sqlx::query("DELETE FROM step WHERE recipe_id = $1")
        .bind(recipe_id)
        .execute(&mut *conn)
        .await
        .map_err(DatabaseError::Query)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        database::test_pool,
        models::{NewIngredient, NewStep, NewUser},
        repositories::UserRepository,
    };

    fn draft(title: &str, ingredients: &[(&str, &str)], steps: &[&str]) -> RecipeDraft {
        RecipeDraft {
            title: title.to_string(),
            recipe_type: "Dinner".to_string(),
            min_time: 5,
            max_time: 10,
            ingredients: ingredients
                .iter()
                .map(|(name, qty)| NewIngredient {
                    name: name.to_string(),
                    qty: qty.to_string(),
                })
                .collect(),
            steps: steps
                .iter()
                .enumerate()
                .map(|(i, d)| NewStep {
                    order: i as i64 + 1,
                    description: d.to_string(),
                })
                .collect(),
        }
    }

    async fn setup() -> (RecipeRepository, i64) {
        let pool = test_pool().await;
        let user = UserRepository::new(pool.clone())
            .create(&NewUser {
                username: "chef".to_string(),
                password_hash: "hash".to_string(),
            })
            .await
            .unwrap()
            .unwrap();
        (RecipeRepository::new(pool), user.id)
    }

    #[tokio::test]
    async fn test_insert_and_load_preserves_order() {
        let (repo, author) = setup().await;

        let recipe = repo
            .insert(
                author,
                &draft("Soup", &[("Water", "1 l"), ("Salt", "1 tsp")], &["Boil", "Salt"]),
                None,
            )
            .await
            .unwrap();

        let loaded = repo.find_by_id(recipe.id).await.unwrap().unwrap();
        let names: Vec<&str> = loaded.ingredients.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["Water", "Salt"]);
        let orders: Vec<i64> = loaded.steps.iter().map(|s| s.order).collect();
        assert_eq!(orders, vec![1, 2]);
        assert_eq!(loaded.author_id, author);
    }

    #[tokio::test]
    async fn test_update_replaces_children_and_keeps_image() {
        let (repo, author) = setup().await;
        let recipe = repo
            .insert(
                author,
                &draft("Soup", &[("Water", "1 l")], &["Boil"]),
                Some("static/uploads/a.jpg"),
            )
            .await
            .unwrap();

        let updated = repo
            .update(
                recipe.id,
                &draft("Stew", &[("Beef", "500g"), ("Carrot", "2")], &["Brown", "Simmer", "Serve"]),
                None,
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.previous_image.as_deref(), Some("static/uploads/a.jpg"));
        let updated = updated.recipe;
        assert_eq!(updated.title, "Stew");
        assert_eq!(updated.image.as_deref(), Some("static/uploads/a.jpg"));
        assert_eq!(updated.ingredients.len(), 2);
        assert_eq!(updated.steps.len(), 3);
        assert_eq!(repo.count_children(recipe.id).await.unwrap(), (2, 3));

        let replaced = repo
            .update(recipe.id, &draft("Stew", &[], &[]), Some("static/uploads/b.jpg"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(replaced.previous_image.as_deref(), Some("static/uploads/a.jpg"));
        assert_eq!(replaced.recipe.image.as_deref(), Some("static/uploads/b.jpg"));
    }

    #[tokio::test]
    async fn test_update_unknown_recipe() {
        let (repo, _) = setup().await;
        assert!(repo.update(999, &draft("X", &[], &[]), None).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_removes_children() {
        let (repo, author) = setup().await;
        let recipe = repo
            .insert(
                author,
                &draft("Soup", &[("Water", "1 l")], &["Boil"]),
                Some("static/uploads/a.jpg"),
            )
            .await
            .unwrap();

        let deleted = repo.delete(recipe.id).await.unwrap().unwrap();
        assert_eq!(deleted.image.as_deref(), Some("static/uploads/a.jpg"));
        assert!(repo.find_by_id(recipe.id).await.unwrap().is_none());
        assert_eq!(repo.count_children(recipe.id).await.unwrap(), (0, 0));
        assert!(repo.delete(recipe.id).await.unwrap().is_none());

        let plain = repo
            .insert(author, &draft("Bread", &[], &[]), None)
            .await
            .unwrap();
        let deleted = repo.delete(plain.id).await.unwrap().unwrap();
        assert!(deleted.image.is_none());
    }

    #[tokio::test]
    async fn test_find_all_groups_children() {
        let (repo, author) = setup().await;
        repo.insert(author, &draft("A", &[("x", "1")], &["a1"]), None)
            .await
            .unwrap();
        repo.insert(author, &draft("B", &[("y", "2"), ("z", "3")], &[]), None)
            .await
            .unwrap();

        let all = repo.find_all().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].title, "A");
        assert_eq!(all[0].ingredients.len(), 1);
        assert_eq!(all[0].steps.len(), 1);
        assert_eq!(all[1].ingredients.len(), 2);
        assert!(all[1].steps.is_empty());
    }
}
