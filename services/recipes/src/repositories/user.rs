//! User repository for database operations

use chrono::Utc;
use common::error::{DatabaseError, DatabaseResult};
use sqlx::SqlitePool;
use tracing::info;

use crate::models::{NewUser, User};

/// User repository
#[derive(Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    /// Create a new user repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a new user
    ///
    /// Returns `None` when the username is already taken. The UNIQUE
    /// constraint on `username` decides, so concurrent registrations of the
    /// same name cannot both succeed.
    pub async fn create(&self, new_user: &NewUser) -> DatabaseResult<Option<User>> {
        info!("Creating new user: {}", new_user.username);

        let result = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO "user" (username, password_hash, session_token, created_at)
            VALUES ($1, $2, NULL, $3)
            RETURNING id, username, password_hash, session_token, created_at
            "#,
        )
        .bind(&new_user.username)
        .bind(&new_user.password_hash)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(DatabaseError::Query);

        match result {
            Ok(user) => Ok(Some(user)),
            Err(e) if e.is_unique_violation() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Find a user by username (case-sensitive)
    pub async fn find_by_username(&self, username: &str) -> DatabaseResult<Option<User>> {
        info!("Finding user by username: {}", username);

        sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, password_hash, session_token, created_at
            FROM "user"
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::Query)
    }

    /// Find the first user holding the given session token
    pub async fn find_by_session_token(&self, token: &str) -> DatabaseResult<Option<User>> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, password_hash, session_token, created_at
            FROM "user"
            WHERE session_token = $1
            ORDER BY id
            LIMIT 1
            "#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::Query)
    }

    /// Overwrite the stored session token of a user
    pub async fn set_session_token(&self, user_id: i64, token: Option<&str>) -> DatabaseResult<()> {
        sqlx::query(r#"UPDATE "user" SET session_token = $1 WHERE id = $2"#)
            .bind(token)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(DatabaseError::Query)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::test_pool;

    fn new_user(username: &str) -> NewUser {
        NewUser {
            username: username.to_string(),
            password_hash: "hash".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_and_find() {
        let repo = UserRepository::new(test_pool().await);

        let created = repo.create(&new_user("alice")).await.unwrap().unwrap();
        assert_eq!(created.username, "alice");
        assert!(created.session_token.is_none());

        let found = repo.find_by_username("alice").await.unwrap().unwrap();
        assert_eq!(found.id, created.id);
        assert!(repo.find_by_username("Alice").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_username_returns_none() {
        let repo = UserRepository::new(test_pool().await);

        assert!(repo.create(&new_user("bob")).await.unwrap().is_some());
        assert!(repo.create(&new_user("bob")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_session_token_lookup() {
        let repo = UserRepository::new(test_pool().await);
        let user = repo.create(&new_user("carol")).await.unwrap().unwrap();

        repo.set_session_token(user.id, Some("abc")).await.unwrap();
        let found = repo.find_by_session_token("abc").await.unwrap().unwrap();
        assert_eq!(found.id, user.id);

        repo.set_session_token(user.id, Some("def")).await.unwrap();
        assert!(repo.find_by_session_token("abc").await.unwrap().is_none());
    }
}
