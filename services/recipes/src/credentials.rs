//! Credential store: registration and password verification

use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString};
use tracing::{info, warn};

use crate::{
    error::{AppError, AppResult},
    models::{Credentials, NewUser, User},
    repositories::UserRepository,
    validation,
};

/// Hash a password with Argon2 and a fresh random salt
pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut rand::thread_rng());
    let argon2 = Argon2::default();
    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?
        .to_string();

    Ok(password_hash)
}

/// Check a password against a stored PHC hash string
pub fn verify_password(password: &str, password_hash: &str) -> AppResult<bool> {
    let parsed_hash = PasswordHash::new(password_hash)
        .map_err(|e| AppError::Internal(format!("Failed to parse password hash: {}", e)))?;

    let argon2 = Argon2::default();
    Ok(argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// Credential store backed by the user table
#[derive(Clone)]
pub struct CredentialStore {
    users: UserRepository,
}

impl CredentialStore {
    /// Create a new credential store
    pub fn new(users: UserRepository) -> Self {
        Self { users }
    }

    /// Register a new user
    ///
    /// Fails with `AlreadyExists` when the username is taken.
    pub async fn register(&self, credentials: &Credentials) -> AppResult<User> {
        validation::validate_credentials(credentials)?;

        let new_user = NewUser {
            username: credentials.username.clone(),
            password_hash: hash_password(&credentials.password)?,
        };

        match self.users.create(&new_user).await? {
            Some(user) => {
                info!("Registered user {} ({})", user.username, user.id);
                Ok(user)
            }
            None => {
                warn!("Registration refused, username taken: {}", new_user.username);
                Err(AppError::AlreadyExists)
            }
        }
    }

    /// Look up a user and check the password
    ///
    /// Unknown usernames and wrong passwords both yield `InvalidCredentials`.
    pub async fn verify_credentials(&self, credentials: &Credentials) -> AppResult<User> {
        let Some(user) = self.users.find_by_username(&credentials.username).await? else {
            warn!("Login failed, unknown user: {}", credentials.username);
            return Err(AppError::InvalidCredentials);
        };

        if !verify_password(&credentials.password, &user.password_hash)? {
            warn!("Login failed, wrong password for user: {}", credentials.username);
            return Err(AppError::InvalidCredentials);
        }

        Ok(user)
    }
}
