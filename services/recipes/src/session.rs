//! Session management with opaque cookie tokens
//!
//! Each user holds at most one token. Logging in overwrites it, which
//! invalidates the previous session. Logging out only removes the client
//! cookie; the stored token stays valid until the next login.

use axum_extra::extract::cookie::{Cookie, CookieJar};
use rand::{RngCore, rngs::OsRng};
use tracing::{info, warn};

use crate::{
    error::{AppError, AppResult},
    models::User,
    repositories::UserRepository,
};

/// Name of the session cookie
pub const SESSION_COOKIE: &str = "session_token";

/// Cookie lifetime in seconds (7 days)
pub const SESSION_MAX_AGE_SECS: i64 = 7 * 24 * 3600;

/// Number of random bytes in a token
const TOKEN_BYTES: usize = 16;

/// Generate a random 128-bit token, hex encoded
pub fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Build the HttpOnly cookie carrying a session token
pub fn session_cookie(token: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .max_age(time::Duration::seconds(SESSION_MAX_AGE_SECS))
        .build()
}

/// Session manager for handling user sessions
#[derive(Clone)]
pub struct SessionManager {
    users: UserRepository,
}

impl SessionManager {
    /// Create a new session manager
    pub fn new(users: UserRepository) -> Self {
        Self { users }
    }

    /// Start a session for a user and return its token
    pub async fn login(&self, user: &User) -> AppResult<String> {
        info!("Creating session for user: {}", user.id);

        let token = generate_token();
        self.users.set_session_token(user.id, Some(&token)).await?;

        Ok(token)
    }

    /// Start a session and attach its cookie to the jar
    pub async fn login_with_cookie(&self, jar: CookieJar, user: &User) -> AppResult<CookieJar> {
        let token = self.login(user).await?;
        Ok(jar.add(session_cookie(token)))
    }

    /// Remove the session cookie from the client
    pub fn logout(&self, jar: CookieJar) -> CookieJar {
        jar.remove(Cookie::build(SESSION_COOKIE).path("/"))
    }

    /// Map a session token to its user
    pub async fn resolve(&self, token: Option<&str>) -> AppResult<User> {
        let token = token
            .filter(|t| !t.is_empty())
            .ok_or(AppError::Unauthenticated)?;

        match self.users.find_by_session_token(token).await? {
            Some(user) => Ok(user),
            None => {
                warn!("Rejected unknown session token");
                Err(AppError::Unauthenticated)
            }
        }
    }

    /// Resolve the session cookie carried by a request
    pub async fn resolve_jar(&self, jar: &CookieJar) -> AppResult<User> {
        self.resolve(jar.get(SESSION_COOKIE).map(|c| c.value()))
            .await
    }
}
