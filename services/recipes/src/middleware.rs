//! Session middleware for cookie authentication

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;

use crate::{
    error::{AppError, AppResult},
    models::User,
    state::AppState,
};

/// User resolved from the session cookie
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// Reject requests without a valid session cookie
///
/// On success the resolved user is inserted into the request extensions
/// as [`CurrentUser`].
pub async fn require_session(
    State(state): State<AppState>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let user = state.sessions.resolve_jar(&jar).await?;

    req.extensions_mut().insert(CurrentUser(user));

    Ok(next.run(req).await)
}

/// Resolve the session cookie on pages that also serve anonymous visitors
pub async fn optional_user(state: &AppState, jar: &CookieJar) -> AppResult<Option<User>> {
    match state.sessions.resolve_jar(jar).await {
        Ok(user) => Ok(Some(user)),
        Err(AppError::Unauthenticated) => Ok(None),
        Err(e) => Err(e),
    }
}
