//! Recipe service routes

use axum::{
    Extension, Form, Json, Router,
    extract::{DefaultBodyLimit, Multipart, Path, Query, State, multipart::MultipartError},
    http::{StatusCode, header},
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use axum_extra::extract::cookie::CookieJar;
use maud::Markup;
use serde_json::json;
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing::info;

use crate::{
    config::Settings,
    error::{AppError, AppResult},
    imaging::ImageUpload,
    middleware::{CurrentUser, optional_user, require_session},
    models::{Credentials, RecipeFilter},
    state::AppState,
    validation::RecipeForm,
    views,
};

/// Create the router for the recipe service
pub fn create_router(state: AppState, settings: &Settings) -> Router {
    let protected_routes = Router::new()
        .route("/recipes/create", get(create_page).post(create_recipe))
        .route("/recipes/:id/edit", get(edit_page).post(edit_recipe))
        .route("/recipes/:id/delete", post(delete_recipe))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_session,
        ));

    Router::new()
        .route("/", get(index))
        .route("/register", get(register_page).post(register))
        .route("/login", get(login_page).post(login))
        .route("/logout", get(logout))
        .route("/recipes/:id", get(view_recipe))
        .route("/health", get(health_check))
        .merge(protected_routes)
        .nest_service("/static", ServeDir::new(&settings.static_dir))
        .layer(DefaultBodyLimit::max(settings.max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// 302 redirect
fn found(location: impl Into<String>) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.into())]).into_response()
}

/// Health check endpoint, reporting database reachability
pub async fn health_check(State(state): State<AppState>) -> Response {
    match common::database::health_check(&state.db_pool).await {
        Ok(true) => Json(json!({ "status": "ok" })).into_response(),
        _ => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "unavailable" })),
        )
            .into_response(),
    }
}

/// List recipes, filtered by the query string
pub async fn index(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(filter): Query<RecipeFilter>,
) -> AppResult<Markup> {
    let user = optional_user(&state, &jar).await?;
    let recipes = state.recipes.list(&filter).await?;

    Ok(views::index(user.as_ref(), &recipes, &filter))
}

pub async fn register_page() -> Markup {
    views::register_form(None)
}

/// Register, then log the new user in
pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(credentials): Form<Credentials>,
) -> AppResult<Response> {
    match state.credentials.register(&credentials).await {
        Ok(user) => {
            let jar = state.sessions.login_with_cookie(jar, &user).await?;
            Ok((jar, found("/")).into_response())
        }
        Err(e @ (AppError::AlreadyExists | AppError::Validation(_))) => {
            Ok((e.status(), views::register_form(Some(&e.to_string()))).into_response())
        }
        Err(e) => Err(e),
    }
}

pub async fn login_page() -> Markup {
    views::login_form(None)
}

/// Check credentials and start a session
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(credentials): Form<Credentials>,
) -> AppResult<Response> {
    match state.credentials.verify_credentials(&credentials).await {
        Ok(user) => {
            info!("User logged in: {}", user.username);
            let jar = state.sessions.login_with_cookie(jar, &user).await?;
            Ok((jar, found("/")).into_response())
        }
        Err(e @ AppError::InvalidCredentials) => {
            Ok((e.status(), views::login_form(Some(&e.to_string()))).into_response())
        }
        Err(e) => Err(e),
    }
}

/// Drop the session cookie
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> Response {
    (state.sessions.logout(jar), found("/")).into_response()
}

/// Show a single recipe
pub async fn view_recipe(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(id): Path<i64>,
) -> AppResult<Markup> {
    let user = optional_user(&state, &jar).await?;
    let recipe = state.recipes.view(id).await?;

    Ok(views::recipe_page(user.as_ref(), &recipe))
}

pub async fn create_page(Extension(CurrentUser(user)): Extension<CurrentUser>) -> Markup {
    views::recipe_form(&user, None)
}

/// Create a recipe from a multipart form
pub async fn create_recipe(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    multipart: Multipart,
) -> AppResult<Response> {
    let (form, image) = read_recipe_form(multipart).await?;
    let draft = form.into_draft()?;

    state.recipes.create(draft, user.id, image).await?;

    Ok(found("/"))
}

/// Edit form, only for the author
pub async fn edit_page(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<Markup> {
    let recipe = state.recipes.owned(id, user.id).await?;
    Ok(views::recipe_form(&user, Some(&recipe)))
}

/// Replace a recipe from a multipart form
pub async fn edit_recipe(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<i64>,
    multipart: Multipart,
) -> AppResult<Response> {
    // Ownership is settled before the form is judged
    state.recipes.owned(id, user.id).await?;

    let (form, image) = read_recipe_form(multipart).await?;
    let draft = form.into_draft()?;

    state.recipes.update(id, user.id, draft, image).await?;

    Ok(found(format!("/recipes/{}", id)))
}

/// Delete a recipe, only for the author
pub async fn delete_recipe(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<Response> {
    state.recipes.delete(id, user.id).await?;
    Ok(found("/"))
}

/// Collect the recipe form fields and the optional image from a multipart body
///
/// An image part without content counts as no image.
async fn read_recipe_form(mut multipart: Multipart) -> AppResult<(RecipeForm, Option<ImageUpload>)> {
    let mut form = RecipeForm::default();
    let mut image = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| form_error("Malformed form data", e))?
    {
        let name = field.name().unwrap_or_default().to_string();

        if name == "image" {
            let file_name = field.file_name().unwrap_or_default().to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| form_error("Failed to read image", e))?;

            let upload = ImageUpload {
                file_name,
                bytes: bytes.to_vec(),
            };
            if !upload.is_empty() {
                image = Some(upload);
            }
            continue;
        }

        let value = field
            .text()
            .await
            .map_err(|e| form_error(&format!("Failed to read field {}", name), e))?;

        match name.as_str() {
            "title" => form.title = value,
            "type" => form.recipe_type = value,
            "min_time" => form.min_time = Some(value),
            "max_time" => form.max_time = Some(value),
            "ingredients" => form.ingredients = value,
            "steps" => form.steps = value,
            _ => {}
        }
    }

    Ok((form, image))
}

/// Oversized bodies keep their 413, anything else is a bad form
fn form_error(context: &str, e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge
    } else {
        AppError::Validation(format!("{}: {}", context, e))
    }
}
