//! Server-rendered HTML pages
//!
//! Every page shares [`layout`], which renders the navigation for the
//! current user. All interpolated values are escaped by maud.

use axum::http::StatusCode;
use maud::{DOCTYPE, Markup, html};

use crate::{
    models::{Recipe, RecipeFilter, User},
    parser,
};

fn layout(title: &str, user: Option<&User>, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (title) " · Recipes" }
            }
            body {
                nav {
                    a href="/" { "Recipes" }
                    " "
                    @if let Some(user) = user {
                        a href="/recipes/create" { "New recipe" }
                        " "
                        span.user { (user.username) }
                        " "
                        a href="/logout" { "Log out" }
                    } @else {
                        a href="/login" { "Log in" }
                        " "
                        a href="/register" { "Register" }
                    }
                }
                main { (content) }
            }
        }
    }
}

fn error_message(error: Option<&str>) -> Markup {
    html! {
        @if let Some(error) = error {
            p.error role="alert" { (error) }
        }
    }
}

/// Recipe listing with the search form
pub fn index(user: Option<&User>, recipes: &[Recipe], filter: &RecipeFilter) -> Markup {
    let q = filter.title_substring.as_deref().unwrap_or_default();
    let recipe_type = filter.type_exact.as_deref().unwrap_or_default();
    let ingredient = filter.ingredient_substring.as_deref().unwrap_or_default();

    layout(
        "All recipes",
        user,
        html! {
            h1 { "Recipes" }
            form method="get" action="/" {
                input type="search" name="q" placeholder="Title" value=(q);
                input type="text" name="type" placeholder="Type" value=(recipe_type);
                input type="text" name="ingredient" placeholder="Ingredient" value=(ingredient);
                button type="submit" { "Search" }
            }
            @if recipes.is_empty() {
                p { "No recipes found." }
            } @else {
                ul.recipes {
                    @for recipe in recipes {
                        li {
                            a href={ "/recipes/" (recipe.id) } { (recipe.title) }
                            " "
                            span.type { (recipe.recipe_type) }
                        }
                    }
                }
            }
        },
    )
}

fn credentials_form(title: &str, action: &str, error: Option<&str>) -> Markup {
    layout(
        title,
        None,
        html! {
            h1 { (title) }
            (error_message(error))
            form method="post" action=(action) {
                label { "Username " input type="text" name="username" required; }
                label { "Password " input type="password" name="password" required; }
                button type="submit" { (title) }
            }
        },
    )
}

/// Registration form, optionally with an error message
pub fn register_form(error: Option<&str>) -> Markup {
    credentials_form("Register", "/register", error)
}

/// Login form, optionally with an error message
pub fn login_form(error: Option<&str>) -> Markup {
    credentials_form("Log in", "/login", error)
}

/// Create form, or the edit form pre-filled from an existing recipe
pub fn recipe_form(user: &User, recipe: Option<&Recipe>) -> Markup {
    let (heading, action) = match recipe {
        Some(r) => ("Edit recipe", format!("/recipes/{}/edit", r.id)),
        None => ("New recipe", "/recipes/create".to_string()),
    };
    let title = recipe.map(|r| r.title.as_str()).unwrap_or_default();
    let recipe_type = recipe.map(|r| r.recipe_type.as_str()).unwrap_or_default();
    let min_time = recipe.map(|r| r.min_time).unwrap_or(0);
    let max_time = recipe.map(|r| r.max_time).unwrap_or(0);
    let ingredients = recipe
        .map(|r| parser::ingredients_text(&r.ingredients))
        .unwrap_or_default();
    let steps = recipe
        .map(|r| parser::steps_text(&r.steps))
        .unwrap_or_default();

    layout(
        heading,
        Some(user),
        html! {
            h1 { (heading) }
            form method="post" action=(action) enctype="multipart/form-data" {
                label { "Title " input type="text" name="title" value=(title) required; }
                label { "Type " input type="text" name="type" value=(recipe_type) required; }
                label { "Min time " input type="number" name="min_time" min="0" value=(min_time); }
                label { "Max time " input type="number" name="max_time" min="0" value=(max_time); }
                label {
                    "Ingredients (one \"name: quantity\" per line)"
                    textarea name="ingredients" rows="8" { (ingredients) }
                }
                label {
                    "Steps (one per line)"
                    textarea name="steps" rows="8" { (steps) }
                }
                label { "Image " input type="file" name="image" accept="image/*"; }
                button type="submit" { "Save" }
            }
        },
    )
}

/// Single recipe page; owners get edit and delete controls
pub fn recipe_page(user: Option<&User>, recipe: &Recipe) -> Markup {
    let is_author = user.is_some_and(|u| u.id == recipe.author_id);

    layout(
        &recipe.title,
        user,
        html! {
            article {
                h1 { (recipe.title) }
                p.meta {
                    (recipe.recipe_type) " · " (recipe.min_time) "–" (recipe.max_time) " min"
                }
                @if let Some(image) = &recipe.image {
                    img src={ "/" (image) } alt=(recipe.title);
                }
                h2 { "Ingredients" }
                ul {
                    @for ingredient in &recipe.ingredients {
                        li { (ingredient.name) ": " (ingredient.qty) }
                    }
                }
                h2 { "Steps" }
                ol {
                    @for step in &recipe.steps {
                        li value=(step.order) { (step.description) }
                    }
                }
                @if is_author {
                    a href={ "/recipes/" (recipe.id) "/edit" } { "Edit" }
                    form method="post" action={ "/recipes/" (recipe.id) "/delete" } {
                        button type="submit" { "Delete" }
                    }
                }
            }
        },
    )
}

/// Page shown for failed requests
pub fn error_page(status: StatusCode, message: &str) -> Markup {
    let heading = status.canonical_reason().unwrap_or("Error");

    layout(
        heading,
        None,
        html! {
            h1 { (status.as_u16()) " " (heading) }
            p { (message) }
            a href="/" { "Back to recipes" }
        },
    )
}
