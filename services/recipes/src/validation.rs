//! Input validation utilities

use regex::Regex;
use std::sync::OnceLock;

use crate::{
    error::{AppError, AppResult},
    models::{Credentials, RecipeDraft},
    parser,
};

/// Validate username
pub fn validate_username(username: &str) -> Result<(), String> {
    if username.is_empty() {
        return Err("Username is required".to_string());
    }

    if username.chars().count() > 64 {
        return Err("Username must be at most 64 characters long".to_string());
    }

    static USERNAME_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = USERNAME_REGEX
        .get_or_init(|| Regex::new(r"^[a-zA-Z0-9_.-]+$").expect("Failed to compile username regex"));

    if !regex.is_match(username) {
        return Err(
            "Username can only contain letters, numbers, dots, dashes and underscores".to_string(),
        );
    }

    Ok(())
}

/// Validate password
pub fn validate_password(password: &str) -> Result<(), String> {
    if password.is_empty() {
        return Err("Password is required".to_string());
    }

    if password.len() > 128 {
        return Err("Password must be at most 128 characters long".to_string());
    }

    Ok(())
}

/// Validate a register or login submission
pub fn validate_credentials(credentials: &Credentials) -> AppResult<()> {
    validate_username(&credentials.username).map_err(AppError::Validation)?;
    validate_password(&credentials.password).map_err(AppError::Validation)?;
    Ok(())
}

/// Raw recipe form fields, before parsing
#[derive(Debug, Clone, Default)]
pub struct RecipeForm {
    pub title: String,
    pub recipe_type: String,
    pub min_time: Option<String>,
    pub max_time: Option<String>,
    pub ingredients: String,
    pub steps: String,
}

impl RecipeForm {
    /// Validate the fields and parse the text blocks into a draft
    pub fn into_draft(self) -> AppResult<RecipeDraft> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(AppError::Validation("Title is required".to_string()));
        }

        let recipe_type = self.recipe_type.trim();
        if recipe_type.is_empty() {
            return Err(AppError::Validation("Type is required".to_string()));
        }

        let min_time = parse_minutes("min_time", self.min_time.as_deref())?;
        let max_time = parse_minutes("max_time", self.max_time.as_deref())?;

        let ingredients = parser::parse_ingredients(&self.ingredients)?;
        let steps = parser::parse_steps(&self.steps);

        Ok(RecipeDraft {
            title: title.to_string(),
            recipe_type: recipe_type.to_string(),
            min_time,
            max_time,
            ingredients,
            steps,
        })
    }
}

/// Parse a preparation time field; missing or blank means 0
fn parse_minutes(field: &str, value: Option<&str>) -> AppResult<i64> {
    let value = match value.map(str::trim) {
        None | Some("") => return Ok(0),
        Some(v) => v,
    };

    let minutes: i64 = value
        .parse()
        .map_err(|_| AppError::Validation(format!("{} must be a whole number", field)))?;

    if minutes < 0 {
        return Err(AppError::Validation(format!("{} must not be negative", field)));
    }

    Ok(minutes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> RecipeForm {
        RecipeForm {
            title: " Tomato soup ".to_string(),
            recipe_type: "Dinner".to_string(),
            min_time: Some("10".to_string()),
            max_time: None,
            ingredients: "Tomato: 200g\n".to_string(),
            steps: "Boil\n".to_string(),
        }
    }

    #[test]
    fn test_validate_username() {
        assert!(validate_username("alice").is_ok());
        assert!(validate_username("Alice_2.0-x").is_ok());
        assert!(validate_username("").is_err());
        assert!(validate_username("has space").is_err());
        assert!(validate_username(&"a".repeat(65)).is_err());
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("correct").is_ok());
        assert!(validate_password("").is_err());
        assert!(validate_password(&"p".repeat(129)).is_err());
    }

    #[test]
    fn test_into_draft_trims_and_defaults() {
        let draft = form().into_draft().unwrap();
        assert_eq!(draft.title, "Tomato soup");
        assert_eq!(draft.min_time, 10);
        assert_eq!(draft.max_time, 0);
        assert_eq!(draft.ingredients.len(), 1);
        assert_eq!(draft.steps.len(), 1);
    }

    #[test]
    fn test_into_draft_allows_min_above_max() {
        let mut f = form();
        f.min_time = Some("30".to_string());
        f.max_time = Some("5".to_string());
        let draft = f.into_draft().unwrap();
        assert_eq!((draft.min_time, draft.max_time), (30, 5));
    }

    #[test]
    fn test_into_draft_rejects_bad_input() {
        let mut f = form();
        f.title = "   ".to_string();
        assert!(matches!(f.into_draft(), Err(AppError::Validation(_))));

        let mut f = form();
        f.min_time = Some("-1".to_string());
        assert!(matches!(f.into_draft(), Err(AppError::Validation(_))));

        let mut f = form();
        f.max_time = Some("soon".to_string());
        assert!(matches!(f.into_draft(), Err(AppError::Validation(_))));

        let mut f = form();
        f.ingredients = "Salt".to_string();
        assert!(matches!(f.into_draft(), Err(AppError::Validation(_))));
    }
}
