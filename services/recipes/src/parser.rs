//! Text-block parsing for the ingredient and step textareas
//!
//! Both inputs are one entry per line, where a line ends at `\n`, `\r\n` or
//! a lone `\r`. Blank lines are skipped and never consume a position.

use crate::{
    error::{AppError, AppResult},
    models::{Ingredient, NewIngredient, NewStep, Step},
};

/// Split on every line terminator browsers and editors produce
fn split_lines(text: &str) -> impl Iterator<Item = &str> {
    text.split('\n')
        .flat_map(|line| line.strip_suffix('\r').unwrap_or(line).split('\r'))
}

/// Parse `<name>:<quantity>` lines into ingredients
///
/// The line is split on the first colon only, so quantities may contain
/// colons themselves. A non-blank line without any colon rejects the whole
/// block.
pub fn parse_ingredients(text: &str) -> AppResult<Vec<NewIngredient>> {
    let mut ingredients = Vec::new();

    for (idx, line) in split_lines(text).enumerate() {
        if line.trim().is_empty() {
            continue;
        }

        let (name, qty) = line.split_once(':').ok_or_else(|| {
            AppError::Validation(format!(
                "Ingredient line {} must look like 'name: quantity'",
                idx + 1
            ))
        })?;

        ingredients.push(NewIngredient {
            name: name.trim().to_string(),
            qty: qty.trim().to_string(),
        });
    }

    Ok(ingredients)
}

/// Parse one step description per line, numbered from 1
pub fn parse_steps(text: &str) -> Vec<NewStep> {
    split_lines(text)
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .enumerate()
        .map(|(idx, line)| NewStep {
            order: idx as i64 + 1,
            description: line.to_string(),
        })
        .collect()
}

/// Render ingredients back into the textarea format
pub fn ingredients_text(ingredients: &[Ingredient]) -> String {
    ingredients
        .iter()
        .map(|ing| format!("{}: {}", ing.name, ing.qty))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Render steps back into the textarea format
pub fn steps_text(steps: &[Step]) -> String {
    steps
        .iter()
        .map(|step| step.description.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ingredients_in_order() {
        let parsed = parse_ingredients("Tomato: 200g\nSalt:1 tsp\n").unwrap();
        assert_eq!(
            parsed,
            vec![
                NewIngredient {
                    name: "Tomato".to_string(),
                    qty: "200g".to_string()
                },
                NewIngredient {
                    name: "Salt".to_string(),
                    qty: "1 tsp".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_parse_ingredients_splits_on_first_colon() {
        let parsed = parse_ingredients("Timer: 1:30").unwrap();
        assert_eq!(parsed[0].name, "Timer");
        assert_eq!(parsed[0].qty, "1:30");
    }

    #[test]
    fn test_parse_ingredients_skips_blank_lines() {
        let parsed = parse_ingredients("\n  \nFlour: 1 cup\r\n\nEggs:\n").unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[1].name, "Eggs");
        assert_eq!(parsed[1].qty, "");
    }

    #[test]
    fn test_lone_carriage_return_ends_a_line() {
        let parsed = parse_ingredients("a: 1\rb: 2").unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].qty, "1");
        assert_eq!(parsed[1].name, "b");

        let steps = parse_steps("Mix\rBake\r\nServe");
        let descriptions: Vec<&str> = steps.iter().map(|s| s.description.as_str()).collect();
        assert_eq!(descriptions, vec!["Mix", "Bake", "Serve"]);
        assert_eq!(steps[2].order, 3);

        let err = parse_ingredients("a: 1\r\nb\r\n").unwrap_err();
        assert!(matches!(err, AppError::Validation(msg) if msg.contains("line 2")));
    }

    #[test]
    fn test_parse_ingredients_requires_colon() {
        let err = parse_ingredients("Tomato: 200g\nSalt\n").unwrap_err();
        match err {
            AppError::Validation(msg) => assert!(msg.contains("line 2")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_parse_steps_renumbers_contiguously() {
        let parsed = parse_steps("Boil water\n\nAdd salt\n");
        assert_eq!(
            parsed,
            vec![
                NewStep {
                    order: 1,
                    description: "Boil water".to_string()
                },
                NewStep {
                    order: 2,
                    description: "Add salt".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_parse_steps_empty_block() {
        assert!(parse_steps("\n\n   \n").is_empty());
    }

    #[test]
    fn test_text_renderers_feed_back_into_parsers() {
        let ingredients = vec![Ingredient {
            id: 1,
            recipe_id: 1,
            name: "Milk".to_string(),
            qty: "1 l".to_string(),
        }];
        let steps = vec![
            Step {
                id: 1,
                recipe_id: 1,
                order: 1,
                description: "Heat".to_string(),
            },
            Step {
                id: 2,
                recipe_id: 1,
                order: 2,
                description: "Serve".to_string(),
            },
        ];

        assert_eq!(ingredients_text(&ingredients), "Milk: 1 l");
        assert_eq!(steps_text(&steps), "Heat\nServe");
        assert_eq!(parse_steps(&steps_text(&steps)).len(), 2);
    }
}
