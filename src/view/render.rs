//! Text rendering for the recipe list and dialog.

use super::Dialog;
use crate::storage::{Ingredient, Recipe};
use std::fmt::Write;

/// Format an amount for display: at most two decimals, trailing zeros trimmed
///
/// Display only; stored amounts keep full precision.
pub fn format_amount(amount: f64) -> String {
    let s = format!("{:.2}", amount);
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" {
        "0".to_string()
    } else {
        s.to_string()
    }
}

fn format_ingredient(ingredient: &Ingredient) -> String {
    format!(
        "{} {} {}",
        format_amount(ingredient.amount),
        ingredient.unit,
        ingredient.name
    )
}

/// Title of the open dialog
pub fn dialog_title(dialog: &Dialog) -> Option<&'static str> {
    match dialog {
        Dialog::Idle => None,
        Dialog::Creating { .. } => Some("Add New Recipe"),
        Dialog::Editing { .. } => Some("Edit Recipe"),
        Dialog::Rescaling { .. } => Some("Recalculate Servings"),
    }
}

/// Render the recipe list: one row per recipe with its serving count
pub fn render_list(recipes: &[Recipe]) -> String {
    if recipes.is_empty() {
        return "No recipes yet. Use 'add' to create one.\n".to_string();
    }

    let width = recipes
        .iter()
        .map(|r| r.name.chars().count())
        .max()
        .unwrap_or(0)
        .max(4);

    let mut out = String::new();
    let _ = writeln!(out, "{:<15} {:<width$}  Servings", "ID", "Name", width = width);
    let _ = writeln!(out, "{}", "-".repeat(15 + 1 + width + 10));
    for recipe in recipes {
        let _ = writeln!(
            out,
            "{:<15} {:<width$}  Servings: {}",
            recipe.id,
            recipe.name,
            recipe.servings,
            width = width
        );
    }
    out
}

/// Render a single recipe with ingredients and instructions
pub fn render_recipe(recipe: &Recipe) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} (id {})", recipe.name, recipe.id);
    let _ = writeln!(out, "Servings: {}", recipe.servings);

    let _ = writeln!(out);
    let _ = writeln!(out, "Ingredients:");
    if recipe.ingredients.is_empty() {
        let _ = writeln!(out, "  (none)");
    }
    for (i, ingredient) in recipe.ingredients.iter().enumerate() {
        let _ = writeln!(out, "  {}. {}", i + 1, format_ingredient(ingredient));
    }

    if !recipe.instructions.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Instructions:");
        for line in recipe.instructions.lines() {
            let _ = writeln!(out, "  {}", line);
        }
    }
    out
}

/// Render the open dialog, or an empty string if it is closed
pub fn render_dialog(dialog: &Dialog) -> String {
    let Some(title) = dialog_title(dialog) else {
        return String::new();
    };

    let mut out = String::new();
    let _ = writeln!(out, "== {} ==", title);

    match dialog {
        Dialog::Idle => {}
        Dialog::Creating { draft } | Dialog::Editing { draft } => {
            let name = if draft.name.is_empty() { "(unnamed)" } else { draft.name.as_str() };
            let _ = writeln!(out, "Name:         {}", name);
            let _ = writeln!(out, "Servings:     {}", draft.servings);
            let _ = writeln!(out, "Ingredients:");
            if draft.ingredients.is_empty() {
                let _ = writeln!(out, "  (none)");
            }
            for (i, ingredient) in draft.ingredients.iter().enumerate() {
                let _ = writeln!(out, "  {}. {}", i + 1, format_ingredient(ingredient));
            }
            let _ = writeln!(out, "Instructions: {}", draft.instructions);
        }
        Dialog::Rescaling {
            name,
            current_servings,
            new_servings,
            ..
        } => {
            let _ = writeln!(out, "Recipe:       {}", name);
            let _ = writeln!(out, "Servings:     {} -> {}", current_servings, new_servings);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(4.0), "4");
        assert_eq!(format_amount(0.5), "0.5");
        assert_eq!(format_amount(2.0 / 3.0), "0.67");
        assert_eq!(format_amount(333.3333), "333.33");
        assert_eq!(format_amount(10.10), "10.1");
        assert_eq!(format_amount(0.001), "0");
    }

    #[test]
    fn test_render_list() {
        let recipes = vec![
            Recipe::new("Soup", 4).with_id(1),
            Recipe::new("Tea", 1).with_id(2),
        ];
        let out = render_list(&recipes);

        assert!(out.contains("Soup"));
        assert!(out.contains("Servings: 4"));
        assert!(out.contains("Servings: 1"));
        assert_eq!(out.lines().count(), 4);
    }

    #[test]
    fn test_render_empty_list() {
        assert!(render_list(&[]).contains("No recipes"));
    }

    #[test]
    fn test_render_recipe_truncates_amounts() {
        let recipe = Recipe::new("Bread", 3)
            .with_id(9)
            .ingredient("Flour", 500.0 * 2.0 / 3.0, "g")
            .instructions("Mix.\nBake.");
        let out = render_recipe(&recipe);

        assert!(out.contains("1. 333.33 g Flour"));
        assert!(out.contains("  Bake."));
    }

    #[test]
    fn test_dialog_titles() {
        assert_eq!(dialog_title(&Dialog::Idle), None);
        assert_eq!(
            dialog_title(&Dialog::Creating { draft: Recipe::new("", 1) }),
            Some("Add New Recipe")
        );
        assert_eq!(
            dialog_title(&Dialog::Editing { draft: Recipe::new("x", 1) }),
            Some("Edit Recipe")
        );
        assert!(render_dialog(&Dialog::Idle).is_empty());
    }

    #[test]
    fn test_render_rescale_dialog() {
        let dialog = Dialog::Rescaling {
            id: 1,
            name: "Soup".to_string(),
            current_servings: 4,
            new_servings: 8,
        };
        let out = render_dialog(&dialog);

        assert!(out.contains("Recalculate Servings"));
        assert!(out.contains("4 -> 8"));
    }
}
