//! Import and export of recipe collections
//!
//! JSON export uses the persisted layout, so an exported file can be
//! imported elsewhere unchanged. CSV export flattens recipes into one row
//! per ingredient for spreadsheets and shopping lists.

use crate::storage::{Recipe, StorageError, StorageResult};
use serde::Serialize;

/// Flattened CSV row
#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    recipe_id: i64,
    recipe: &'a str,
    servings: u32,
    ingredient: &'a str,
    amount: Option<f64>,
    unit: &'a str,
}

/// Serialize recipes as pretty-printed JSON
pub fn export_json(recipes: &[Recipe]) -> StorageResult<String> {
    Ok(serde_json::to_string_pretty(recipes)?)
}

/// Serialize recipes as CSV, one row per ingredient
///
/// Recipes without ingredients still get a row, with empty ingredient columns.
pub fn export_csv(recipes: &[Recipe]) -> StorageResult<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    for recipe in recipes {
        if recipe.ingredients.is_empty() {
            writer.serialize(CsvRow {
                recipe_id: recipe.id,
                recipe: &recipe.name,
                servings: recipe.servings,
                ingredient: "",
                amount: None,
                unit: "",
            }).map_err(csv_error)?;
        }
        for ingredient in &recipe.ingredients {
            writer.serialize(CsvRow {
                recipe_id: recipe.id,
                recipe: &recipe.name,
                servings: recipe.servings,
                ingredient: &ingredient.name,
                amount: Some(ingredient.amount),
                unit: &ingredient.unit,
            }).map_err(csv_error)?;
        }
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| StorageError::Serialization(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| StorageError::Serialization(e.to_string()))
}

/// Parse an exported JSON collection
///
/// Unlike loading the stored collection, malformed input is an error here.
/// Every recipe must pass validation.
pub fn import_json(text: &str) -> StorageResult<Vec<Recipe>> {
    let recipes: Vec<Recipe> = serde_json::from_str(text)?;
    for recipe in &recipes {
        recipe.validate()?;
    }
    Ok(recipes)
}

fn csv_error(err: csv::Error) -> StorageError {
    StorageError::Serialization(err.to_string())
}
