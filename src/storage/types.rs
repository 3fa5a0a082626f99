//! Core data types for the recipe book
//!
//! This module defines the persisted data model:
//! - `Ingredient`: One line of a recipe's ingredient list
//! - `Recipe`: A named dish with ingredients, instructions and a serving count
//!
//! Field names match the persisted JSON layout exactly, so a stored
//! collection round-trips without any renaming.

use crate::storage::error::{StorageError, StorageResult};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Recipe identifier (creation timestamp in milliseconds)
pub type RecipeId = i64;

/// A single ingredient line
///
/// Owned by its recipe. Position in the list only affects display order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Ingredient {
    /// Ingredient name (e.g., "Salt")
    pub name: String,
    /// Quantity, always greater than zero
    pub amount: f64,
    /// Unit of measurement (e.g., "tsp", "g", "cups")
    pub unit: String,
}

impl Ingredient {
    pub fn new(name: impl Into<String>, amount: f64, unit: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            amount,
            unit: unit.into(),
        }
    }

    /// Check basic presence: a name and a finite positive amount
    pub fn validate(&self) -> StorageResult<()> {
        if self.name.trim().is_empty() {
            return Err(StorageError::Validation(
                "ingredient name is required".to_string(),
            ));
        }
        if !self.amount.is_finite() || self.amount <= 0.0 {
            return Err(StorageError::Validation(format!(
                "ingredient '{}' must have an amount greater than zero",
                self.name
            )));
        }
        Ok(())
    }
}

/// Parse an ingredient line of the form `<amount> <unit> <name>`
///
/// The amount may be a decimal (`1.5`, `.5`) or a simple fraction (`1/2`).
/// Example: `2 tsp Sea salt`.
impl FromStr for Ingredient {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let re = regex::Regex::new(
            r"^\s*(?P<amount>\d+/\d+|\d+(?:\.\d+)?|\.\d+)\s+(?P<unit>\S+)\s+(?P<name>\S.*?)\s*$",
        )
        .map_err(|e| StorageError::Validation(format!("ingredient pattern: {}", e)))?;

        let caps = re.captures(s).ok_or_else(|| {
            StorageError::Validation(format!(
                "invalid ingredient {:?}: expected '<amount> <unit> <name>'",
                s
            ))
        })?;

        let amount = parse_amount(&caps["amount"])?;
        let ingredient = Ingredient::new(&caps["name"], amount, &caps["unit"]);
        ingredient.validate()?;
        Ok(ingredient)
    }
}

fn parse_amount(raw: &str) -> StorageResult<f64> {
    let invalid = || StorageError::Validation(format!("invalid amount {:?}", raw));
    match raw.split_once('/') {
        Some((num, den)) => {
            let num: f64 = num.parse().map_err(|_| invalid())?;
            let den: f64 = den.parse().map_err(|_| invalid())?;
            if den == 0.0 {
                return Err(invalid());
            }
            Ok(num / den)
        }
        None => raw.parse().map_err(|_| invalid()),
    }
}

/// A recipe
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Recipe {
    /// Unique identifier, assigned by the store on creation
    pub id: RecipeId,
    /// Human-readable name
    pub name: String,
    /// Ingredients in display order
    #[serde(default)]
    pub ingredients: Vec<Ingredient>,
    /// Free-text preparation instructions
    #[serde(default)]
    pub instructions: String,
    /// Number of servings the ingredient amounts are written for
    pub servings: u32,
}

impl Recipe {
    /// Create a recipe with no ingredients
    ///
    /// The id is a placeholder until the store assigns one.
    pub fn new(name: impl Into<String>, servings: u32) -> Self {
        Self {
            id: 0,
            name: name.into(),
            ingredients: Vec::new(),
            instructions: String::new(),
            servings,
        }
    }

    /// Builder: append an ingredient
    pub fn ingredient(mut self, name: impl Into<String>, amount: f64, unit: impl Into<String>) -> Self {
        self.ingredients.push(Ingredient::new(name, amount, unit));
        self
    }

    /// Builder: set instructions
    pub fn instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = instructions.into();
        self
    }

    /// Builder: set id
    pub fn with_id(mut self, id: RecipeId) -> Self {
        self.id = id;
        self
    }

    /// Validate the fields required before a recipe can be stored
    pub fn validate(&self) -> StorageResult<()> {
        if self.name.trim().is_empty() {
            return Err(StorageError::Validation("recipe name is required".to_string()));
        }
        if self.servings == 0 {
            return Err(StorageError::Validation(
                "servings must be greater than zero".to_string(),
            ));
        }
        self.ingredients.iter().try_for_each(Ingredient::validate)
    }

    /// Factor that converts this recipe's amounts to `new_servings`
    pub fn scale_factor(&self, new_servings: u32) -> f64 {
        f64::from(new_servings) / f64::from(self.servings)
    }

    /// Proportionally rescale every ingredient to `new_servings`
    ///
    /// Amounts are multiplied without rounding; callers must pass a
    /// non-zero serving count.
    pub fn rescale(&mut self, new_servings: u32) {
        debug_assert!(new_servings > 0);
        let factor = self.scale_factor(new_servings);
        for ingredient in &mut self.ingredients {
            ingredient.amount *= factor;
        }
        self.servings = new_servings;
    }
}
