//! Recipe Storage
//!
//! This module provides the persisted recipe collection:
//!
//! - **types**: Data model (Recipe, Ingredient)
//! - **kv**: Local key-value backends (file, memory)
//! - **store**: The recipe store with write-through mutations
//! - **seed**: Example dataset for an empty collection
//! - **error**: Error types
//!
//! # Architecture
//!
//! ```text
//! Write Path:
//!   add/update/remove/rescale → next collection → JSON → key-value backend
//!
//! Read Path:
//!   startup → key-value backend → JSON (fail soft) → in-memory collection
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use recipe_book::storage::{FileKeyValueStore, Recipe, RecipeStore};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let backend = FileKeyValueStore::open("./recipe_data")?;
//!     let mut store = RecipeStore::open(backend, "recipes");
//!
//!     let id = store.add(Recipe::new("Soup", 4).ingredient("Salt", 2.0, "tsp"))?;
//!     store.rescale(id, 8)?;
//!
//!     println!("{} recipes", store.len());
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod kv;
pub mod seed;
pub mod store;
pub mod types;

// Re-export commonly used types
pub use error::{StorageError, StorageResult};
pub use kv::{FileKeyValueStore, KeyValueStore, MemoryKeyValueStore};
pub use seed::example_recipes;
pub use store::{load_recipes, save_recipes, RecipeStore, DEFAULT_STORAGE_KEY};
pub use types::{Ingredient, Recipe, RecipeId};
