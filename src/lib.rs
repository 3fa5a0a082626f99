//! # Recipe Book
//!
//! Create, edit, delete and rescale recipes, persisted to local storage.
//!
//! ## Features
//!
//! - **Write-through storage**: every change rewrites the collection atomically
//! - **Rescaling**: ingredient amounts recalculated for a new serving count
//! - **Draft editing**: changes stay in a dialog draft until saved
//! - **Import/Export**: JSON round-trips, CSV for spreadsheets
//!
//! ## Modules
//!
//! - [`storage`]: Data model, key-value backends and the recipe store
//! - [`view`]: Edit dialog state machine, rendering and interactive shell
//! - [`export`]: JSON/CSV export and JSON import
//! - [`config`]: TOML configuration with environment overrides
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use recipe_book::storage::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let backend = FileKeyValueStore::open("./recipe_data")?;
//!     let mut store = RecipeStore::open(backend, DEFAULT_STORAGE_KEY);
//!
//!     let id = store.add(
//!         Recipe::new("Soup", 4)
//!             .ingredient("Salt", 2.0, "tsp")
//!             .instructions("Simmer."),
//!     )?;
//!
//!     // Double it: Salt becomes 4 tsp
//!     let soup = store.rescale(id, 8)?;
//!     println!("{:?}", soup);
//!
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod export;
pub mod storage;
pub mod view;

// Re-export top-level types for convenience
pub use storage::{
    FileKeyValueStore, Ingredient, KeyValueStore, MemoryKeyValueStore, Recipe, RecipeId,
    RecipeStore, StorageError, StorageResult, DEFAULT_STORAGE_KEY,
};

pub use view::{Dialog, RecipeBookView};

pub use export::{export_csv, export_json, import_json};

pub use config::{Config, ConfigError, LoggingConfig, StorageConfig};
