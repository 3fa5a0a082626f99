//! Recipe Store
//!
//! Owns the in-memory recipe collection and mirrors it to a key-value
//! backend under a single key. Every mutation writes the full collection
//! before returning (write-through):
//!
//! ```text
//! add/update/remove/rescale → build next collection → save → swap in memory
//! ```
//!
//! If the save fails, the in-memory collection keeps its previous value.

use crate::storage::error::{StorageError, StorageResult};
use crate::storage::kv::KeyValueStore;
use crate::storage::types::{Recipe, RecipeId};
use chrono::Utc;

/// Default storage key for the recipe collection
pub const DEFAULT_STORAGE_KEY: &str = "recipes";

/// Read the full collection stored under `key`
///
/// Fails soft: a missing value, an unreadable backend or malformed JSON
/// all yield an empty collection.
pub fn load_recipes<S: KeyValueStore + ?Sized>(backend: &S, key: &str) -> Vec<Recipe> {
    let raw = match backend.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => {
            tracing::debug!(key, "No stored recipes, starting empty");
            return Vec::new();
        }
        Err(e) => {
            tracing::warn!(key, "Failed to read stored recipes: {}", e);
            return Vec::new();
        }
    };

    match serde_json::from_str::<Vec<Recipe>>(&raw) {
        Ok(recipes) => recipes,
        Err(e) => {
            tracing::warn!(key, "Stored recipes are malformed, starting empty: {}", e);
            Vec::new()
        }
    }
}

/// Write the full collection under `key`, replacing any prior value
pub fn save_recipes<S: KeyValueStore + ?Sized>(
    backend: &mut S,
    key: &str,
    recipes: &[Recipe],
) -> StorageResult<()> {
    let content = serde_json::to_string(recipes)?;
    backend.set(key, &content)?;
    tracing::debug!(key, count = recipes.len(), "Saved recipes");
    Ok(())
}

fn system_clock() -> i64 {
    Utc::now().timestamp_millis()
}

/// The recipe collection and its persistent mirror
///
/// Constructed once at startup with [`RecipeStore::open`] and kept for the
/// lifetime of the process.
pub struct RecipeStore<S: KeyValueStore> {
    backend: S,
    key: String,
    recipes: Vec<Recipe>,
    clock: fn() -> i64,
}

impl<S: KeyValueStore> RecipeStore<S> {
    /// Open the store, loading whatever is persisted under `key`
    pub fn open(backend: S, key: impl Into<String>) -> Self {
        Self::with_clock(backend, key, system_clock)
    }

    /// Open the store with a custom millisecond clock for id assignment
    pub fn with_clock(backend: S, key: impl Into<String>, clock: fn() -> i64) -> Self {
        let key = key.into();
        let recipes = load_recipes(&backend, &key);
        tracing::info!(key = %key, count = recipes.len(), "Recipe store opened");
        Self {
            backend,
            key,
            recipes,
            clock,
        }
    }

    /// Storage key the collection is persisted under
    pub fn key(&self) -> &str {
        &self.key
    }

    /// All recipes in display order
    pub fn recipes(&self) -> &[Recipe] {
        &self.recipes
    }

    /// Look up a recipe by id
    pub fn get(&self, id: RecipeId) -> Option<&Recipe> {
        self.recipes.iter().find(|r| r.id == id)
    }

    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }

    /// Re-read the collection from the backend, discarding the cached copy
    pub fn reload(&mut self) {
        self.recipes = load_recipes(&self.backend, &self.key);
    }

    /// Write the current collection to the backend
    pub fn save(&mut self) -> StorageResult<()> {
        save_recipes(&mut self.backend, &self.key, &self.recipes)
    }

    /// Append a recipe, assigning it a fresh id
    ///
    /// Any id already set on `recipe` is ignored.
    pub fn add(&mut self, mut recipe: Recipe) -> StorageResult<RecipeId> {
        recipe.validate()?;

        let id = self.next_id(&self.recipes);
        recipe.id = id;

        let mut next = self.recipes.clone();
        next.push(recipe);
        self.commit(next)?;

        tracing::info!(id, "Added recipe");
        Ok(id)
    }

    /// Replace the recipe with the same id
    ///
    /// Returns `false` without writing anything if no recipe matches.
    pub fn update(&mut self, recipe: Recipe) -> StorageResult<bool> {
        let Some(pos) = self.position(recipe.id) else {
            tracing::debug!(id = recipe.id, "Update ignored, no such recipe");
            return Ok(false);
        };
        recipe.validate()?;

        let id = recipe.id;
        let mut next = self.recipes.clone();
        next[pos] = recipe;
        self.commit(next)?;

        tracing::info!(id, "Updated recipe");
        Ok(true)
    }

    /// Delete the recipe with `id`; returns `false` if it was not present
    pub fn remove(&mut self, id: RecipeId) -> StorageResult<bool> {
        let Some(pos) = self.position(id) else {
            tracing::debug!(id, "Remove ignored, no such recipe");
            return Ok(false);
        };

        let mut next = self.recipes.clone();
        next.remove(pos);
        self.commit(next)?;

        tracing::info!(id, "Removed recipe");
        Ok(true)
    }

    /// Rescale a recipe's ingredient amounts to `new_servings`
    ///
    /// Non-positive serving counts are rejected before anything changes.
    /// Returns the rescaled recipe, or `None` if no recipe has `id`.
    pub fn rescale(&mut self, id: RecipeId, new_servings: i64) -> StorageResult<Option<Recipe>> {
        if new_servings <= 0 {
            return Err(StorageError::InvalidServings(new_servings));
        }
        let servings =
            u32::try_from(new_servings).map_err(|_| StorageError::InvalidServings(new_servings))?;

        let Some(pos) = self.position(id) else {
            tracing::debug!(id, "Rescale ignored, no such recipe");
            return Ok(None);
        };

        let from = self.recipes[pos].servings;
        if from == 0 {
            return Err(StorageError::Validation(format!(
                "recipe {} has no servings to rescale from",
                id
            )));
        }

        let mut next = self.recipes.clone();
        next[pos].rescale(servings);
        // Amounts can overflow to infinity or underflow to zero
        next[pos].validate()?;
        let rescaled = next[pos].clone();
        self.commit(next)?;

        tracing::info!(id, from, to = servings, "Rescaled recipe");
        Ok(Some(rescaled))
    }

    /// Append several recipes in a single write
    ///
    /// Either every recipe is added or none is. Returns the assigned ids in
    /// input order.
    pub fn add_all(&mut self, recipes: impl IntoIterator<Item = Recipe>) -> StorageResult<Vec<RecipeId>> {
        let mut next = self.recipes.clone();
        let mut ids = Vec::new();
        for mut recipe in recipes {
            recipe.validate()?;
            recipe.id = self.next_id(&next);
            ids.push(recipe.id);
            next.push(recipe);
        }

        if !ids.is_empty() {
            self.commit(next)?;
            tracing::info!(count = ids.len(), "Added recipes");
        }
        Ok(ids)
    }

    /// Add `recipes` only if the collection is currently empty
    ///
    /// Returns the number of recipes added.
    pub fn seed_if_empty(&mut self, recipes: impl IntoIterator<Item = Recipe>) -> StorageResult<usize> {
        if !self.recipes.is_empty() {
            return Ok(0);
        }

        let mut next = Vec::new();
        for mut recipe in recipes {
            recipe.validate()?;
            recipe.id = self.next_id(&next);
            next.push(recipe);
        }

        let count = next.len();
        if count > 0 {
            self.commit(next)?;
            tracing::info!(count, "Seeded example recipes");
        }
        Ok(count)
    }

    fn position(&self, id: RecipeId) -> Option<usize> {
        self.recipes.iter().position(|r| r.id == id)
    }

    /// Current time in ms, bumped past every id already in `existing`
    fn next_id(&self, existing: &[Recipe]) -> RecipeId {
        let now = (self.clock)();
        match existing.iter().map(|r| r.id).max() {
            Some(max) if now <= max => max + 1,
            _ => now,
        }
    }

    fn commit(&mut self, next: Vec<Recipe>) -> StorageResult<()> {
        save_recipes(&mut self.backend, &self.key, &next)?;
        self.recipes = next;
        Ok(())
    }
}

impl<S: KeyValueStore> std::fmt::Debug for RecipeStore<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecipeStore")
            .field("key", &self.key)
            .field("recipes", &self.recipes.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::kv::{FileKeyValueStore, MemoryKeyValueStore};
    use std::collections::HashSet;
    use tempfile::tempdir;

    fn fixed_clock() -> i64 {
        1_000
    }

    fn soup() -> Recipe {
        Recipe::new("Soup", 4)
            .with_id(1)
            .ingredient("Salt", 2.0, "tsp")
    }

    fn store_with(recipes: &[Recipe]) -> RecipeStore<MemoryKeyValueStore> {
        let mut backend = MemoryKeyValueStore::new();
        save_recipes(&mut backend, DEFAULT_STORAGE_KEY, recipes).unwrap();
        RecipeStore::open(backend, DEFAULT_STORAGE_KEY)
    }

    /// Backend whose writes always fail
    struct ReadOnlyBackend(MemoryKeyValueStore);

    impl KeyValueStore for ReadOnlyBackend {
        fn get(&self, key: &str) -> StorageResult<Option<String>> {
            self.0.get(key)
        }

        fn set(&mut self, _key: &str, _value: &str) -> StorageResult<()> {
            Err(std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only").into())
        }

        fn remove(&mut self, _key: &str) -> StorageResult<()> {
            Ok(())
        }
    }

    #[test]
    fn test_load_missing_is_empty() {
        let backend = MemoryKeyValueStore::new();
        assert!(load_recipes(&backend, DEFAULT_STORAGE_KEY).is_empty());
    }

    #[test]
    fn test_load_malformed_is_empty() {
        let mut backend = MemoryKeyValueStore::new();
        backend.set(DEFAULT_STORAGE_KEY, "{not json").unwrap();
        assert!(load_recipes(&backend, DEFAULT_STORAGE_KEY).is_empty());

        backend
            .set(DEFAULT_STORAGE_KEY, r#"[{"id":1,"name":"x"}]"#)
            .unwrap();
        assert!(load_recipes(&backend, DEFAULT_STORAGE_KEY).is_empty());
    }

    #[test]
    fn test_save_load_round_trip() {
        let collection = vec![
            soup(),
            Recipe::new("Bread", 3)
                .with_id(7)
                .ingredient("Flour", 333.333, "g")
                .ingredient("Yeast", 0.25, "tsp")
                .instructions("Knead.\nBake."),
            Recipe::new("Toast", 1).with_id(3),
        ];

        let mut backend = MemoryKeyValueStore::new();
        save_recipes(&mut backend, DEFAULT_STORAGE_KEY, &collection).unwrap();

        assert_eq!(load_recipes(&backend, DEFAULT_STORAGE_KEY), collection);
    }

    #[test]
    fn test_soup_rescale_scenario() {
        let mut store = store_with(&[soup()]);

        let rescaled = store.rescale(1, 8).unwrap().unwrap();
        assert_eq!(rescaled.servings, 8);
        assert_eq!(rescaled.ingredients[0].amount, 4.0);

        // Persisted, not just in memory
        store.reload();
        assert_eq!(store.get(1).unwrap().ingredients[0].amount, 4.0);
        assert_eq!(store.get(1).unwrap().servings, 8);
    }

    #[test]
    fn test_rescale_rejects_non_positive() {
        let mut store = store_with(&[soup()]);

        assert!(matches!(store.rescale(1, 0), Err(StorageError::InvalidServings(0))));
        assert!(matches!(store.rescale(1, -3), Err(StorageError::InvalidServings(-3))));
        assert!(matches!(
            store.rescale(1, 5_000_000_000),
            Err(StorageError::InvalidServings(5_000_000_000))
        ));

        assert_eq!(store.recipes(), &[soup()]);
        store.reload();
        assert_eq!(store.get(1).unwrap().servings, 4);
    }

    #[test]
    fn test_rescale_same_servings_keeps_amounts() {
        let mut store = store_with(&[soup()]);
        store.rescale(1, 4).unwrap();
        assert_eq!(store.get(1).unwrap(), &soup());
    }

    #[test]
    fn test_rescale_proportional() {
        let recipe = Recipe::new("Curry", 6)
            .with_id(2)
            .ingredient("Rice", 450.0, "g")
            .ingredient("Chili", 1.0, "pc");
        let mut store = store_with(&[recipe.clone()]);

        for n in [1, 5, 7, 12] {
            let before = store.get(2).unwrap().clone();
            let after = store.rescale(2, n).unwrap().unwrap();
            let factor = n as f64 / before.servings as f64;

            assert_eq!(after.servings, n as u32);
            for (a, b) in after.ingredients.iter().zip(&before.ingredients) {
                assert!((a.amount - b.amount * factor).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn test_rescale_overflow_keeps_collection() {
        let keep = Recipe::new("Keep me", 2).with_id(1).ingredient("Rice", 200.0, "g");
        let big = Recipe::new("Big", 1).with_id(2).ingredient("Salt", 1e300, "g");
        let mut store = store_with(&[keep, big]);
        let before = store.recipes().to_vec();

        assert!(matches!(
            store.rescale(2, 1_000_000_000),
            Err(StorageError::Validation(_))
        ));
        assert_eq!(store.recipes(), before.as_slice());

        store.reload();
        assert_eq!(store.recipes(), before.as_slice());
    }

    #[test]
    fn test_rescale_underflow_rejected() {
        let tiny = Recipe::new("Tiny", 1_000_000_000)
            .with_id(1)
            .ingredient("Saffron", 1e-320, "g");
        let mut store = store_with(&[tiny]);
        let before = store.recipes().to_vec();

        assert!(matches!(store.rescale(1, 1), Err(StorageError::Validation(_))));
        store.reload();
        assert_eq!(store.recipes(), before.as_slice());
    }

    #[test]
    fn test_rescale_stored_zero_servings() {
        let mut backend = MemoryKeyValueStore::new();
        backend
            .set(
                DEFAULT_STORAGE_KEY,
                r#"[{"id":1,"name":"Broken","ingredients":[{"name":"Salt","amount":1,"unit":"g"}],"instructions":"","servings":0}]"#,
            )
            .unwrap();
        let mut store = RecipeStore::open(backend, DEFAULT_STORAGE_KEY);
        assert_eq!(store.len(), 1);

        assert!(matches!(store.rescale(1, 4), Err(StorageError::Validation(_))));

        store.reload();
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(1).unwrap().ingredients[0].amount, 1.0);
        assert_eq!(store.get(1).unwrap().servings, 0);
    }

    #[test]
    fn test_add_all_single_write() {
        let mut store = RecipeStore::with_clock(MemoryKeyValueStore::new(), "recipes", fixed_clock);
        store.add(Recipe::new("A", 1)).unwrap();

        let ids = store
            .add_all(vec![Recipe::new("B", 2), Recipe::new("C", 3)])
            .unwrap();
        assert_eq!(ids, vec![1_001, 1_002]);
        assert_eq!(store.len(), 3);

        store.reload();
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_add_all_is_all_or_nothing() {
        let mut store = store_with(&[soup()]);
        let batch = vec![Recipe::new("Tea", 1), Recipe::new("", 1)];
        assert!(matches!(store.add_all(batch), Err(StorageError::Validation(_))));
        assert_eq!(store.recipes(), &[soup()]);

        let mut inner = MemoryKeyValueStore::new();
        save_recipes(&mut inner, "recipes", &[soup()]).unwrap();
        let mut store = RecipeStore::open(ReadOnlyBackend(inner), "recipes");
        let batch = vec![Recipe::new("Tea", 1), Recipe::new("Toast", 1)];
        assert!(matches!(store.add_all(batch), Err(StorageError::Io(_))));
        assert_eq!(store.recipes(), &[soup()]);
    }

    #[test]
    fn test_rescale_unknown_id() {
        let mut store = store_with(&[soup()]);
        assert!(store.rescale(99, 2).unwrap().is_none());
        assert_eq!(store.recipes(), &[soup()]);
    }

    #[test]
    fn test_add_assigns_unique_id() {
        let mut store = RecipeStore::with_clock(MemoryKeyValueStore::new(), "recipes", fixed_clock);

        let first = store.add(Recipe::new("A", 1)).unwrap();
        let second = store.add(Recipe::new("B", 1).with_id(first)).unwrap();
        let third = store.add(Recipe::new("C", 1)).unwrap();

        assert_eq!(first, 1_000);
        assert_eq!(second, 1_001);
        assert_eq!(third, 1_002);
        assert_eq!(store.len(), 3);

        let ids: HashSet<_> = store.recipes().iter().map(|r| r.id).collect();
        assert_eq!(ids.len(), 3);
    }

    #[test]
    fn test_add_grows_by_one() {
        let mut store = store_with(&[soup()]);
        let before = store.len();

        let id = store.add(Recipe::new("Salad", 2)).unwrap();

        assert_eq!(store.len(), before + 1);
        assert_ne!(id, 1);
        assert_eq!(store.recipes().last().unwrap().name, "Salad");
    }

    #[test]
    fn test_add_rejects_missing_name() {
        let mut store = store_with(&[]);
        assert!(matches!(
            store.add(Recipe::new("", 2)),
            Err(StorageError::Validation(_))
        ));
        assert!(store.is_empty());
    }

    #[test]
    fn test_update_replaces_matching() {
        let mut store = store_with(&[soup()]);
        let edited = soup().instructions("Simmer for 20 minutes.");

        assert!(store.update(edited.clone()).unwrap());
        assert_eq!(store.get(1).unwrap(), &edited);
    }

    #[test]
    fn test_update_unknown_is_noop() {
        let mut store = store_with(&[soup()]);
        assert!(!store.update(Recipe::new("Ghost", 1).with_id(42)).unwrap());
        assert_eq!(store.recipes(), &[soup()]);
    }

    #[test]
    fn test_remove_twice() {
        let mut store = store_with(&[soup(), Recipe::new("Tea", 1).with_id(2)]);

        assert!(store.remove(1).unwrap());
        assert_eq!(store.len(), 1);

        assert!(!store.remove(1).unwrap());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_failed_save_keeps_memory() {
        let mut inner = MemoryKeyValueStore::new();
        save_recipes(&mut inner, "recipes", &[soup()]).unwrap();
        let mut store = RecipeStore::open(ReadOnlyBackend(inner), "recipes");

        assert!(matches!(store.rescale(1, 8), Err(StorageError::Io(_))));
        assert!(store.add(Recipe::new("Tea", 1)).is_err());
        assert!(store.remove(1).is_err());

        assert_eq!(store.recipes(), &[soup()]);
    }

    #[test]
    fn test_seed_if_empty() {
        let mut store = RecipeStore::with_clock(MemoryKeyValueStore::new(), "recipes", fixed_clock);
        let seeds = vec![Recipe::new("A", 1), Recipe::new("B", 2)];

        assert_eq!(store.seed_if_empty(seeds.clone()).unwrap(), 2);
        assert_eq!(store.recipes()[0].id, 1_000);
        assert_eq!(store.recipes()[1].id, 1_001);

        // Already populated
        assert_eq!(store.seed_if_empty(seeds).unwrap(), 0);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_persistence_across_sessions() {
        let dir = tempdir().unwrap();

        let id = {
            let backend = FileKeyValueStore::open(dir.path()).unwrap();
            let mut store = RecipeStore::open(backend, "recipes");
            let id = store.add(soup()).unwrap();
            store.rescale(id, 2).unwrap();
            id
        };

        let backend = FileKeyValueStore::open(dir.path()).unwrap();
        let store = RecipeStore::open(backend, "recipes");

        let recipe = store.get(id).unwrap();
        assert_eq!(recipe.servings, 2);
        assert_eq!(recipe.ingredients[0].amount, 1.0);
    }
}
