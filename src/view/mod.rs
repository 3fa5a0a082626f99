//! Recipe Book View
//!
//! Headless view state for the recipe list and its edit dialog. Front ends
//! (the interactive shell, the CLI) call these operations on user action
//! and render the result.
//!
//! ```text
//!            open_add               open_edit(id)          open_rescale(id)
//!   Idle ───────────────► Creating   Idle ─────► Editing    Idle ─────► Rescaling
//!    ▲   save (add) / cancel  │        ▲ save (update) │      ▲ save (rescale) │
//!    └────────────────────────┘        └───────────────┘      └────────────────┘
//! ```
//!
//! Drafts are owned copies held in [`Dialog`]; the stored collection only
//! changes when the dialog is saved.

pub mod render;
pub mod shell;

use crate::storage::{Ingredient, KeyValueStore, Recipe, RecipeId, RecipeStore, StorageResult};
use chrono::Utc;

pub use render::{dialog_title, format_amount, render_dialog, render_list, render_recipe};
pub use shell::{run_shell, Command, ShellOutcome};

/// The edit dialog and whatever it is holding
#[derive(Debug, Clone, PartialEq)]
pub enum Dialog {
    /// Dialog closed
    Idle,
    /// Entering a new recipe; the draft id is a placeholder
    Creating { draft: Recipe },
    /// Editing a copy of a stored recipe
    Editing { draft: Recipe },
    /// Entering a new serving count for a stored recipe
    Rescaling {
        id: RecipeId,
        name: String,
        current_servings: u32,
        new_servings: i64,
    },
}

impl Dialog {
    pub fn is_open(&self) -> bool {
        !matches!(self, Dialog::Idle)
    }

    /// The recipe draft, when creating or editing
    pub fn draft(&self) -> Option<&Recipe> {
        match self {
            Dialog::Creating { draft } | Dialog::Editing { draft } => Some(draft),
            _ => None,
        }
    }

    fn draft_mut(&mut self) -> Option<&mut Recipe> {
        match self {
            Dialog::Creating { draft } | Dialog::Editing { draft } => Some(draft),
            _ => None,
        }
    }
}

/// View over a recipe store
pub struct RecipeBookView<S: KeyValueStore> {
    store: RecipeStore<S>,
    dialog: Dialog,
    /// Error message to display
    error: Option<String>,
    /// Success message to display
    success: Option<String>,
}

impl<S: KeyValueStore> RecipeBookView<S> {
    pub fn new(store: RecipeStore<S>) -> Self {
        Self {
            store,
            dialog: Dialog::Idle,
            error: None,
            success: None,
        }
    }

    pub fn store(&self) -> &RecipeStore<S> {
        &self.store
    }

    /// Stored recipes in display order
    pub fn recipes(&self) -> &[Recipe] {
        self.store.recipes()
    }

    pub fn dialog(&self) -> &Dialog {
        &self.dialog
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn success(&self) -> Option<&str> {
        self.success.as_deref()
    }

    pub fn clear_messages(&mut self) {
        self.error = None;
        self.success = None;
    }

    /// Open the dialog with a blank draft
    pub fn open_add(&mut self) {
        self.clear_messages();
        let draft = Recipe::new("", 1).with_id(Utc::now().timestamp_millis());
        self.dialog = Dialog::Creating { draft };
    }

    /// Open the dialog with a copy of recipe `id`
    ///
    /// Returns `false` and stays closed if there is no such recipe.
    pub fn open_edit(&mut self, id: RecipeId) -> bool {
        self.clear_messages();
        match self.store.get(id) {
            Some(recipe) => {
                self.dialog = Dialog::Editing {
                    draft: recipe.clone(),
                };
                true
            }
            None => false,
        }
    }

    /// Open the serving-count dialog for recipe `id`
    pub fn open_rescale(&mut self, id: RecipeId) -> bool {
        self.clear_messages();
        match self.store.get(id) {
            Some(recipe) => {
                self.dialog = Dialog::Rescaling {
                    id,
                    name: recipe.name.clone(),
                    current_servings: recipe.servings,
                    new_servings: i64::from(recipe.servings),
                };
                true
            }
            None => false,
        }
    }

    pub fn draft(&self) -> Option<&Recipe> {
        self.dialog.draft()
    }

    /// Set the draft's name; returns `false` if no draft is open
    pub fn set_name(&mut self, name: impl Into<String>) -> bool {
        self.edit_draft(|draft| draft.name = name.into())
    }

    pub fn set_instructions(&mut self, instructions: impl Into<String>) -> bool {
        self.edit_draft(|draft| draft.instructions = instructions.into())
    }

    /// Set the draft's serving count without touching ingredient amounts
    pub fn set_servings(&mut self, servings: u32) -> bool {
        self.edit_draft(|draft| draft.servings = servings)
    }

    pub fn add_ingredient(&mut self, ingredient: Ingredient) -> bool {
        self.edit_draft(|draft| draft.ingredients.push(ingredient))
    }

    /// Replace the draft ingredient at `index`
    pub fn set_ingredient(&mut self, index: usize, ingredient: Ingredient) -> bool {
        match self.dialog.draft_mut() {
            Some(draft) if index < draft.ingredients.len() => {
                draft.ingredients[index] = ingredient;
                true
            }
            _ => false,
        }
    }

    /// Remove the draft ingredient at `index`
    pub fn remove_ingredient(&mut self, index: usize) -> Option<Ingredient> {
        match self.dialog.draft_mut() {
            Some(draft) if index < draft.ingredients.len() => Some(draft.ingredients.remove(index)),
            _ => None,
        }
    }

    /// Set the target serving count in the rescale dialog
    pub fn set_new_servings(&mut self, servings: i64) -> bool {
        match &mut self.dialog {
            Dialog::Rescaling { new_servings, .. } => {
                *new_servings = servings;
                true
            }
            _ => false,
        }
    }

    /// Save (or confirm) the open dialog
    ///
    /// On success the dialog closes. On failure the dialog stays open with
    /// its draft intact, the error is recorded for display and returned.
    pub fn save(&mut self) -> StorageResult<()> {
        self.clear_messages();

        let result = match &self.dialog {
            Dialog::Idle => return Ok(()),
            Dialog::Creating { draft } => {
                let name = draft.name.clone();
                self.store
                    .add(draft.clone())
                    .map(|id| format!("Added '{}' (id {})", name, id))
            }
            Dialog::Editing { draft } => {
                let name = draft.name.clone();
                self.store.update(draft.clone()).map(|updated| {
                    if updated {
                        format!("Saved '{}'", name)
                    } else {
                        tracing::debug!("Edited recipe no longer exists, nothing saved");
                        String::new()
                    }
                })
            }
            Dialog::Rescaling {
                id, new_servings, ..
            } => self.store.rescale(*id, *new_servings).map(|rescaled| match rescaled {
                Some(recipe) => format!("Rescaled '{}' to {} servings", recipe.name, recipe.servings),
                None => String::new(),
            }),
        };

        match result {
            Ok(message) => {
                self.dialog = Dialog::Idle;
                if !message.is_empty() {
                    self.success = Some(message);
                }
                Ok(())
            }
            Err(e) => {
                self.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Close the dialog, discarding any draft
    pub fn cancel(&mut self) {
        self.clear_messages();
        self.dialog = Dialog::Idle;
    }

    /// Delete recipe `id`; unknown ids are ignored
    pub fn delete(&mut self, id: RecipeId) -> StorageResult<bool> {
        self.clear_messages();
        let name = self.store.get(id).map(|r| r.name.clone());
        match self.store.remove(id) {
            Ok(removed) => {
                if let (true, Some(name)) = (removed, name) {
                    self.success = Some(format!("Deleted '{}'", name));
                }
                Ok(removed)
            }
            Err(e) => {
                self.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    fn edit_draft(&mut self, edit: impl FnOnce(&mut Recipe)) -> bool {
        match self.dialog.draft_mut() {
            Some(draft) => {
                edit(draft);
                true
            }
            None => false,
        }
    }
}
