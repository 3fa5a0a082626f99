//! Interactive Shell
//!
//! A line-oriented front end for [`RecipeBookView`]. Each input line is one
//! command; commands that edit a draft only work while a dialog is open.
//!
//! ```text
//! > add
//! [Add New Recipe] > name Soup
//! [Add New Recipe] > servings 4
//! [Add New Recipe] > ingredient 2 tsp Salt
//! [Add New Recipe] > save
//! Added 'Soup' (id 1718000000000)
//! > recalc 1718000000000
//! [Recalculate Servings] > servings 8
//! [Recalculate Servings] > save
//! ```

use super::render::{dialog_title, render_dialog, render_list, render_recipe};
use super::{Dialog, RecipeBookView};
use crate::storage::{Ingredient, KeyValueStore, RecipeId, StorageError};
use std::io::{self, BufRead, Write};
use thiserror::Error;

const HELP: &str = "\
Recipes:
  list                              List all recipes
  show <id>                         Show a recipe
  add                               Start a new recipe
  edit <id>                         Edit a recipe
  recalc <id>                       Recalculate a recipe for a new serving count
  delete <id>                       Delete a recipe

Dialog:
  name <text>                       Set the recipe name
  servings <n>                      Set servings (or the new serving count)
  instructions <text>               Set the instructions
  ingredient <amount> <unit> <name> Add an ingredient
  ingredient-set <n> <amount> <unit> <name>
                                    Replace ingredient number n
  ingredient-rm <n>                 Remove ingredient number n
  save                              Save and close the dialog
  cancel                            Discard changes and close the dialog

  help                              Show this help
  quit                              Exit
";

/// A parsed shell command
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    List,
    Show(RecipeId),
    Add,
    Edit(RecipeId),
    Recalc(RecipeId),
    Delete(RecipeId),
    Name(String),
    Servings(i64),
    Instructions(String),
    Ingredient(Ingredient),
    IngredientSet(usize, Ingredient),
    IngredientRm(usize),
    Save,
    Cancel,
    Help,
    Quit,
}

/// Errors from parsing a command line
#[derive(Error, Debug)]
pub enum CommandError {
    #[error("unknown command '{0}' (try 'help')")]
    Unknown(String),

    #[error("'{0}' needs an argument")]
    MissingArgument(&'static str),

    #[error("invalid {what}: {value:?}")]
    InvalidArgument { what: &'static str, value: String },

    #[error("{0}")]
    Ingredient(#[from] StorageError),
}

impl Command {
    /// Parse one input line; blank lines yield `None`
    pub fn parse(line: &str) -> Result<Option<Command>, CommandError> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }

        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        let command = match word.to_lowercase().as_str() {
            "list" | "ls" => Command::List,
            "show" => Command::Show(parse_id("show", rest)?),
            "add" | "new" => Command::Add,
            "edit" => Command::Edit(parse_id("edit", rest)?),
            "recalc" | "recalculate" | "rescale" => Command::Recalc(parse_id("recalc", rest)?),
            "delete" | "rm" => Command::Delete(parse_id("delete", rest)?),
            "name" => Command::Name(required("name", rest)?.to_string()),
            "servings" => {
                let raw = required("servings", rest)?;
                Command::Servings(raw.parse().map_err(|_| CommandError::InvalidArgument {
                    what: "serving count",
                    value: raw.to_string(),
                })?)
            }
            "instructions" => Command::Instructions(rest.to_string()),
            "ingredient" => Command::Ingredient(required("ingredient", rest)?.parse()?),
            "ingredient-set" => {
                let raw = required("ingredient-set", rest)?;
                let (index, ingredient) = raw
                    .split_once(char::is_whitespace)
                    .ok_or(CommandError::MissingArgument("ingredient-set"))?;
                Command::IngredientSet(parse_position(index)?, ingredient.parse()?)
            }
            "ingredient-rm" => Command::IngredientRm(parse_position(required("ingredient-rm", rest)?)?),
            "save" | "confirm" => Command::Save,
            "cancel" => Command::Cancel,
            "help" | "?" => Command::Help,
            "quit" | "exit" => Command::Quit,
            other => return Err(CommandError::Unknown(other.to_string())),
        };

        Ok(Some(command))
    }
}

fn required<'a>(command: &'static str, rest: &'a str) -> Result<&'a str, CommandError> {
    if rest.is_empty() {
        Err(CommandError::MissingArgument(command))
    } else {
        Ok(rest)
    }
}

fn parse_id(command: &'static str, rest: &str) -> Result<RecipeId, CommandError> {
    required(command, rest)?
        .parse()
        .map_err(|_| CommandError::InvalidArgument {
            what: "recipe id",
            value: rest.to_string(),
        })
}

/// Parse a 1-based ingredient position into an index
fn parse_position(raw: &str) -> Result<usize, CommandError> {
    match raw.trim().parse::<usize>() {
        Ok(n) if n > 0 => Ok(n - 1),
        _ => Err(CommandError::InvalidArgument {
            what: "ingredient number",
            value: raw.to_string(),
        }),
    }
}

/// Whether the shell should keep reading input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellOutcome {
    Continue,
    Quit,
}

/// Run one command against the view, writing feedback to `out`
pub fn execute<S: KeyValueStore, W: Write>(
    view: &mut RecipeBookView<S>,
    command: Command,
    out: &mut W,
) -> io::Result<ShellOutcome> {
    view.clear_messages();
    let dialog_open = view.dialog().is_open();

    match command {
        Command::List => write!(out, "{}", render_list(view.recipes()))?,
        Command::Show(id) => match view.store().get(id) {
            Some(recipe) => write!(out, "{}", render_recipe(recipe))?,
            None => writeln!(out, "No recipe with id {}", id)?,
        },
        Command::Add | Command::Edit(_) | Command::Recalc(_) | Command::Delete(_) if dialog_open => {
            writeln!(out, "Save or cancel the open dialog first")?;
        }
        Command::Add => view.open_add(),
        Command::Edit(id) => {
            if !view.open_edit(id) {
                writeln!(out, "No recipe with id {}", id)?;
            }
        }
        Command::Recalc(id) => {
            if !view.open_rescale(id) {
                writeln!(out, "No recipe with id {}", id)?;
            }
        }
        Command::Delete(id) => {
            // Unknown ids are a silent no-op; write failures land in view.error()
            let _ = view.delete(id);
        }
        Command::Servings(n) if matches!(view.dialog(), Dialog::Rescaling { .. }) => {
            view.set_new_servings(n);
        }
        Command::Name(_)
        | Command::Servings(_)
        | Command::Instructions(_)
        | Command::Ingredient(_)
        | Command::IngredientSet(..)
        | Command::IngredientRm(_)
            if view.draft().is_none() =>
        {
            writeln!(out, "No recipe dialog is open (use 'add' or 'edit <id>')")?;
        }
        Command::Name(name) => {
            view.set_name(name);
        }
        Command::Servings(n) => match u32::try_from(n) {
            Ok(servings) if servings > 0 => {
                view.set_servings(servings);
            }
            _ => writeln!(out, "error: servings must be a positive whole number")?,
        },
        Command::Instructions(text) => {
            view.set_instructions(text);
        }
        Command::Ingredient(ingredient) => {
            view.add_ingredient(ingredient);
        }
        Command::IngredientSet(index, ingredient) => {
            if !view.set_ingredient(index, ingredient) {
                writeln!(out, "No ingredient number {}", index + 1)?;
            }
        }
        Command::IngredientRm(index) => {
            if view.remove_ingredient(index).is_none() {
                writeln!(out, "No ingredient number {}", index + 1)?;
            }
        }
        Command::Save if !dialog_open => writeln!(out, "Nothing to save")?,
        Command::Save => {
            // Failures keep the dialog open and are reported below
            let _ = view.save();
        }
        Command::Cancel => {
            if dialog_open {
                view.cancel();
                writeln!(out, "Discarded changes")?;
            }
        }
        Command::Help => write!(out, "{}", HELP)?,
        Command::Quit => {
            if dialog_open {
                writeln!(out, "Discarding unsaved dialog")?;
                view.cancel();
            }
            return Ok(ShellOutcome::Quit);
        }
    }

    if let Some(error) = view.error() {
        writeln!(out, "error: {}", error)?;
    }
    if let Some(success) = view.success() {
        writeln!(out, "{}", success)?;
    }
    write!(out, "{}", render_dialog(view.dialog()))?;

    Ok(ShellOutcome::Continue)
}

/// Read commands from `input` until `quit` or end of input
pub fn run_shell<S: KeyValueStore, R: BufRead, W: Write>(
    view: &mut RecipeBookView<S>,
    input: R,
    out: &mut W,
) -> io::Result<()> {
    writeln!(out, "Recipe Book - type 'help' for commands")?;
    write!(out, "{}", render_list(view.recipes()))?;

    let mut lines = input.lines();
    loop {
        match dialog_title(view.dialog()) {
            Some(title) => write!(out, "[{}] > ", title)?,
            None => write!(out, "> ")?,
        }
        out.flush()?;

        let Some(line) = lines.next() else {
            writeln!(out)?;
            break;
        };

        match Command::parse(&line?) {
            Ok(Some(command)) => {
                tracing::debug!(?command, "Shell command");
                if execute(view, command, out)? == ShellOutcome::Quit {
                    break;
                }
            }
            Ok(None) => {}
            Err(e) => writeln!(out, "error: {}", e)?,
        }
    }

    if view.dialog().is_open() {
        view.cancel();
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{save_recipes, MemoryKeyValueStore, Recipe, RecipeStore};
    use std::io::Cursor;

    fn view_with(recipes: &[Recipe]) -> RecipeBookView<MemoryKeyValueStore> {
        let mut backend = MemoryKeyValueStore::new();
        save_recipes(&mut backend, "recipes", recipes).unwrap();
        RecipeBookView::new(RecipeStore::open(backend, "recipes"))
    }

    fn soup() -> Recipe {
        Recipe::new("Soup", 4)
            .with_id(1)
            .ingredient("Salt", 2.0, "tsp")
    }

    fn run(view: &mut RecipeBookView<MemoryKeyValueStore>, script: &str) -> String {
        let mut out = Vec::new();
        run_shell(view, Cursor::new(script.to_string()), &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(Command::parse("  ").unwrap(), None);
        assert_eq!(Command::parse("list").unwrap(), Some(Command::List));
        assert_eq!(Command::parse("EDIT 42").unwrap(), Some(Command::Edit(42)));
        assert_eq!(
            Command::parse("name  Tomato Soup ").unwrap(),
            Some(Command::Name("Tomato Soup".to_string()))
        );
        assert_eq!(Command::parse("servings -2").unwrap(), Some(Command::Servings(-2)));
        assert_eq!(
            Command::parse("ingredient 1/2 cup Sugar").unwrap(),
            Some(Command::Ingredient(Ingredient::new("Sugar", 0.5, "cup")))
        );
        assert_eq!(
            Command::parse("ingredient-set 2 3 g Yeast").unwrap(),
            Some(Command::IngredientSet(1, Ingredient::new("Yeast", 3.0, "g")))
        );
        assert_eq!(Command::parse("ingredient-rm 1").unwrap(), Some(Command::IngredientRm(0)));
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(Command::parse("bake"), Err(CommandError::Unknown(_))));
        assert!(matches!(Command::parse("edit"), Err(CommandError::MissingArgument("edit"))));
        assert!(matches!(
            Command::parse("show soup"),
            Err(CommandError::InvalidArgument { .. })
        ));
        assert!(matches!(Command::parse("ingredient Salt"), Err(CommandError::Ingredient(_))));
        assert!(Command::parse("ingredient-rm 0").is_err());
    }

    #[test]
    fn test_shell_create_recipe() {
        let mut view = view_with(&[]);
        let out = run(
            &mut view,
            "add\nname Pancakes\nservings 2\ningredient 200 g Flour\ningredient 2 pcs Eggs\ninstructions Mix and fry.\nsave\nquit\n",
        );

        assert!(out.contains("[Add New Recipe] > "));
        assert!(out.contains("Added 'Pancakes'"));

        let recipe = &view.recipes()[0];
        assert_eq!(recipe.name, "Pancakes");
        assert_eq!(recipe.servings, 2);
        assert_eq!(recipe.ingredients.len(), 2);
        assert_eq!(recipe.instructions, "Mix and fry.");
    }

    #[test]
    fn test_shell_rescale() {
        let mut view = view_with(&[soup()]);
        let out = run(&mut view, "recalc 1\nservings 8\nsave\nshow 1\n");

        assert!(out.contains("Rescaled 'Soup' to 8 servings"));
        assert!(out.contains("1. 4 tsp Salt"));
        assert_eq!(view.recipes()[0].servings, 8);
    }

    #[test]
    fn test_shell_rescale_invalid_keeps_dialog() {
        let mut view = view_with(&[soup()]);
        let out = run(&mut view, "recalc 1\nservings 0\nsave\n");

        assert!(out.contains("error: Invalid serving count: 0"));
        assert_eq!(view.recipes()[0], soup());
        // End of input closes the dialog without saving
        assert!(!view.dialog().is_open());
    }

    #[test]
    fn test_shell_edit_cancel() {
        let mut view = view_with(&[soup()]);
        let out = run(&mut view, "edit 1\nname Stew\ningredient-rm 1\ncancel\n");

        assert!(out.contains("Discarded changes"));
        assert_eq!(view.recipes()[0], soup());
    }

    #[test]
    fn test_shell_dialog_guards() {
        let mut view = view_with(&[soup()]);
        let out = run(&mut view, "name Stew\nedit 1\nadd\ndelete 1\ncancel\nedit 99\n");

        assert!(out.contains("No recipe dialog is open"));
        assert!(out.contains("Save or cancel the open dialog first"));
        assert!(out.contains("No recipe with id 99"));
        assert_eq!(view.recipes().len(), 1);
    }

    #[test]
    fn test_shell_delete() {
        let mut view = view_with(&[soup()]);
        let out = run(&mut view, "delete 1\ndelete 1\nlist\n");

        assert!(out.contains("Deleted 'Soup'"));
        assert!(out.contains("No recipes yet"));
        assert!(view.recipes().is_empty());
    }

    #[test]
    fn test_shell_reports_parse_errors() {
        let mut view = view_with(&[]);
        let out = run(&mut view, "bake 1\n");
        assert!(out.contains("error: unknown command 'bake'"));
    }
}
