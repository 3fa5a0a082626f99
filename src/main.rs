//! Recipe Book CLI
//!
//! Command-line interface for the recipe book:
//! - List and show recipes
//! - Add, edit and delete recipes
//! - Rescale a recipe to a new serving count
//! - Import/Export recipes
//! - Interactive shell

use anyhow::{bail, Context};
use clap::{Parser, Subcommand, ValueEnum};
use recipe_book::config::{generate_default_config, Config, LoggingConfig};
use recipe_book::storage::{example_recipes, FileKeyValueStore, Ingredient, RecipeId, RecipeStore};
use recipe_book::view::{render_list, render_recipe, run_shell, RecipeBookView};
use recipe_book::{export_csv, export_json, import_json};
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "recipe-book")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Recipe book with serving-size rescaling")]
#[command(long_about = "Recipe Book keeps your recipes in local storage.\nAdd, edit and delete recipes, and recalculate ingredient amounts for any number of servings.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: search standard locations)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Data directory (overrides config)
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table", global = true)]
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List all recipes
    List,

    /// Show a recipe
    Show {
        /// Recipe id
        id: RecipeId,
    },

    /// Add a recipe
    Add {
        /// Recipe name
        #[arg(short, long)]
        name: String,
        /// Number of servings
        #[arg(short, long, default_value = "1")]
        servings: u32,
        /// Preparation instructions
        #[arg(long)]
        instructions: Option<String>,
        /// Ingredient as "<amount> <unit> <name>", e.g. "2 tsp Salt" (repeatable)
        #[arg(short = 'i', long = "ingredient")]
        ingredients: Vec<String>,
    },

    /// Edit a recipe's fields (does not rescale amounts)
    Edit {
        /// Recipe id
        id: RecipeId,
        #[arg(short, long)]
        name: Option<String>,
        #[arg(short, long)]
        servings: Option<u32>,
        #[arg(long)]
        instructions: Option<String>,
        /// Replace all ingredients (repeatable)
        #[arg(short = 'i', long = "ingredient")]
        ingredients: Vec<String>,
    },

    /// Delete a recipe
    Delete {
        /// Recipe id
        id: RecipeId,
    },

    /// Recalculate ingredient amounts for a new serving count
    Rescale {
        /// Recipe id
        id: RecipeId,
        /// New number of servings
        #[arg(allow_negative_numbers = true)]
        servings: i64,
    },

    /// Export all recipes (JSON, or CSV with --format csv)
    Export {
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Import recipes from a JSON export (ids are reassigned)
    Import {
        /// Path to JSON file
        path: PathBuf,
    },

    /// Interactive shell
    Shell,

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Commands::Config { output } = &cli.command {
        return write_default_config(output.as_ref());
    }

    let mut config = match &cli.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default()?.0,
    };
    if let Some(dir) = &cli.data_dir {
        config.storage.data_dir = dir.clone();
    }

    init_tracing(&config.logging)?;
    tracing::info!("Recipe Book v{}", env!("CARGO_PKG_VERSION"));

    let data_path = config.storage.data_path();
    tracing::info!("Data directory: {:?}", data_path);

    let backend = FileKeyValueStore::open(&data_path)
        .with_context(|| format!("Failed to open data directory {:?}", data_path))?;
    let mut store = RecipeStore::open(backend, config.storage.key.as_str());

    if config.storage.seed_examples {
        store.seed_if_empty(example_recipes())?;
    }

    match cli.command {
        Commands::List => match cli.format {
            OutputFormat::Table => print!("{}", render_list(store.recipes())),
            OutputFormat::Json => println!("{}", export_json(store.recipes())?),
            OutputFormat::Csv => print!("{}", export_csv(store.recipes())?),
        },

        Commands::Show { id } => match store.get(id) {
            Some(recipe) => match cli.format {
                OutputFormat::Table => print!("{}", render_recipe(recipe)),
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(recipe)?),
                OutputFormat::Csv => print!("{}", export_csv(std::slice::from_ref(recipe))?),
            },
            None => println!("No recipe with id {}", id),
        },

        Commands::Add {
            name,
            servings,
            instructions,
            ingredients,
        } => {
            let ingredients = parse_ingredients(&ingredients)?;
            let mut view = RecipeBookView::new(store);

            view.open_add();
            view.set_name(name);
            view.set_servings(servings);
            if let Some(text) = instructions {
                view.set_instructions(text);
            }
            for ingredient in ingredients {
                view.add_ingredient(ingredient);
            }
            view.save()?;
            report(&view);
        }

        Commands::Edit {
            id,
            name,
            servings,
            instructions,
            ingredients,
        } => {
            let ingredients = parse_ingredients(&ingredients)?;
            let mut view = RecipeBookView::new(store);

            if !view.open_edit(id) {
                println!("No recipe with id {}", id);
                return Ok(());
            }
            if let Some(name) = name {
                view.set_name(name);
            }
            if let Some(servings) = servings {
                view.set_servings(servings);
            }
            if let Some(text) = instructions {
                view.set_instructions(text);
            }
            if !ingredients.is_empty() {
                while view.remove_ingredient(0).is_some() {}
                for ingredient in ingredients {
                    view.add_ingredient(ingredient);
                }
            }
            view.save()?;
            report(&view);
        }

        Commands::Delete { id } => {
            let mut view = RecipeBookView::new(store);
            if !view.delete(id)? {
                println!("No recipe with id {}", id);
            }
            report(&view);
        }

        Commands::Rescale { id, servings } => {
            let mut view = RecipeBookView::new(store);

            if !view.open_rescale(id) {
                println!("No recipe with id {}", id);
                return Ok(());
            }
            view.set_new_servings(servings);
            view.save()?;
            report(&view);

            if let Some(recipe) = view.store().get(id) {
                print!("{}", render_recipe(recipe));
            }
        }

        Commands::Export { output } => {
            let data = match cli.format {
                OutputFormat::Csv => export_csv(store.recipes())?,
                OutputFormat::Table | OutputFormat::Json => export_json(store.recipes())?,
            };

            match output {
                Some(path) => {
                    std::fs::write(&path, &data)
                        .with_context(|| format!("Failed to write {:?}", path))?;
                    println!("Exported {} recipes to {:?}", store.len(), path);
                }
                None => println!("{}", data.trim_end()),
            }
        }

        Commands::Import { path } => {
            let text = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {:?}", path))?;
            let recipes = import_json(&text).with_context(|| format!("Invalid recipe file {:?}", path))?;

            let ids = store.add_all(recipes)?;
            println!("Imported {} recipes", ids.len());
        }

        Commands::Shell => {
            let mut view = RecipeBookView::new(store);
            let stdin = std::io::stdin();
            let mut stdout = std::io::stdout();
            run_shell(&mut view, stdin.lock(), &mut stdout)?;
        }

        Commands::Config { output } => write_default_config(output.as_ref())?,
    }

    Ok(())
}

fn init_tracing(logging: &LoggingConfig) -> anyhow::Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(format!("recipe_book={}", logging.level)));

    // Log to stderr so command output on stdout stays clean
    let writer = match &logging.file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path))?;
            BoxMakeWriter::new(Mutex::new(file))
        }
        None => BoxMakeWriter::new(std::io::stderr),
    };

    let layer = tracing_subscriber::fmt::layer()
        .with_writer(writer)
        .with_ansi(logging.file.is_none());

    let registry = tracing_subscriber::registry().with(filter);
    if logging.format == "json" {
        registry.with(layer.json()).init();
    } else {
        registry.with(layer).init();
    }
    Ok(())
}

fn parse_ingredients(lines: &[String]) -> anyhow::Result<Vec<Ingredient>> {
    lines
        .iter()
        .map(|line| line.parse::<Ingredient>().map_err(anyhow::Error::from))
        .collect()
}

fn report<S: recipe_book::KeyValueStore>(view: &RecipeBookView<S>) {
    if let Some(message) = view.success() {
        println!("{}", message);
    }
}

fn write_default_config(output: Option<&PathBuf>) -> anyhow::Result<()> {
    let config = generate_default_config();

    match output {
        Some(path) => {
            if path.exists() {
                bail!("{:?} already exists, not overwriting", path);
            }
            // Create parent directory if needed
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, &config)?;
            println!("Config written to {:?}", path);
        }
        None => {
            print!("{}", config);
        }
    }
    Ok(())
}
