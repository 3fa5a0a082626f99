//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use crate::storage::DEFAULT_STORAGE_KEY;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Recipe storage configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Key the recipe collection is stored under
    #[serde(default = "default_key")]
    pub key: String,

    /// Populate an empty collection with example recipes on startup
    #[serde(default = "default_seed_examples")]
    pub seed_examples: bool,
}

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|p| p.join("recipe-book"))
        .unwrap_or_else(|| PathBuf::from("./recipe_data"))
}

fn default_key() -> String {
    DEFAULT_STORAGE_KEY.to_string()
}

fn default_seed_examples() -> bool {
    true
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            key: default_key(),
            seed_examples: default_seed_examples(),
        }
    }
}

impl StorageConfig {
    /// Data directory with a leading `~` expanded
    pub fn data_path(&self) -> PathBuf {
        match self.data_dir.strip_prefix("~") {
            Ok(rest) => dirs::home_dir()
                .map(|home| home.join(rest))
                .unwrap_or_else(|| self.data_dir.clone()),
            Err(_) => self.data_dir.clone(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,

    pub file: Option<String>,
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: None,
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    ///
    /// Returns the config and the file it came from, if any. The first
    /// existing file wins; a file that exists but fails to load is an error.
    pub fn load_default() -> Result<(Self, Option<PathBuf>), ConfigError> {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("recipe-book").join("config.toml")),
            Some(PathBuf::from("/etc/recipe-book/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ];

        for path in config_paths.iter().flatten() {
            if path.exists() {
                let config = Self::load_with_env(path)?;
                return Ok((config, Some(path.clone())));
            }
        }

        // Fall back to environment-only config
        Ok((Self::from_env(), None))
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        // Storage overrides
        if let Some(data_dir) = var("RECIPE_BOOK_DATA_DIR") {
            self.storage.data_dir = PathBuf::from(data_dir);
        }
        if let Some(key) = var("RECIPE_BOOK_STORAGE_KEY") {
            self.storage.key = key;
        }
        if let Some(seed) = var("RECIPE_BOOK_SEED") {
            match seed.to_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => self.storage.seed_examples = true,
                "0" | "false" | "no" | "off" => self.storage.seed_examples = false,
                _ => {}
            }
        }

        // Logging overrides
        if let Some(level) = var("RECIPE_BOOK_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = var("RECIPE_BOOK_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Recipe Book Configuration
#
# Environment variables override these settings:
# - RECIPE_BOOK_DATA_DIR
# - RECIPE_BOOK_STORAGE_KEY
# - RECIPE_BOOK_SEED
# - RECIPE_BOOK_LOG_LEVEL
# - RECIPE_BOOK_LOG_FORMAT

[storage]
# Directory holding the recipe collection
data_dir = "~/.local/share/recipe-book"

# Key (file name without .json) the collection is stored under
key = "recipes"

# Add example recipes when the collection is empty
seed_examples = true

[logging]
# Log level: trace, debug, info, warn, error
level = "warn"

# Log format: pretty (for development) or json
format = "pretty"

# Optional log file path (logs go to stderr otherwise)
# file = "/tmp/recipe-book.log"
"#
    .to_string()
}
