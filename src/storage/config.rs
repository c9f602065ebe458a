//! Configuration handling for the tracker
//!
//! Configuration is stored in `~/.config/tunic-tracker/config.toml` (or the
//! platform equivalent) and can be replaced with `--config`. Every field has a
//! default, so a missing file is the same as an empty one.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{CodeRegistry, WorldRegistry};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to parse configuration: {0}")]
    Parse(String),
}

/// Output format for commands
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// User configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// Game data directory (the one holding `SAVES/` and `Randomizer/`)
    pub game_dir: Option<PathBuf>,

    /// Spoiler log, defaults to `<game_dir>/Randomizer/Spoiler.log`
    pub spoiler_path: Option<PathBuf>,

    /// Save directory, defaults to `<game_dir>/SAVES`
    pub saves_dir: Option<PathBuf>,

    /// Extension of save slot files
    pub save_extension: String,

    /// Watch poll interval in milliseconds
    pub poll_interval_ms: u64,

    /// Replacement world table
    pub world_file: Option<PathBuf>,

    /// Replacement code flag table
    pub codes_file: Option<PathBuf>,

    /// Default output format (text or json)
    pub default_format: OutputFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            game_dir: None,
            spoiler_path: None,
            saves_dir: None,
            save_extension: "tunic".to_string(),
            poll_interval_ms: 250,
            world_file: None,
            codes_file: None,
            default_format: OutputFormat::Text,
        }
    }
}

impl Config {
    /// Loads configuration from `explicit`, or from the default location
    ///
    /// An explicit path must exist; the default one may be missing.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => {
                if !path.exists() {
                    anyhow::bail!("Config file not found: {}", path.display());
                }
                path.to_path_buf()
            }
            None => match Self::default_path() {
                Some(path) if path.exists() => path,
                _ => return Ok(Self::default()),
            },
        };

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;

        Self::from_toml_str(&content)
            .with_context(|| format!("Failed to load config: {}", path.display()))
    }

    /// Parses and validates configuration text
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.save_extension.is_empty() {
            return Err(ConfigError::Invalid("save_extension must not be empty".to_string()));
        }
        if self.save_extension.starts_with('.') {
            return Err(ConfigError::Invalid(format!(
                "save_extension should not include the dot: {}",
                self.save_extension
            )));
        }
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::Invalid("poll_interval_ms must be positive".to_string()));
        }
        Ok(())
    }

    /// Returns the config directory
    pub fn config_dir() -> Option<PathBuf> {
        ProjectDirs::from("", "", "tunic-tracker").map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Returns the default config file location
    pub fn default_path() -> Option<PathBuf> {
        Self::config_dir().map(|dir| dir.join("config.toml"))
    }

    /// Effective spoiler log path
    pub fn spoiler_path(&self) -> Option<PathBuf> {
        self.spoiler_path.clone().or_else(|| {
            self.game_dir
                .as_ref()
                .map(|dir| dir.join("Randomizer").join("Spoiler.log"))
        })
    }

    /// Effective save directory
    pub fn saves_dir(&self) -> Option<PathBuf> {
        self.saves_dir
            .clone()
            .or_else(|| self.game_dir.as_ref().map(|dir| dir.join("SAVES")))
    }

    /// Save directory, or an error naming the missing setting
    pub fn require_saves_dir(&self) -> Result<PathBuf> {
        self.saves_dir().ok_or_else(|| {
            anyhow::anyhow!("No save directory configured. Set game_dir or pass --game-dir.")
        })
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Loads the world table, built-in unless `world_file` is set
    pub fn world(&self) -> Result<WorldRegistry> {
        match &self.world_file {
            Some(path) => WorldRegistry::from_file(path)
                .with_context(|| format!("Failed to load world table: {}", path.display())),
            None => WorldRegistry::builtin().context("Failed to load built-in world table"),
        }
    }

    /// Loads the code flag table, built-in unless `codes_file` is set
    pub fn codes(&self) -> Result<CodeRegistry> {
        match &self.codes_file {
            Some(path) => CodeRegistry::from_file(path)
                .with_context(|| format!("Failed to load code table: {}", path.display())),
            None => CodeRegistry::builtin().context("Failed to load built-in code table"),
        }
    }
}
