//! # Storage Layer
//!
//! Everything that touches the filesystem outside the parsers themselves.
//!
//! ## Locations
//!
//! | Data | Format | Location |
//! |------|--------|----------|
//! | Config | TOML | `~/.config/tunic-tracker/config.toml` |
//! | Saves | `key\|value` lines | `<game_dir>/SAVES/*.tunic` |
//! | Spoiler | text | `<game_dir>/Randomizer/Spoiler.log` |
//!
//! ## Key Types
//!
//! - [`Config`] - User configuration and derived paths
//! - [`most_recent_save`] - Picks the save slot written last

mod config;
mod saves;

pub use config::{Config, ConfigError, OutputFormat};
pub use saves::{modified_at, most_recent_save, SelectError};
