//! One-shot parse command

use anyhow::{Context, Result};

use super::output::Output;
use super::render;
use crate::parse::Parser;
use crate::storage::{most_recent_save, Config};

pub fn run(
    output: &Output,
    config: &Config,
    no_spoiler: bool,
    save: Option<&str>,
    region: Option<&str>,
) -> Result<()> {
    let world = config.world()?;
    let codes = config.codes()?;
    let saves_dir = config.require_saves_dir()?;

    let save_name = match save {
        Some(name) => name.to_string(),
        None => most_recent_save(&saves_dir, &config.save_extension)?.ok_or_else(|| {
            anyhow::anyhow!("No save files found in {}", saves_dir.display())
        })?,
    };
    let save_path = saves_dir.join(&save_name);

    let parser = Parser::new(&world, &codes);
    let snapshot = if no_spoiler {
        parser.parse_without_spoiler(&save_path)
    } else {
        let spoiler = config.spoiler_path().ok_or_else(|| {
            anyhow::anyhow!("No spoiler log configured. Set game_dir or use --no-spoiler.")
        })?;
        parser.parse_with_spoiler(&save_path, &spoiler)
    }
    .with_context(|| format!("Failed to parse {}", save_name))?;

    match region {
        Some(name) => {
            let found = snapshot
                .region(name)
                .ok_or_else(|| anyhow::anyhow!("Unknown region: {}", name))?;
            if output.is_json() {
                output.data(found);
            } else {
                render::print_region(name, found);
            }
        }
        None => {
            if output.is_json() {
                output.data(&snapshot);
            } else {
                render::print_summary(&snapshot);
            }
        }
    }

    Ok(())
}
