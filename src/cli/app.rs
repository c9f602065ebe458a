//! Main CLI application structure

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use super::output::{Output, OutputFormat};
use super::{parse_cmd, watch_cmd, world_cmd};
use crate::storage::{most_recent_save, Config};

#[derive(Parser)]
#[command(name = "tracker")]
#[command(author, version, about = "Entrance and check tracker for Tunic randomizer runs")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format (defaults to the configured one)
    #[arg(long, short = 'f', global = true)]
    pub format: Option<OutputFormat>,

    /// Enable debug logging on stderr
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Config file to use instead of the default location
    #[arg(long, global = true, env = "TUNIC_TRACKER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Game data directory (holds SAVES/ and Randomizer/)
    #[arg(long, global = true)]
    pub game_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Parse the latest save into a snapshot
    Parse {
        /// Pair entrances from the save alone, ignoring the spoiler log
        #[arg(long)]
        no_spoiler: bool,

        /// Save file name inside the saves directory (defaults to the newest)
        #[arg(long)]
        save: Option<String>,

        /// Show a single region
        #[arg(long)]
        region: Option<String>,
    },

    /// Re-parse whenever the save or spoiler changes
    Watch {
        /// Poll interval in milliseconds (defaults to the configured one)
        #[arg(long)]
        interval_ms: Option<u64>,

        /// Stop after this many snapshots
        #[arg(long)]
        count: Option<usize>,

        /// Pair entrances from the save alone, ignoring the spoiler log
        #[arg(long)]
        no_spoiler: bool,
    },

    /// Print the name of the most recently written save
    Latest,

    /// List regions of the world table
    World {
        /// Show doors, checks and scenes of one region
        region: Option<String>,
    },

    /// Show the effective configuration
    Config,
}

/// Installs the stderr log subscriber
///
/// `RUST_LOG` wins over `--verbose`.
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .or_else(|_| EnvFilter::try_new(default_level))
                .unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Loads the config file and applies command-line overrides
fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(game_dir) = &cli.game_dir {
        config.game_dir = Some(game_dir.clone());
        config.spoiler_path = None;
        config.saves_dir = None;
    }
    Ok(config)
}

/// Main entry point for the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = load_config(&cli)?;
    let format = cli.format.unwrap_or_else(|| config.default_format.into());
    let output = Output::new(format);

    tracing::debug!(config = ?cli.config, game_dir = ?config.game_dir, "Tracker starting");

    match cli.command {
        Commands::Parse {
            no_spoiler,
            save,
            region,
        } => parse_cmd::run(&output, &config, no_spoiler, save.as_deref(), region.as_deref())?,

        Commands::Watch {
            interval_ms,
            count,
            no_spoiler,
        } => watch_cmd::run(&output, &config, interval_ms, count, no_spoiler)?,

        Commands::Latest => latest(&output, &config)?,

        Commands::World { region } => world_cmd::run(&output, &config, region.as_deref())?,

        Commands::Config => show_config(&output, &config)?,
    }

    Ok(())
}

/// Prints the newest save file name
fn latest(output: &Output, config: &Config) -> Result<()> {
    let saves_dir = config.require_saves_dir()?;
    let name = most_recent_save(&saves_dir, &config.save_extension)?;

    if output.is_json() {
        output.data(&serde_json::json!({
            "saves_dir": saves_dir.display().to_string(),
            "save": name,
        }));
        return Ok(());
    }

    match name {
        Some(name) => println!("{}", name),
        None => anyhow::bail!("No save files found in {}", saves_dir.display()),
    }
    Ok(())
}

/// Prints the configuration with derived paths filled in
fn show_config(output: &Output, config: &Config) -> Result<()> {
    let path = |p: Option<PathBuf>| p.map(|p| p.display().to_string());

    if output.is_json() {
        output.data(&serde_json::json!({
            "config_file": path(Config::default_path()),
            "game_dir": path(config.game_dir.clone()),
            "spoiler_path": path(config.spoiler_path()),
            "saves_dir": path(config.saves_dir()),
            "save_extension": config.save_extension,
            "poll_interval_ms": config.poll_interval_ms,
            "world_file": path(config.world_file.clone()),
            "codes_file": path(config.codes_file.clone()),
        }));
        return Ok(());
    }

    let text =
        toml::to_string_pretty(config).context("Failed to serialize configuration")?;
    let unset = || "(not set)".to_string();

    println!("Config file:  {}", path(Config::default_path()).unwrap_or_else(unset));
    println!("Spoiler log:  {}", path(config.spoiler_path()).unwrap_or_else(unset));
    println!("Saves dir:    {}", path(config.saves_dir()).unwrap_or_else(unset));
    println!();
    print!("{}", text);
    Ok(())
}
