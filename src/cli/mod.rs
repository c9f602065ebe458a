//! # Command-Line Interface
//!
//! User-facing commands of the `tracker` binary.
//!
//! ## Commands
//!
//! | Command | Purpose |
//! |---------|---------|
//! | `parse` | Parse the newest (or a named) save into a snapshot |
//! | `watch` | Re-parse on every save or spoiler change |
//! | `latest` | Print the newest save file name |
//! | `world` | Inspect the world table |
//! | `config` | Show the effective configuration |
//!
//! ## Output Formats
//!
//! All commands support `--format` flag:
//! - `text` (default) - Human-readable output
//! - `json` - Machine-parseable JSON
//!
//! ## Logging
//!
//! Diagnostics go to stderr through `tracing`. `--verbose` raises the level
//! to debug; `RUST_LOG` overrides both:
//! ```bash
//! RUST_LOG=tunic_tracker=trace tracker parse
//! ```
//!
//! ## Entry Point
//!
//! Call [`run()`] to parse arguments and execute the appropriate command.

mod app;
mod output;
mod parse_cmd;
mod render;
mod watch_cmd;
mod world_cmd;

pub use app::{run, Cli, Commands};
pub use output::{Output, OutputFormat};
