//! Polling watch command

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use anyhow::Result;

use super::output::Output;
use super::render;
use crate::storage::Config;
use crate::tracker::{Sources, Tracker};

pub fn run(
    output: &Output,
    config: &Config,
    interval_ms: Option<u64>,
    count: Option<usize>,
    no_spoiler: bool,
) -> Result<()> {
    let interval = match interval_ms {
        Some(0) => anyhow::bail!("--interval-ms must be positive"),
        Some(ms) => Duration::from_millis(ms),
        None => config.poll_interval(),
    };

    let spoiler = if no_spoiler {
        None
    } else {
        Some(config.spoiler_path().ok_or_else(|| {
            anyhow::anyhow!("No spoiler log configured. Set game_dir or use --no-spoiler.")
        })?)
    };

    let sources = Sources {
        saves_dir: config.require_saves_dir()?,
        save_extension: config.save_extension.clone(),
        spoiler,
    };
    let mut tracker = Tracker::new(config.world()?, config.codes()?, sources);

    let stop = AtomicBool::new(count == Some(0));
    let mut published = 0usize;

    tracker.watch(interval, &stop, |save| {
        published += 1;
        if output.is_json() {
            output.data(save);
        } else {
            if published > 1 {
                println!();
            }
            render::print_summary(save);
        }

        if count.is_some_and(|limit| published >= limit) {
            stop.store(true, Ordering::Relaxed);
        }
    });

    Ok(())
}
