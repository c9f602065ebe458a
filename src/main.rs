//! Tunic tracker - entrance and check tracking for randomizer runs

use std::process::ExitCode;

fn main() -> ExitCode {
    if let Err(e) = tunic_tracker::cli::run() {
        eprintln!("Error: {:#}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
