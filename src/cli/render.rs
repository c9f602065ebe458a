//! Text rendering of snapshots

use crate::domain::{Region, Save, Total};

/// `found/total` for a counter pair
pub fn progress(total: &Total) -> String {
    format!("{}/{}", total.discovered(), total.total)
}

fn mode_labels(save: &Save) -> Vec<&'static str> {
    let debug = &save.debug;
    let mut labels = Vec::new();
    if debug.archipelago {
        labels.push("archipelago");
    } else if debug.randomized {
        labels.push("randomizer");
    }
    if debug.hex_quest {
        labels.push("hexagon quest");
    }
    if debug.entrance_rando {
        labels.push("entrance rando");
    }
    if debug.fixed_shops {
        labels.push("fixed shops");
    }
    labels
}

fn or_unknown(value: &str) -> &str {
    if value.is_empty() {
        "?"
    } else {
        value
    }
}

/// Prints the run overview and one row per region
pub fn print_summary(save: &Save) {
    let debug = &save.debug;
    let modes = mode_labels(save);

    println!("Save: {}", debug.name);
    if debug.spoiler_seed.is_empty() {
        println!("Seed: {}", or_unknown(&debug.seed));
    } else {
        println!("Seed: {} (spoiler {})", or_unknown(&debug.seed), debug.spoiler_seed);
    }
    if !modes.is_empty() {
        println!("Mode: {}", modes.join(", "));
    }
    println!();

    let current = &save.current;
    println!("Location: {}", or_unknown(&current.scene));
    println!("  Respawn:    {}", or_unknown(&current.respawn));
    if current.has_dath {
        println!("  Dath Stone: {}", or_unknown(&current.dath));
    }
    println!("  Laurels:    {}", if current.has_laurels { "yes" } else { "no" });
    println!();

    let codes_total: usize = save.codes.values().map(|flags| flags.len()).sum();
    let codes_found: usize = save
        .codes
        .values()
        .map(|flags| flags.values().filter(|found| **found).count())
        .sum();

    println!("Checks:    {}", progress(&save.totals.checks));
    println!("Entrances: {}", progress(&save.totals.entrances));
    println!("Codes:     {}/{}", codes_found, codes_total);
    println!();

    println!("{:<32} {:>9} {:>10}", "REGION", "CHECKS", "ENTRANCES");
    println!("{}", "-".repeat(53));
    for (name, region) in &save.regions {
        if region.totals.checks.total == 0 && region.totals.entrances.total == 0 {
            continue;
        }
        println!(
            "{:<32} {:>9} {:>10}",
            name,
            progress(&region.totals.checks),
            progress(&region.totals.entrances)
        );
    }
}

/// Prints every check and entrance of one region
pub fn print_region(name: &str, region: &Region) {
    println!("{}", name);
    println!("{}", "=".repeat(40));
    println!();

    println!("Checks: {}", progress(&region.totals.checks));
    for (check, found) in &region.checks {
        println!("  [{}] {}", if *found { "x" } else { " " }, check);
    }
    println!();

    println!("Entrances: {}", progress(&region.totals.entrances));
    for (door, destination) in &region.entrances {
        if destination.is_unresolved() {
            println!("  {} -> ?", door);
        } else {
            println!("  {} -> {} ({})", door, destination.door, destination.region);
        }
    }
}
