//! World table inspection

use anyhow::Result;

use super::output::Output;
use crate::domain::is_shop_terminal;
use crate::storage::Config;

pub fn run(output: &Output, config: &Config, region: Option<&str>) -> Result<()> {
    let world = config.world()?;

    let Some(name) = region else {
        if output.is_json() {
            let items: Vec<_> = world
                .regions()
                .iter()
                .map(|def| {
                    serde_json::json!({
                        "name": def.name,
                        "checks": def.checks.len(),
                        "doors": def.doors.len(),
                    })
                })
                .collect();
            output.data(&items);
        } else {
            println!("{:<32} {:>6} {:>6}", "REGION", "CHECKS", "DOORS");
            println!("{}", "-".repeat(46));
            for def in world.regions() {
                println!("{:<32} {:>6} {:>6}", def.name, def.checks.len(), def.doors.len());
            }
            println!();
            println!(
                "{} region(s), {} door(s)",
                world.regions().len(),
                world.door_count()
            );
        }
        return Ok(());
    };

    let def = world
        .region(name)
        .ok_or_else(|| anyhow::anyhow!("Unknown region: {}", name))?;

    if output.is_json() {
        output.data(&serde_json::json!({
            "name": def.name,
            "scenes": def.scenes,
            "checks": def.checks,
            "doors": def.doors,
        }));
        return Ok(());
    }

    println!("{}", def.name);
    println!("{}", "=".repeat(40));
    if !def.scenes.is_empty() {
        println!("Scenes: {}", def.scenes.join(", "));
    }
    println!();
    println!("Doors: {}", def.doors.len());
    for door in &def.doors {
        if is_shop_terminal(door) {
            println!("  {} (shop)", door);
        } else {
            println!("  {}", door);
        }
    }
    println!();
    println!("Checks: {}", def.checks.len());
    for check in &def.checks {
        println!("  {}", check);
    }

    Ok(())
}
