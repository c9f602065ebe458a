//! Entrance resolution
//!
//! Turns the portal doors observed in a save file into per-region entrance
//! records. With a spoiler log the pairing graph says where each door leads.
//! Without one, doors are paired by their position in the save file: walking
//! through a portal writes the marker for the door on each side, so adjacent
//! markers usually belong to the same connection. Shops break that
//! adjacency because the shop can be re-entered from anywhere, so a window
//! around each shop terminal is attributed to the shop instead.

use std::collections::HashSet;

use crate::domain::{is_shop_terminal, Door, PairingGraph, Save, WorldRegistry, SHOP_REGION};

/// Lookahead window used when pairing by position
pub const DEFAULT_LOOKAHEAD: usize = 6;

/// Lookahead window when shops are fixed in place
pub const FIXED_SHOP_LOOKAHEAD: usize = 2;

/// One decision of the positional pairing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceLink<'a> {
    /// Two doors that lead into each other
    Pair(&'a str, &'a str),
    /// A door attributed to the shop
    Shop(&'a str),
    /// A trailing door with nothing left to pair with
    Unpaired(&'a str),
}

/// Pairs portal events by position
///
/// At each cursor the next `lookahead` events are inspected. If a shop
/// terminal is among them, every other door in the window goes to the shop
/// and the cursor skips the window plus any shop terminals right after it.
/// Otherwise the event at the cursor pairs with the one after it.
///
/// The window always spans at least two events so that both halves of a
/// pair are checked for shop terminals.
pub fn plan_sequence<S: AsRef<str>>(events: &[S], lookahead: usize) -> Vec<SequenceLink<'_>> {
    let lookahead = lookahead.max(2);
    let mut links = Vec::new();
    let mut i = 0;

    while i < events.len() {
        let end = (i + lookahead).min(events.len());
        let window = &events[i..end];

        if window.iter().any(|door| is_shop_terminal(door.as_ref())) {
            links.extend(
                window
                    .iter()
                    .map(|door| door.as_ref())
                    .filter(|door| !is_shop_terminal(door))
                    .map(SequenceLink::Shop),
            );
            i = end;
            while i < events.len() && is_shop_terminal(events[i].as_ref()) {
                i += 1;
            }
        } else if i + 1 < events.len() {
            links.push(SequenceLink::Pair(events[i].as_ref(), events[i + 1].as_ref()));
            i += 2;
        } else {
            links.push(SequenceLink::Unpaired(events[i].as_ref()));
            i += 1;
        }
    }

    links
}

/// Records `door -> destination` under `region`, once per door
fn record(save: &mut Save, region: &str, door: &str, destination: Door, count_global: bool) {
    let Some(entry) = save.regions.get_mut(region) else {
        tracing::warn!(region, door, "Region missing from snapshot");
        return;
    };

    if entry.entrances.contains_key(door) {
        return;
    }
    entry.entrances.insert(door.to_string(), destination);
    entry.totals.entrances.total += 1;
    if count_global {
        save.totals.entrances.total += 1;
    }
}

/// Region of a destination door; shop terminals belong to the shop
fn destination_region<'w>(world: &'w WorldRegistry, door: &str) -> Option<&'w str> {
    if is_shop_terminal(door) {
        return Some(SHOP_REGION);
    }
    world.region_of(door)
}

/// Resolves observed doors through the spoiler's pairing graph
pub fn resolve_with_graph<'e>(
    save: &mut Save,
    world: &WorldRegistry,
    events: impl IntoIterator<Item = &'e str>,
    graph: &PairingGraph,
) {
    for door in events {
        if is_shop_terminal(door) {
            continue;
        }

        let Some(origin) = world.region_of(door) else {
            tracing::warn!(door, "Found door with no associated region");
            continue;
        };

        let destination = match graph.partner(door) {
            None => {
                tracing::warn!(door, "Found entrance not present in spoiler log");
                Door::default()
            }
            Some(partner) => match destination_region(world, partner) {
                Some(region) => Door::new(region, partner),
                None => {
                    tracing::warn!(
                        origin = door,
                        destination = partner,
                        "Found destination door with no associated region"
                    );
                    Door::default()
                }
            },
        };

        record(save, origin, door, destination, false);
    }
}

/// Resolves doors by their position in the save file
pub fn resolve_by_sequence<S: AsRef<str>>(
    save: &mut Save,
    world: &WorldRegistry,
    events: &[S],
    lookahead: usize,
) {
    for link in plan_sequence(events, lookahead) {
        match link {
            SequenceLink::Pair(a, b) => {
                let region_a = world.region_of(a);
                let region_b = world.region_of(b);
                match region_a {
                    Some(origin) => {
                        let destination = region_b
                            .map(|region| Door::new(region, b))
                            .unwrap_or_default();
                        record(save, origin, a, destination, true);
                    }
                    None => tracing::warn!(door = a, "Found door with no associated region"),
                }
                match region_b {
                    Some(origin) => {
                        let destination = region_a
                            .map(|region| Door::new(region, a))
                            .unwrap_or_default();
                        record(save, origin, b, destination, true);
                    }
                    None => tracing::warn!(door = b, "Found door with no associated region"),
                }
            }
            SequenceLink::Shop(door) => match world.region_of(door) {
                Some(origin) => {
                    record(save, origin, door, Door::new(SHOP_REGION, SHOP_REGION), true)
                }
                None => tracing::warn!(door, "Found door with no associated region"),
            },
            SequenceLink::Unpaired(door) => match world.region_of(door) {
                Some(origin) => record(save, origin, door, Door::default(), true),
                None => tracing::warn!(door, "Found door with no associated region"),
            },
        }
    }
}

/// Adds an empty entrance for every registry door that was never observed
///
/// Shop terminals are skipped: the number of shop connections is not fixed.
pub fn sweep_undiscovered(
    save: &mut Save,
    world: &WorldRegistry,
    observed: &HashSet<String>,
    count_global_total: bool,
) {
    for (region, door) in world.doors() {
        if is_shop_terminal(door) || observed.contains(door) {
            continue;
        }

        let Some(entry) = save.regions.get_mut(region) else {
            continue;
        };
        if entry.entrances.contains_key(door) {
            continue;
        }

        entry.entrances.insert(door.to_string(), Door::default());
        entry.totals.entrances.total += 1;
        entry.totals.entrances.undiscovered += 1;
        save.totals.entrances.undiscovered += 1;
        if count_global_total {
            save.totals.entrances.total += 1;
        }
    }
}

/// Lists every shop connection under the shop region as `Shop Portal <n>`
pub fn project_shops(save: &mut Save, world: &WorldRegistry, destinations: &[String]) {
    let Some(shop) = save.regions.get_mut(SHOP_REGION) else {
        tracing::warn!(region = SHOP_REGION, "Shop region missing from world");
        return;
    };

    for (i, destination) in destinations.iter().enumerate() {
        let region = world.region_of(destination).unwrap_or_else(|| {
            tracing::warn!(door = %destination, "Found shop destination with no associated region");
            ""
        });
        shop.entrances.insert(
            format!("Shop Portal {}", i + 1),
            Door::new(region, destination.as_str()),
        );
        shop.totals.entrances.total += 1;
    }
}
