//! Run snapshot model
//!
//! A [`Save`] is the complete, point-in-time reconstruction of a run. It is
//! built from scratch by every parse and never edited once published.

use std::collections::BTreeMap;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use super::codes::CodeRegistry;
use super::world::WorldRegistry;

/// A counter pair
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Total {
    pub total: usize,
    pub undiscovered: usize,
}

impl Total {
    pub fn discovered(&self) -> usize {
        self.total.saturating_sub(self.undiscovered)
    }
}

/// Entrance and check counters for a region or the whole run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
    pub entrances: Total,
    pub checks: Total,
}

/// Where a door leads
///
/// Both fields are empty for a door that has not been walked through yet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Door {
    pub region: String,
    pub door: String,
}

impl Door {
    pub fn new(region: impl Into<String>, door: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            door: door.into(),
        }
    }

    pub fn is_unresolved(&self) -> bool {
        self.door.is_empty()
    }
}

/// Per-region state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub totals: Totals,
    pub checks: BTreeMap<String, bool>,
    pub entrances: BTreeMap<String, Door>,
}

/// Metadata about the parsed artifacts and the run mode
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebugInfo {
    /// Save file name
    pub name: String,
    /// Content identity used for change detection
    pub hash: String,
    /// Seed declared by the save file
    pub seed: String,
    /// Seed declared by the spoiler log
    pub spoiler_seed: String,
    pub spoiler_modified: Option<DateTime<Utc>>,
    pub archipelago: bool,
    pub randomized: bool,
    pub hex_quest: bool,
    pub entrance_rando: bool,
    pub fixed_shops: bool,
}

/// Where the player is
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Current {
    /// Region of the last spawn
    pub scene: String,
    /// Region of the last campfire
    pub respawn: String,
    /// Region the dath stone returns to
    pub dath: String,
    pub has_laurels: bool,
    pub has_dath: bool,
}

/// The root snapshot
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Save {
    pub debug: DebugInfo,
    pub totals: Totals,
    pub current: Current,
    pub regions: BTreeMap<String, Region>,
    pub codes: BTreeMap<String, BTreeMap<String, bool>>,
}

impl Save {
    /// An empty snapshot with every known region and code flag present
    pub fn skeleton(world: &WorldRegistry, codes: &CodeRegistry) -> Self {
        let regions = world
            .regions()
            .iter()
            .map(|def| (def.name.clone(), Region::default()))
            .collect();

        let mut families: BTreeMap<String, BTreeMap<String, bool>> = BTreeMap::new();
        for (family, flag) in codes.flags() {
            families
                .entry(family.to_string())
                .or_default()
                .insert(flag.to_string(), false);
        }

        Self {
            regions,
            codes: families,
            ..Self::default()
        }
    }

    pub fn region(&self, name: &str) -> Option<&Region> {
        self.regions.get(name)
    }

    /// Looks up where a door leads, searching every region
    pub fn entrance(&self, door: &str) -> Option<&Door> {
        self.regions
            .values()
            .find_map(|region| region.entrances.get(door))
    }

    pub fn code(&self, family: &str, flag: &str) -> Option<bool> {
        self.codes.get(family)?.get(flag).copied()
    }

    /// Returns true if nothing has been parsed into this snapshot yet
    pub fn is_empty(&self) -> bool {
        self.debug.name.is_empty()
    }

    /// Identity of a parse input: file name plus modification time
    ///
    /// Stable for as long as neither changes.
    pub fn identity_hash(save_name: &str, modified: DateTime<Utc>) -> String {
        let input = format!(
            "{}{}",
            save_name,
            modified.to_rfc3339_opts(SecondsFormat::Nanos, true)
        );
        blake3::hash(input.as_bytes()).to_hex().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::world::RegionDef;
    use chrono::TimeZone;

    #[test]
    fn skeleton_seeds_regions_and_codes() {
        let world = WorldRegistry::from_regions([
            RegionDef::new("Overworld"),
            RegionDef::new("Windmill"),
        ])
        .unwrap();
        let codes = CodeRegistry::from_toml_str("[Global]\nFirecracker = \"Granted Firecracker|1\"")
            .unwrap();

        let save = Save::skeleton(&world, &codes);
        assert_eq!(save.regions.len(), 2);
        assert_eq!(save.region("Windmill"), Some(&Region::default()));
        assert_eq!(save.code("Global", "Firecracker"), Some(false));
        assert!(save.is_empty());
    }

    #[test]
    fn identity_hash_is_stable() {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let a = Save::identity_hash("1.tunic", at);
        let b = Save::identity_hash("1.tunic", at);
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn identity_hash_tracks_inputs() {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let later = at + chrono::Duration::nanoseconds(1);
        let base = Save::identity_hash("1.tunic", at);
        assert_ne!(base, Save::identity_hash("2.tunic", at));
        assert_ne!(base, Save::identity_hash("1.tunic", later));
    }

    #[test]
    fn total_discovered() {
        let total = Total {
            total: 5,
            undiscovered: 2,
        };
        assert_eq!(total.discovered(), 3);
    }

    #[test]
    fn entrance_lookup_spans_regions() {
        let mut save = Save::default();
        let mut region = Region::default();
        region
            .entrances
            .insert("Windmill Exit".to_string(), Door::new("Overworld", "Windmill Entrance"));
        save.regions.insert("Windmill".to_string(), region);

        assert_eq!(
            save.entrance("Windmill Exit"),
            Some(&Door::new("Overworld", "Windmill Entrance"))
        );
        assert_eq!(save.entrance("Windmill Entrance"), None);
    }
}
