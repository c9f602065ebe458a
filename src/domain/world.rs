//! World registry
//!
//! Static reference data describing the randomized world: every region, the
//! checks the spoiler log may report for it, the portals (doors) it owns and
//! the raw scene identifiers the game writes into save files.
//!
//! The registry is loaded once and never mutated. A built-in copy is embedded
//! in the binary; a replacement can be loaded from a TOML file with the same
//! shape:
//!
//! ```toml
//! [[region]]
//! name = "Overworld"
//! scenes = ["Overworld Redux"]
//! checks = ["[Southwest] Fountain Page"]
//! doors = ["Windmill Entrance"]
//! ```

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// Door tokens that lead into the shop.
///
/// The shop can be entered from many portals, so these never take part in
/// one-to-one pairing.
pub const SHOP_TERMINALS: [&str; 2] = ["Shop", "Shop Portal"];

/// Region that collects every shop transition
pub const SHOP_REGION: &str = "Shop";

const BUILTIN_WORLD: &str = include_str!("../../data/world.toml");

/// Returns true if the door token is one of the shop terminals
pub fn is_shop_terminal(door: &str) -> bool {
    SHOP_TERMINALS.contains(&door)
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Failed to read registry file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse registry: {0}")]
    Parse(String),

    #[error("Duplicate region: {0}")]
    DuplicateRegion(String),

    #[error("Door '{door}' is listed under both '{first}' and '{second}'")]
    DuplicateDoor {
        door: String,
        first: String,
        second: String,
    },

    #[error("Scene '{scene}' is listed under both '{first}' and '{second}'")]
    DuplicateScene {
        scene: String,
        first: String,
        second: String,
    },

    #[error("Signal '{signal}' is used by both {first} and {second}")]
    DuplicateSignal {
        signal: String,
        first: String,
        second: String,
    },
}

/// A raw scene identifier with no region mapping
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Unknown scene: {0}")]
pub struct UnknownScene(pub String);

/// Definition of a single region
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RegionDef {
    pub name: String,

    /// Raw scene identifiers that translate to this region
    #[serde(default)]
    pub scenes: Vec<String>,

    /// Check names the spoiler log can report for this region
    #[serde(default)]
    pub checks: Vec<String>,

    /// Door ids owned by this region
    #[serde(default)]
    pub doors: Vec<String>,
}

impl RegionDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            scenes: vec![],
            checks: vec![],
            doors: vec![],
        }
    }

    pub fn with_scenes<I, S>(mut self, scenes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scenes.extend(scenes.into_iter().map(Into::into));
        self
    }

    pub fn with_checks<I, S>(mut self, checks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.checks.extend(checks.into_iter().map(Into::into));
        self
    }

    pub fn with_doors<I, S>(mut self, doors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.doors.extend(doors.into_iter().map(Into::into));
        self
    }
}

#[derive(Deserialize)]
struct WorldFile {
    #[serde(default, rename = "region")]
    regions: Vec<RegionDef>,
}

/// Immutable lookup tables over the world graph
#[derive(Debug, Clone)]
pub struct WorldRegistry {
    regions: Vec<RegionDef>,
    by_name: HashMap<String, usize>,
    checks: Vec<HashSet<String>>,
    door_regions: HashMap<String, usize>,
    scene_regions: HashMap<String, usize>,
}

impl WorldRegistry {
    /// Loads the registry embedded in the binary
    pub fn builtin() -> Result<Self, RegistryError> {
        Self::from_toml_str(BUILTIN_WORLD)
    }

    /// Loads a registry from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, RegistryError> {
        let content = fs::read_to_string(path).map_err(|source| RegistryError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, RegistryError> {
        let file: WorldFile =
            toml::from_str(content).map_err(|e| RegistryError::Parse(e.to_string()))?;
        Self::from_regions(file.regions)
    }

    /// Builds a registry from region definitions, rejecting ambiguous tables
    pub fn from_regions(regions: impl IntoIterator<Item = RegionDef>) -> Result<Self, RegistryError> {
        let regions: Vec<RegionDef> = regions.into_iter().collect();
        let mut by_name = HashMap::new();
        let mut door_regions: HashMap<String, usize> = HashMap::new();
        let mut scene_regions: HashMap<String, usize> = HashMap::new();
        let mut checks = Vec::with_capacity(regions.len());

        for (idx, region) in regions.iter().enumerate() {
            if by_name.insert(region.name.clone(), idx).is_some() {
                return Err(RegistryError::DuplicateRegion(region.name.clone()));
            }

            for door in &region.doors {
                if let Some(&first) = door_regions.get(door) {
                    return Err(RegistryError::DuplicateDoor {
                        door: door.clone(),
                        first: regions[first].name.clone(),
                        second: region.name.clone(),
                    });
                }
                door_regions.insert(door.clone(), idx);
            }

            for scene in &region.scenes {
                if let Some(&first) = scene_regions.get(scene) {
                    return Err(RegistryError::DuplicateScene {
                        scene: scene.clone(),
                        first: regions[first].name.clone(),
                        second: region.name.clone(),
                    });
                }
                scene_regions.insert(scene.clone(), idx);
            }

            checks.push(region.checks.iter().cloned().collect());
        }

        Ok(Self {
            regions,
            by_name,
            checks,
            door_regions,
            scene_regions,
        })
    }

    /// All regions in declaration order
    pub fn regions(&self) -> &[RegionDef] {
        &self.regions
    }

    pub fn region(&self, name: &str) -> Option<&RegionDef> {
        self.by_name.get(name).map(|&idx| &self.regions[idx])
    }

    pub fn contains_region(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Returns true if `check` is a known check of `region`
    pub fn has_check(&self, region: &str, check: &str) -> bool {
        self.by_name
            .get(region)
            .is_some_and(|&idx| self.checks[idx].contains(check))
    }

    /// Looks up the region owning a door
    pub fn region_of(&self, door: &str) -> Option<&str> {
        self.door_regions
            .get(door)
            .map(|&idx| self.regions[idx].name.as_str())
    }

    /// Every (region, door) pair in declaration order
    pub fn doors(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.regions.iter().flat_map(|region| {
            region
                .doors
                .iter()
                .map(move |door| (region.name.as_str(), door.as_str()))
        })
    }

    pub fn door_count(&self) -> usize {
        self.door_regions.len()
    }

    /// Translates a raw scene identifier from a save file into a region name
    pub fn translate_scene(&self, raw: &str) -> Result<&str, UnknownScene> {
        self.scene_regions
            .get(raw)
            .map(|&idx| self.regions[idx].name.as_str())
            .ok_or_else(|| UnknownScene(raw.to_string()))
    }
}
