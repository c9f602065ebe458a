//! Save file parser
//!
//! Save files are flat `key|value` lines. Only a handful of them matter to the
//! tracker: run mode flags, the seed, where the player last spawned and
//! rested, code flags and the `randomizer entered portal <door>|1` markers
//! written the first time each portal is used.

use std::collections::{BTreeSet, HashSet};
use std::io::{self, BufRead};
use std::sync::LazyLock;

use regex::Regex;

use super::lossy_lines;

use crate::domain::{is_shop_terminal, CodeRegistry, Current, WorldRegistry};

static PORTAL_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^randomizer entered portal ([^|]+)\|1$").expect("valid portal regex")
});

/// Boolean markers matched against the whole line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveFlag {
    Archipelago,
    Randomizer,
    HexagonQuest,
    EntranceRando,
    FixedShops,
    HasDathStone,
    HasLaurels,
}

const FLAG_LINES: [(&str, SaveFlag); 7] = [
    ("archipelago|1", SaveFlag::Archipelago),
    ("randomizer|1", SaveFlag::Randomizer),
    ("randomizer hexagon quest enabled|1", SaveFlag::HexagonQuest),
    ("randomizer entrance rando enabled|1", SaveFlag::EntranceRando),
    ("randomizer ER fixed shop|1", SaveFlag::FixedShops),
    ("inventory quantity Dath Stone|1", SaveFlag::HasDathStone),
    ("inventory quantity Hyperdash|1", SaveFlag::HasLaurels),
];

/// Scene pointers stored as `<key>|<raw scene>`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneKey {
    Spawn,
    Campfire,
    DathStone,
}

const SCENE_KEYS: [(&str, SceneKey); 3] = [
    ("last spawn scene name|", SceneKey::Spawn),
    ("last campfire scene name|", SceneKey::Campfire),
    ("randomizer last campfire scene name for dath stone|", SceneKey::DathStone),
];

const SEED_KEY: &str = "seed|";

/// Classification of a single save line; the first matching category wins
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveLine<'a> {
    Flag(SaveFlag),
    Seed(&'a str),
    Scene(SceneKey, &'a str),
    Code { family: &'a str, flag: &'a str },
    Portal(&'a str),
    Other,
}

impl<'a> SaveLine<'a> {
    pub fn classify(line: &'a str, codes: &'a CodeRegistry) -> Self {
        if let Some(&(_, flag)) = FLAG_LINES.iter().find(|(text, _)| *text == line) {
            return SaveLine::Flag(flag);
        }

        if let Some(seed) = line.strip_prefix(SEED_KEY) {
            return SaveLine::Seed(seed);
        }

        for (prefix, key) in SCENE_KEYS {
            if let Some(raw) = line.strip_prefix(prefix) {
                return SaveLine::Scene(key, raw);
            }
        }

        if let Some((family, flag)) = codes.lookup(line) {
            return SaveLine::Code { family, flag };
        }

        if let Some(door) = PORTAL_LINE.captures(line).and_then(|caps| caps.get(1)) {
            return SaveLine::Portal(door.as_str());
        }

        SaveLine::Other
    }
}

/// Run mode flags declared by the save file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SaveMode {
    pub archipelago: bool,
    pub randomized: bool,
    pub hex_quest: bool,
    pub entrance_rando: bool,
    pub fixed_shops: bool,
}

/// Everything extracted from one save file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SaveLog {
    pub seed: String,
    pub mode: SaveMode,
    pub current: Current,
    /// Code flags that fired, as (family, flag)
    pub codes: BTreeSet<(String, String)>,
    /// Portal doors in the order they appear in the file
    pub events: Vec<String>,
    /// Every door seen in a portal line
    pub observed: HashSet<String>,
}

impl SaveLog {
    /// Reads a save file line by line
    pub fn read<R: BufRead>(
        reader: R,
        world: &WorldRegistry,
        codes: &CodeRegistry,
    ) -> io::Result<Self> {
        let mut log = Self::default();
        for line in lossy_lines(reader) {
            log.push(&line?, world, codes);
        }
        Ok(log)
    }

    /// Parses an in-memory save file
    pub fn parse(text: &str, world: &WorldRegistry, codes: &CodeRegistry) -> Self {
        let mut log = Self::default();
        for line in text.lines() {
            log.push(line, world, codes);
        }
        log
    }

    fn push(&mut self, line: &str, world: &WorldRegistry, codes: &CodeRegistry) {
        match SaveLine::classify(line, codes) {
            SaveLine::Flag(flag) => self.set_flag(flag),
            SaveLine::Seed(seed) => self.seed = seed.to_string(),
            SaveLine::Scene(key, raw) => {
                let region = match world.translate_scene(raw) {
                    Ok(region) => region.to_string(),
                    Err(e) => {
                        tracing::error!(scene = raw, key = ?key, "Failed to translate scene: {}", e);
                        String::new()
                    }
                };
                match key {
                    SceneKey::Spawn => self.current.scene = region,
                    SceneKey::Campfire => self.current.respawn = region,
                    SceneKey::DathStone => self.current.dath = region,
                }
            }
            SaveLine::Code { family, flag } => {
                self.codes.insert((family.to_string(), flag.to_string()));
            }
            SaveLine::Portal(door) => {
                self.observed.insert(door.to_string());
                self.events.push(door.to_string());
            }
            SaveLine::Other => {}
        }
    }

    fn set_flag(&mut self, flag: SaveFlag) {
        match flag {
            SaveFlag::Archipelago => {
                self.mode.archipelago = true;
                self.mode.randomized = true;
            }
            SaveFlag::Randomizer => self.mode.randomized = true,
            SaveFlag::HexagonQuest => self.mode.hex_quest = true,
            SaveFlag::EntranceRando => self.mode.entrance_rando = true,
            SaveFlag::FixedShops => self.mode.fixed_shops = true,
            SaveFlag::HasDathStone => self.current.has_dath = true,
            SaveFlag::HasLaurels => self.current.has_laurels = true,
        }
    }

    /// Returns true if any shop terminal was used
    pub fn saw_shop(&self) -> bool {
        self.observed.iter().any(|door| is_shop_terminal(door))
    }

    /// Portal doors in file order, each listed once
    pub fn unique_events(&self) -> impl Iterator<Item = &str> + '_ {
        let mut seen = HashSet::new();
        self.events
            .iter()
            .map(String::as_str)
            .filter(move |door| seen.insert(*door))
    }
}
