//! Code registry
//!
//! Holy cross codes, fairies and similar one-off progress flags. Each flag
//! belongs to a family and is keyed by the exact line the game writes into
//! the save file once it fires.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

use super::world::RegistryError;

const BUILTIN_CODES: &str = include_str!("../../data/codes.toml");

/// Immutable table of code families
#[derive(Debug, Clone, Default)]
pub struct CodeRegistry {
    families: BTreeMap<String, BTreeMap<String, String>>,
    by_signal: HashMap<String, (String, String)>,
}

impl CodeRegistry {
    /// Loads the registry embedded in the binary
    pub fn builtin() -> Result<Self, RegistryError> {
        Self::from_toml_str(BUILTIN_CODES)
    }

    /// Loads a registry from a TOML file of `[family]` tables mapping flag to signal
    pub fn from_file(path: &Path) -> Result<Self, RegistryError> {
        let content = fs::read_to_string(path).map_err(|source| RegistryError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, RegistryError> {
        let families: BTreeMap<String, BTreeMap<String, String>> =
            toml::from_str(content).map_err(|e| RegistryError::Parse(e.to_string()))?;
        Self::from_families(families)
    }

    /// Builds a registry, rejecting signals shared by two flags
    pub fn from_families(
        families: BTreeMap<String, BTreeMap<String, String>>,
    ) -> Result<Self, RegistryError> {
        let mut by_signal: HashMap<String, (String, String)> = HashMap::new();

        for (family, flags) in &families {
            for (flag, signal) in flags {
                if let Some((other_family, other_flag)) = by_signal.get(signal) {
                    return Err(RegistryError::DuplicateSignal {
                        signal: signal.clone(),
                        first: format!("{}/{}", other_family, other_flag),
                        second: format!("{}/{}", family, flag),
                    });
                }
                by_signal.insert(signal.clone(), (family.clone(), flag.clone()));
            }
        }

        Ok(Self {
            families,
            by_signal,
        })
    }

    /// Every (family, flag) pair, sorted by family then flag
    pub fn flags(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.families.iter().flat_map(|(family, flags)| {
            flags
                .keys()
                .map(move |flag| (family.as_str(), flag.as_str()))
        })
    }

    /// Returns the (family, flag) whose signal is exactly `line`
    pub fn lookup(&self, line: &str) -> Option<(&str, &str)> {
        self.by_signal
            .get(line)
            .map(|(family, flag)| (family.as_str(), flag.as_str()))
    }

    pub fn signal(&self, family: &str, flag: &str) -> Option<&str> {
        self.families.get(family)?.get(flag).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.by_signal.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_signal.is_empty()
    }
}
