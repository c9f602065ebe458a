//! # Parsing
//!
//! Turns a save file and, optionally, a spoiler log into a [`Save`] snapshot.
//!
//! | Module | Input | Output |
//! |--------|-------|--------|
//! | `spoiler` | `Randomizer/Spoiler.log` | checks, pairing graph, shop destinations |
//! | `save` | `SAVES/*.tunic` | mode flags, location, codes, portal events |
//! | `entrances` | both of the above | per-region entrance records |
//!
//! [`Parser`] owns nothing; it borrows the reference registries and builds a
//! fresh snapshot on every call.

mod entrances;
mod save;
mod spoiler;

use std::fmt;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::domain::{CodeRegistry, Save, WorldRegistry};
use crate::storage::modified_at;

pub use entrances::{
    plan_sequence, project_shops, resolve_by_sequence, resolve_with_graph, sweep_undiscovered,
    SequenceLink, DEFAULT_LOOKAHEAD, FIXED_SHOP_LOOKAHEAD,
};
pub use save::{SaveFlag, SaveLine, SaveLog, SaveMode, SceneKey};
pub use spoiler::{CheckLine, SpoilerLine, SpoilerLog};

/// Which input file an error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Artifact {
    Save,
    Spoiler,
}

impl fmt::Display for Artifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Artifact::Save => f.write_str("save file"),
            Artifact::Spoiler => f.write_str("spoiler log"),
        }
    }
}

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Failed to stat {artifact}: {}", path.display())]
    Stat {
        artifact: Artifact,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to open {artifact}: {}", path.display())]
    Open {
        artifact: Artifact,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to read {artifact}: {}", path.display())]
    Read {
        artifact: Artifact,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

fn stat(artifact: Artifact, path: &Path) -> Result<DateTime<Utc>, ParseError> {
    modified_at(path).map_err(|source| ParseError::Stat {
        artifact,
        path: path.to_path_buf(),
        source,
    })
}

fn open(artifact: Artifact, path: &Path) -> Result<BufReader<File>, ParseError> {
    File::open(path)
        .map(BufReader::new)
        .map_err(|source| ParseError::Open {
            artifact,
            path: path.to_path_buf(),
            source,
        })
}

fn read_error(artifact: Artifact, path: &Path) -> impl FnOnce(io::Error) -> ParseError + '_ {
    move |source| ParseError::Read {
        artifact,
        path: path.to_path_buf(),
        source,
    }
}

/// Splits input into lines without the trailing `\n` or `\r\n`
///
/// Bytes that are not valid UTF-8 are replaced rather than failing the read;
/// only I/O errors are returned.
fn lossy_lines<R: BufRead>(reader: R) -> impl Iterator<Item = io::Result<String>> {
    reader.split(b'\n').map(|line| {
        line.map(|mut bytes| {
            if bytes.last() == Some(&b'\r') {
                bytes.pop();
            }
            match String::from_utf8(bytes) {
                Ok(text) => text,
                Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
            }
        })
    })
}

/// Builds snapshots against a fixed pair of registries
#[derive(Debug, Clone, Copy)]
pub struct Parser<'a> {
    world: &'a WorldRegistry,
    codes: &'a CodeRegistry,
}

impl<'a> Parser<'a> {
    pub fn new(world: &'a WorldRegistry, codes: &'a CodeRegistry) -> Self {
        Self { world, codes }
    }

    pub fn world(&self) -> &'a WorldRegistry {
        self.world
    }

    pub fn codes(&self) -> &'a CodeRegistry {
        self.codes
    }

    /// Parses a save file using the spoiler log for checks and entrances
    pub fn parse_with_spoiler(
        &self,
        save_path: &Path,
        spoiler_path: &Path,
    ) -> Result<Save, ParseError> {
        let spoiler_modified = stat(Artifact::Spoiler, spoiler_path)?;
        let spoiler = SpoilerLog::read(open(Artifact::Spoiler, spoiler_path)?)
            .map_err(read_error(Artifact::Spoiler, spoiler_path))?;

        stat(Artifact::Save, save_path)?;
        let log = self.read_save(save_path)?;

        let mut save = self.build(&log, Some(&spoiler));
        let name = file_name(save_path);
        save.debug.hash = Save::identity_hash(&name, spoiler_modified);
        save.debug.spoiler_modified = Some(spoiler_modified);
        save.debug.name = name;
        Ok(save)
    }

    /// Parses a save file on its own, pairing entrances by position
    pub fn parse_without_spoiler(&self, save_path: &Path) -> Result<Save, ParseError> {
        let save_modified = stat(Artifact::Save, save_path)?;
        let log = self.read_save(save_path)?;

        let mut save = self.build(&log, None);
        let name = file_name(save_path);
        save.debug.hash = Save::identity_hash(&name, save_modified);
        save.debug.name = name;
        Ok(save)
    }

    fn read_save(&self, path: &Path) -> Result<SaveLog, ParseError> {
        SaveLog::read(open(Artifact::Save, path)?, self.world, self.codes)
            .map_err(read_error(Artifact::Save, path))
    }

    /// Assembles a snapshot from already parsed inputs
    ///
    /// Leaves `debug.name`, `debug.hash` and `debug.spoiler_modified` empty;
    /// those describe the files, not their contents.
    pub fn build(&self, log: &SaveLog, spoiler: Option<&SpoilerLog>) -> Save {
        let mut save = Save::skeleton(self.world, self.codes);

        save.debug.seed = log.seed.clone();
        save.debug.archipelago = log.mode.archipelago;
        save.debug.randomized = log.mode.randomized;
        save.debug.hex_quest = log.mode.hex_quest;
        save.debug.entrance_rando = log.mode.entrance_rando;
        save.debug.fixed_shops = log.mode.fixed_shops;
        save.current = log.current.clone();

        for (family, flag) in &log.codes {
            if let Some(value) = save
                .codes
                .get_mut(family)
                .and_then(|flags| flags.get_mut(flag))
            {
                *value = true;
            }
        }

        match spoiler {
            Some(spoiler) => {
                save.debug.spoiler_seed = spoiler.seed.clone();
                self.apply_checks(&mut save, &spoiler.checks);
                save.totals.entrances.total += spoiler.pairings * 2;

                resolve_with_graph(&mut save, self.world, log.unique_events(), &spoiler.graph);
                sweep_undiscovered(&mut save, self.world, &log.observed, false);
                if log.saw_shop() {
                    project_shops(&mut save, self.world, &spoiler.shop_destinations);
                }

                if !log.seed.is_empty() && log.seed != spoiler.seed {
                    tracing::warn!(
                        seed = %log.seed,
                        spoiler_seed = %spoiler.seed,
                        "Save seed does not match spoiler seed"
                    );
                }
            }
            None => {
                let lookahead = if log.mode.fixed_shops {
                    FIXED_SHOP_LOOKAHEAD
                } else {
                    DEFAULT_LOOKAHEAD
                };
                resolve_by_sequence(&mut save, self.world, &log.events, lookahead);
                sweep_undiscovered(&mut save, self.world, &log.observed, true);
            }
        }

        tracing::debug!(
            seed = %save.debug.seed,
            checks = save.totals.checks.total,
            entrances = save.totals.entrances.total,
            "Finished parsing"
        );
        save
    }

    fn apply_checks(&self, save: &mut Save, checks: &[CheckLine]) {
        for line in checks {
            if !self.world.has_check(&line.region, &line.check) {
                tracing::warn!(
                    region = %line.region,
                    check = %line.check,
                    "Found check with unknown region or name"
                );
                continue;
            }
            let Some(region) = save.regions.get_mut(&line.region) else {
                continue;
            };
            // Every line counts toward the totals; the last state wins
            region.checks.insert(line.check.clone(), line.found);
            region.totals.checks.total += 1;
            save.totals.checks.total += 1;
            if !line.found {
                region.totals.checks.undiscovered += 1;
                save.totals.checks.undiscovered += 1;
            }
        }
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}
