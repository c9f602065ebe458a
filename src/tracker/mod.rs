//! # Tracker
//!
//! Holds the published snapshot and keeps it current.
//!
//! The tracker is the only writer: [`Tracker::refresh`] decides whether the
//! inputs changed, parses into a fresh [`Save`] and swaps it in whole.
//! Readers hold a [`SnapshotHandle`] and always see either the previous or
//! the new snapshot, never a partial one.
//!
//! Change detection uses a [`Fingerprint`] of the inputs (chosen save name,
//! its modification time, spoiler modification time) instead of file
//! contents, so an unchanged tick costs one directory scan and two stats.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use arc_swap::ArcSwap;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::domain::{CodeRegistry, Save, WorldRegistry};
use crate::parse::{ParseError, Parser};
use crate::storage::{modified_at, most_recent_save, SelectError};

#[derive(Debug, Error)]
pub enum RefreshError {
    #[error(transparent)]
    Select(#[from] SelectError),

    #[error("Failed to stat {}", path.display())]
    Stat {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Read side of the published snapshot
#[derive(Debug, Clone)]
pub struct SnapshotHandle {
    inner: Arc<ArcSwap<Save>>,
}

impl SnapshotHandle {
    fn new() -> Self {
        Self {
            inner: Arc::new(ArcSwap::from_pointee(Save::default())),
        }
    }

    /// The latest published snapshot, empty before the first parse
    pub fn current(&self) -> Arc<Save> {
        self.inner.load_full()
    }

    fn publish(&self, save: Save) -> Arc<Save> {
        let save = Arc::new(save);
        self.inner.store(Arc::clone(&save));
        save
    }
}

/// Where the inputs live
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sources {
    pub saves_dir: PathBuf,
    pub save_extension: String,
    /// Spoiler log; `None` pairs entrances from the save alone
    pub spoiler: Option<PathBuf>,
}

/// Identity of the inputs behind a snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fingerprint {
    pub save_name: String,
    pub save_modified: DateTime<Utc>,
    pub spoiler_modified: Option<DateTime<Utc>>,
}

/// Outcome of a refresh
#[derive(Debug, Clone, PartialEq)]
pub enum Refresh {
    /// Inputs match the last attempt
    Unchanged,
    /// The save directory holds no save file yet
    NoSave,
    /// A new snapshot was published
    Published(Arc<Save>),
}

fn stat(path: &Path) -> Result<DateTime<Utc>, RefreshError> {
    modified_at(path).map_err(|source| RefreshError::Stat {
        path: path.to_path_buf(),
        source,
    })
}

/// Owns the registries and the write side of the snapshot
pub struct Tracker {
    world: WorldRegistry,
    codes: CodeRegistry,
    sources: Sources,
    snapshot: SnapshotHandle,
    last: Option<Fingerprint>,
}

impl Tracker {
    pub fn new(world: WorldRegistry, codes: CodeRegistry, sources: Sources) -> Self {
        Self {
            world,
            codes,
            sources,
            snapshot: SnapshotHandle::new(),
            last: None,
        }
    }

    pub fn sources(&self) -> &Sources {
        &self.sources
    }

    /// A read handle that stays valid while the tracker keeps publishing
    pub fn handle(&self) -> SnapshotHandle {
        self.snapshot.clone()
    }

    pub fn current(&self) -> Arc<Save> {
        self.snapshot.current()
    }

    /// Fingerprints the current inputs, `None` when there is no save yet
    pub fn fingerprint(&self) -> Result<Option<Fingerprint>, RefreshError> {
        let Some(save_name) =
            most_recent_save(&self.sources.saves_dir, &self.sources.save_extension)?
        else {
            return Ok(None);
        };

        let save_modified = stat(&self.sources.saves_dir.join(&save_name))?;
        let spoiler_modified = match &self.sources.spoiler {
            Some(path) => Some(stat(path)?),
            None => None,
        };

        Ok(Some(Fingerprint {
            save_name,
            save_modified,
            spoiler_modified,
        }))
    }

    /// Re-parses if the inputs changed since the last attempt
    ///
    /// A failed parse keeps the published snapshot and is not retried until
    /// the inputs change again.
    pub fn refresh(&mut self) -> Result<Refresh, RefreshError> {
        let Some(fingerprint) = self.fingerprint()? else {
            return Ok(Refresh::NoSave);
        };
        if self.last.as_ref() == Some(&fingerprint) {
            return Ok(Refresh::Unchanged);
        }

        tracing::debug!(
            save = %fingerprint.save_name,
            save_modified = %fingerprint.save_modified,
            spoiler_modified = ?fingerprint.spoiler_modified,
            "Detected update"
        );

        let save_path = self.sources.saves_dir.join(&fingerprint.save_name);
        self.last = Some(fingerprint);

        let parser = Parser::new(&self.world, &self.codes);
        let save = match &self.sources.spoiler {
            Some(spoiler) => parser.parse_with_spoiler(&save_path, spoiler)?,
            None => parser.parse_without_spoiler(&save_path)?,
        };

        Ok(Refresh::Published(self.snapshot.publish(save)))
    }

    /// Polls every `interval` until `stop` is set
    ///
    /// Runs on the calling thread, so refreshes never overlap. `on_publish`
    /// sees every new snapshot; errors are logged and polling continues.
    pub fn watch<F>(&mut self, interval: Duration, stop: &AtomicBool, mut on_publish: F)
    where
        F: FnMut(&Save),
    {
        tracing::info!(
            saves = %self.sources.saves_dir.display(),
            interval_ms = interval.as_millis() as u64,
            "Watching for changes"
        );

        while !stop.load(Ordering::Relaxed) {
            match self.refresh() {
                Ok(Refresh::Published(save)) => on_publish(&save),
                Ok(Refresh::Unchanged) => {}
                Ok(Refresh::NoSave) => tracing::debug!("No save file found"),
                Err(e) => tracing::error!("Error attempting to parse save state: {:#}", e),
            }

            if stop.load(Ordering::Relaxed) {
                break;
            }
            thread::sleep(interval);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RegionDef;
    use std::fs::{self, File};
    use std::time::SystemTime;
    use tempfile::TempDir;

    struct Fixture {
        dir: TempDir,
        tracker: Tracker,
    }

    impl Fixture {
        fn new(with_spoiler: bool) -> Self {
            let dir = TempDir::new().unwrap();
            let saves_dir = dir.path().join("SAVES");
            fs::create_dir(&saves_dir).unwrap();

            let spoiler = with_spoiler.then(|| {
                let path = dir.path().join("Spoiler.log");
                fs::write(&path, "Seed: 9\n\t- DoorA -- DoorB\n").unwrap();
                path
            });

            let world = WorldRegistry::from_regions([
                RegionDef::new("R1").with_doors(["DoorA"]),
                RegionDef::new("R2").with_doors(["DoorB"]),
            ])
            .unwrap();

            let tracker = Tracker::new(
                world,
                CodeRegistry::default(),
                Sources {
                    saves_dir,
                    save_extension: "tunic".to_string(),
                    spoiler,
                },
            );
            Self { dir, tracker }
        }

        fn write_save(&self, name: &str, content: &[u8], age_secs: u64) {
            let path = self.dir.path().join("SAVES").join(name);
            fs::write(&path, content).unwrap();
            let file = File::options().write(true).open(&path).unwrap();
            file.set_modified(SystemTime::now() - Duration::from_secs(age_secs))
                .unwrap();
        }
    }

    #[test]
    fn empty_before_first_parse() {
        let mut fixture = Fixture::new(true);
        assert!(fixture.tracker.current().is_empty());
        assert_eq!(fixture.tracker.refresh().unwrap(), Refresh::NoSave);
        assert!(fixture.tracker.current().is_empty());
    }

    #[test]
    fn publishes_then_skips_unchanged_inputs() {
        let mut fixture = Fixture::new(true);
        fixture.write_save("1.tunic", b"seed|9\nrandomizer entered portal DoorA|1\n", 60);

        let published = match fixture.tracker.refresh().unwrap() {
            Refresh::Published(save) => save,
            other => panic!("expected a snapshot, got {:?}", other),
        };
        assert_eq!(published.debug.name, "1.tunic");
        assert_eq!(
            published.entrance("DoorA").map(|door| door.door.as_str()),
            Some("DoorB")
        );

        assert_eq!(fixture.tracker.refresh().unwrap(), Refresh::Unchanged);
        assert!(Arc::ptr_eq(&published, &fixture.tracker.current()));
    }

    #[test]
    fn newer_save_slot_is_picked_up() {
        let mut fixture = Fixture::new(false);
        fixture.write_save("1.tunic", b"seed|1\n", 60);
        fixture.tracker.refresh().unwrap();

        fixture.write_save("2.tunic", b"seed|2\n", 0);
        fixture.tracker.refresh().unwrap();

        let current = fixture.tracker.current();
        assert_eq!(current.debug.name, "2.tunic");
        assert_eq!(current.debug.seed, "2");
    }

    #[test]
    fn failed_parse_keeps_previous_snapshot() {
        let mut fixture = Fixture::new(true);
        fixture.write_save("1.tunic", b"seed|9\n", 60);
        fixture.tracker.refresh().unwrap();
        let before = fixture.tracker.current();

        // A directory in place of the spoiler stats fine but cannot be read
        let spoiler = fixture.dir.path().join("Spoiler.log");
        fs::remove_file(&spoiler).unwrap();
        fs::create_dir(&spoiler).unwrap();
        fixture.write_save("1.tunic", b"seed|9\n", 0);
        assert!(matches!(
            fixture.tracker.refresh(),
            Err(RefreshError::Parse(_))
        ));
        assert!(Arc::ptr_eq(&before, &fixture.tracker.current()));

        assert_eq!(fixture.tracker.refresh().unwrap(), Refresh::Unchanged);
    }

    #[test]
    fn missing_spoiler_is_reported() {
        let mut fixture = Fixture::new(true);
        fixture.write_save("1.tunic", b"seed|9\n", 60);
        fs::remove_file(fixture.dir.path().join("Spoiler.log")).unwrap();

        assert!(matches!(
            fixture.tracker.refresh(),
            Err(RefreshError::Stat { .. })
        ));
        assert!(fixture.tracker.current().is_empty());
    }

    #[test]
    fn handle_sees_new_snapshots() {
        let mut fixture = Fixture::new(false);
        let handle = fixture.tracker.handle();
        fixture.write_save("1.tunic", b"seed|5\n", 60);
        fixture.tracker.refresh().unwrap();

        assert_eq!(handle.current().debug.seed, "5");
    }

    #[test]
    fn watch_stops_when_flagged() {
        let mut fixture = Fixture::new(false);
        fixture.write_save("1.tunic", b"seed|5\n", 60);
        let stop = AtomicBool::new(false);
        let mut seen = Vec::new();

        fixture
            .tracker
            .watch(Duration::from_millis(1), &stop, |save| {
                seen.push(save.debug.seed.clone());
                stop.store(true, Ordering::Relaxed);
            });

        assert_eq!(seen, vec!["5"]);
    }
}
