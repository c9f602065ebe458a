//! Save directory scanning
//!
//! The game writes one file per save slot into `SAVES/`. The tracker follows
//! whichever slot was written last.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SelectError {
    #[error("Failed to read saves directory: {}", path.display())]
    ReadDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Modification time of a file
pub fn modified_at(path: &Path) -> io::Result<DateTime<Utc>> {
    Ok(fs::metadata(path)?.modified()?.into())
}

/// Returns the name of the most recently modified file with `extension`
///
/// Entries that cannot be inspected are skipped. Ties keep the name that
/// sorts last so the choice does not depend on directory order.
pub fn most_recent_save(dir: &Path, extension: &str) -> Result<Option<String>, SelectError> {
    let entries = fs::read_dir(dir).map_err(|source| SelectError::ReadDir {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut newest: Option<(DateTime<Utc>, String)> = None;
    for entry in entries.flatten() {
        let path = entry.path();
        if path.extension().and_then(|ext| ext.to_str()) != Some(extension) {
            continue;
        }
        let Ok(meta) = entry.metadata() else {
            continue;
        };
        if !meta.is_file() {
            continue;
        }
        let Ok(modified) = meta.modified() else {
            continue;
        };

        let candidate = (modified.into(), entry.file_name().to_string_lossy().into_owned());
        if newest.as_ref().map_or(true, |current| candidate > *current) {
            newest = Some(candidate);
        }
    }

    Ok(newest.map(|(_, name)| name))
}
