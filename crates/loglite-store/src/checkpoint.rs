// Checkpoint persistence - stage, fsync, atomic rename
//
// The stable snapshot file is only ever replaced wholesale via rename, so
// a reader can never observe a half-written snapshot. A crash can at worst
// leave behind a stale staging file, which startup deletes before reading
// anything.

use loglite_core::{Error, Result};
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::Path;

/// Stable snapshot file name inside the store directory.
pub const CHECKPOINT_FILE: &str = "checkpoint.json";

/// Staging file name. Never valid state; deleted on startup if present.
pub const CHECKPOINT_STAGING_FILE: &str = "checkpoint.tmp";

/// Remove a staging file orphaned by a crash mid-checkpoint.
pub fn clean_stale_staging(dir: &Path) -> Result<()> {
    let staging = dir.join(CHECKPOINT_STAGING_FILE);
    match fs::remove_file(&staging) {
        Ok(()) => {
            tracing::warn!(path = %staging.display(), "removed stale checkpoint staging file");
            Ok(())
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(Error::Io(e)),
    }
}

/// Load the stable snapshot, if one exists.
pub fn load(dir: &Path) -> Result<Option<HashMap<String, String>>> {
    let stable = dir.join(CHECKPOINT_FILE);
    let bytes = match fs::read(&stable) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(Error::Io(e)),
    };

    let map = serde_json::from_slice(&bytes)
        .map_err(|e| Error::Serialization(format!("checkpoint is not valid JSON: {}", e)))?;
    Ok(Some(map))
}

/// Persist a snapshot of the mapping.
///
/// Stages to [`CHECKPOINT_STAGING_FILE`], forces it to stable storage,
/// then renames it over [`CHECKPOINT_FILE`]. On any failure the staging
/// file is removed and the previous stable snapshot stays authoritative.
pub fn write(dir: &Path, map: &HashMap<String, String>) -> Result<()> {
    let staging = dir.join(CHECKPOINT_STAGING_FILE);
    let stable = dir.join(CHECKPOINT_FILE);

    let result = stage_and_rename(&staging, &stable, map);
    if result.is_err() {
        if let Err(e) = fs::remove_file(&staging) {
            if e.kind() != ErrorKind::NotFound {
                tracing::error!(error = %e, "failed to remove orphaned staging file");
            }
        }
    }
    result
}

fn stage_and_rename(staging: &Path, stable: &Path, map: &HashMap<String, String>) -> Result<()> {
    let bytes = serde_json::to_vec(map)
        .map_err(|e| Error::Serialization(format!("failed to serialize snapshot: {}", e)))?;

    let mut file = File::create(staging)?;
    file.write_all(&bytes)?;
    file.sync_all()?;
    drop(file);

    fs::rename(staging, stable)?;
    Ok(())
}
