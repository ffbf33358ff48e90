//! # Loglite Store
//!
//! Durable key-value store core for Loglite: the write path that ties log
//! durability to in-memory state, startup recovery, and checkpoint
//! compaction.
//!
//! ## ⚠️ Internal Implementation Detail
//!
//! **This crate is an internal implementation detail of Loglite.**
//!
//! Users should depend on the main `loglite` crate instead, which provides
//! the stable public API. This crate's API may change without notice
//! between minor versions.
//!
//! ---
//!
//! ## Write path
//!
//! ```text
//! put/delete ──► append frame ──► fsync ──► apply to map ──► committed
//!                    │               │
//!                    │               └─ on failure: rollback(offset),
//!                    │                  surface the error, map untouched
//!                    └─ on failure: surface the error (nothing durable
//!                       was claimed yet)
//! ```
//!
//! The commit point is the successful fsync, not the in-memory apply: a
//! crash between the two is healed by log replay at next startup, which
//! is idempotent.

use loglite_core::{Error, Result};
use loglite_wal::{RecordType, Wal, WalHooks, WalReader, WalRecord, WAL_FILE};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, RwLock};

pub mod checkpoint;

pub use checkpoint::{CHECKPOINT_FILE, CHECKPOINT_STAGING_FILE};

/// Durable key-value store backed by a write-ahead log and periodic
/// checkpoints.
///
/// All mutating operations (`put`, `delete`, `checkpoint`, `close`) are
/// serialized through one lock; `get` reads the mapping without it.
pub struct Store {
    /// Backing directory holding the log and checkpoint files.
    dir: PathBuf,
    /// The in-memory mapping. Readable without the write lock: a reader
    /// concurrent with an in-flight write sees either the old or the new
    /// value, never an uncommitted one, because the map is only touched
    /// after a successful sync.
    map: RwLock<HashMap<String, String>>,
    /// Single mutual-exclusion domain for the entire write path. This is
    /// a correctness mechanism, not a throughput choice: rollback is a
    /// file truncation, and a truncation racing another writer's append
    /// could silently discard committed bytes.
    wal: Mutex<Wal>,
}

impl Store {
    /// Open (or create) a store in the given directory, running recovery.
    ///
    /// Recovery order: delete any staging checkpoint left by a crash,
    /// load the stable checkpoint if present, replay the log on top of
    /// it, then open the log for further appends at its current tail.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        Self::open_with_hooks(dir, WalHooks::default())
    }

    /// Open with fault-injection hooks installed on the log.
    pub fn open_with_hooks(dir: impl AsRef<Path>, hooks: WalHooks) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir)?;

        checkpoint::clean_stale_staging(&dir)?;
        let mut map = checkpoint::load(&dir)?.unwrap_or_default();

        let wal_path = dir.join(WAL_FILE);
        let mut reader = WalReader::open(&wal_path)?;
        let mut replayed = 0usize;
        while let Some(record) = reader.next_record()? {
            Self::apply(&mut map, record);
            replayed += 1;
        }
        if replayed > 0 {
            tracing::debug!(records = replayed, "replayed log on top of checkpoint");
        }

        let wal = Wal::open_with_hooks(&wal_path, hooks)?;

        Ok(Self {
            dir,
            map: RwLock::new(map),
            wal: Mutex::new(wal),
        })
    }

    /// Apply a committed (or replayed) record to the mapping. Removing an
    /// absent key is a no-op, and re-applying the same record is
    /// idempotent.
    fn apply(map: &mut HashMap<String, String>, record: WalRecord) {
        match record.record_type {
            RecordType::Put => {
                map.insert(record.key, record.value.unwrap_or_default());
            }
            RecordType::Delete => {
                map.remove(&record.key);
            }
        }
    }

    /// Insert or update a key. Committed once the log frame is durable.
    pub fn put(&self, key: &str, value: &str) -> Result<()> {
        if key.is_empty() {
            return Err(Error::InvalidKey);
        }
        self.commit(WalRecord::put(key, value))
    }

    /// Delete a key. Deleting an absent key still logs a record and
    /// succeeds.
    pub fn delete(&self, key: &str) -> Result<()> {
        if key.is_empty() {
            return Err(Error::InvalidKey);
        }
        self.commit(WalRecord::delete(key))
    }

    /// Append, sync, then apply; roll the log back if the sync fails.
    fn commit(&self, record: WalRecord) -> Result<()> {
        let mut wal = self.wal.lock().map_err(|_| Error::LockPoisoned)?;

        let offset = wal.append(&record)?;

        if let Err(e) = wal.sync() {
            // The frame never became durable. Discard it before surfacing
            // the failure, so the log only ever holds committed frames.
            if let Err(rollback_err) = wal.rollback(offset) {
                tracing::error!(
                    error = %rollback_err,
                    offset,
                    "rollback after failed sync also failed"
                );
            }
            return Err(e);
        }

        let mut map = self.map.write().map_err(|_| Error::LockPoisoned)?;
        Self::apply(&mut map, record);
        Ok(())
    }

    /// Read a key from the in-memory mapping. Never touches the log.
    pub fn get(&self, key: &str) -> Option<String> {
        // A writer panicking cannot leave the map half-applied (apply is
        // one insert/remove), so a poisoned lock is still safe to read.
        let map = match self.map.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        map.get(key).cloned()
    }

    /// Number of live keys.
    pub fn len(&self) -> usize {
        match self.map.read() {
            Ok(guard) => guard.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }

    /// True when no keys are live.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot the mapping to disk and compact the log.
    ///
    /// Order matters: sync the log first so everything the store believes
    /// committed is durable, stage the snapshot and force it to stable
    /// storage, atomically replace the stable checkpoint, and only then
    /// truncate the log to empty. A crash between the rename and the
    /// truncation is safe: the untrimmed log replays idempotently into
    /// the state the checkpoint already holds.
    pub fn checkpoint(&self) -> Result<()> {
        let mut wal = self.wal.lock().map_err(|_| Error::LockPoisoned)?;

        wal.sync()?;

        let snapshot = self
            .map
            .read()
            .map_err(|_| Error::LockPoisoned)?
            .clone();
        checkpoint::write(&self.dir, &snapshot)?;

        wal.rollback(0)?;
        tracing::debug!(keys = snapshot.len(), "checkpoint complete, log truncated");
        Ok(())
    }

    /// Flush and close the log. Mutations after this fail with
    /// [`Error::Closed`]; reads keep working against the mapping.
    pub fn close(&self) -> Result<()> {
        let mut wal = self.wal.lock().map_err(|_| Error::LockPoisoned)?;
        wal.close()
    }

    /// Backing directory of this store.
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_put_get_delete() {
        let dir = tempdir().unwrap();
        let store = Store::open(dir.path()).unwrap();

        store.put("key1", "value1").unwrap();
        assert_eq!(store.get("key1").as_deref(), Some("value1"));

        store.put("key1", "value2").unwrap();
        assert_eq!(store.get("key1").as_deref(), Some("value2"));

        store.delete("key1").unwrap();
        assert_eq!(store.get("key1"), None);
    }

    #[test]
    fn test_len_tracks_live_keys() {
        let dir = tempdir().unwrap();
        let store = Store::open(dir.path()).unwrap();
        assert!(store.is_empty());

        store.put("key1", "value1").unwrap();
        store.put("key2", "value2").unwrap();
        store.put("key1", "updated").unwrap();
        assert_eq!(store.len(), 2);

        store.delete("key2").unwrap();
        assert_eq!(store.len(), 1);
        assert!(!store.is_empty());
        store.close().unwrap();

        // Replay reconstructs the same count.
        let reopened = Store::open(dir.path()).unwrap();
        assert_eq!(reopened.len(), 1);
    }

    #[test]
    fn test_get_absent_key() {
        let dir = tempdir().unwrap();
        let store = Store::open(dir.path()).unwrap();
        assert_eq!(store.get("missing"), None);
    }

    #[test]
    fn test_delete_absent_key_is_ok() {
        let dir = tempdir().unwrap();
        let store = Store::open(dir.path()).unwrap();
        store.delete("never-existed").unwrap();
    }

    #[test]
    fn test_empty_key_rejected_before_io() {
        let dir = tempdir().unwrap();
        let store = Store::open(dir.path()).unwrap();

        assert!(matches!(store.put("", "x"), Err(Error::InvalidKey)));
        assert!(matches!(store.delete(""), Err(Error::InvalidKey)));

        // Nothing reached the log.
        let len = std::fs::metadata(dir.path().join(WAL_FILE)).unwrap().len();
        assert_eq!(len, 0);
    }

    #[test]
    fn test_mutations_survive_reopen() {
        let dir = tempdir().unwrap();

        {
            let store = Store::open(dir.path()).unwrap();
            store.put("key1", "value1").unwrap();
            store.put("key2", "value2").unwrap();
            store.delete("key1").unwrap();
            store.close().unwrap();
        }

        let store = Store::open(dir.path()).unwrap();
        assert_eq!(store.get("key1"), None);
        assert_eq!(store.get("key2").as_deref(), Some("value2"));
    }

    #[test]
    fn test_recovery_without_clean_close() {
        let dir = tempdir().unwrap();

        {
            let store = Store::open(dir.path()).unwrap();
            store.put("persistent", "data").unwrap();
            // No close - every put already synced its frame.
        }

        let store = Store::open(dir.path()).unwrap();
        assert_eq!(store.get("persistent").as_deref(), Some("data"));
    }

    #[test]
    fn test_writes_after_close_fail() {
        let dir = tempdir().unwrap();
        let store = Store::open(dir.path()).unwrap();
        store.put("key", "value").unwrap();
        store.close().unwrap();

        assert!(matches!(store.put("key2", "v"), Err(Error::Closed)));
        assert!(matches!(store.delete("key"), Err(Error::Closed)));
        assert!(matches!(store.checkpoint(), Err(Error::Closed)));

        // Reads still serve the in-memory mapping.
        assert_eq!(store.get("key").as_deref(), Some("value"));
    }

    #[test]
    fn test_checkpoint_empties_log_and_persists_state() {
        let dir = tempdir().unwrap();
        let store = Store::open(dir.path()).unwrap();

        store.put("a", "1").unwrap();
        store.put("b", "2").unwrap();
        store.checkpoint().unwrap();

        let log_len = std::fs::metadata(dir.path().join(WAL_FILE)).unwrap().len();
        assert_eq!(log_len, 0);
        assert!(dir.path().join(CHECKPOINT_FILE).exists());
        assert!(!dir.path().join(CHECKPOINT_STAGING_FILE).exists());

        store.put("a", "3").unwrap();
        store.close().unwrap();

        let reopened = Store::open(dir.path()).unwrap();
        assert_eq!(reopened.get("a").as_deref(), Some("3"));
        assert_eq!(reopened.get("b").as_deref(), Some("2"));
    }

    #[test]
    fn test_startup_cleans_orphaned_staging_file() {
        let dir = tempdir().unwrap();

        {
            let store = Store::open(dir.path()).unwrap();
            store.put("key1", "value1").unwrap();
            store.checkpoint().unwrap();
            store.close().unwrap();
        }

        // Crash mid-checkpoint left a staging file behind.
        let staging = dir.path().join(CHECKPOINT_STAGING_FILE);
        std::fs::write(&staging, br#"{"key1":"corrupted"}"#).unwrap();

        let store = Store::open(dir.path()).unwrap();
        assert_eq!(store.get("key1").as_deref(), Some("value1"));
        assert!(!staging.exists());
    }
}
