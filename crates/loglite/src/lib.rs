//! # Loglite
//!
//! A single-node durable key-value store. Every mutation is appended to a
//! checksummed write-ahead log and fsynced before it touches in-memory
//! state; periodic checkpoints snapshot the mapping and compact the log.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use loglite::Database;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // A persistent database (data survives restarts and crashes)
//!     let db = Database::open("./my_database")?;
//!
//!     db.put("user:1:name", "Alice")?;
//!     db.put("user:1:email", "alice@example.com")?;
//!
//!     if let Some(name) = db.get("user:1:name") {
//!         println!("Name: {}", name);
//!     }
//!
//!     db.delete("user:1:email")?;
//!
//!     // Fold the log into a snapshot and truncate it
//!     db.checkpoint()?;
//!     Ok(())
//! }
//! ```
//!
//! ## Database modes
//!
//! ```rust,no_run
//! use loglite::Database;
//!
//! // Persistent database (recommended)
//! let persistent_db = Database::open("./data")?;
//!
//! // Ephemeral in-memory database (no durability, useful for tests)
//! let memory_db = Database::in_memory();
//! # Ok::<(), loglite::Error>(())
//! ```
//!
//! ## Durability model
//!
//! A `put` or `delete` returns only after its log frame is on stable
//! storage; if the fsync fails, the frame is rolled back and the call
//! errors without leaving a trace. Recovery loads the last checkpoint and
//! replays whatever the log holds beyond it.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, RwLock};

// Re-export core types
pub use loglite_core::{Error, Result};

// WAL components
pub use loglite_wal::{RecordType, Wal, WalHooks, WalReader, WalRecord, WAL_FILE};

// Store components
pub use loglite_store::{Store, CHECKPOINT_FILE, CHECKPOINT_STAGING_FILE};

pub mod logging;

/// Current version of Loglite
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Storage backend for the database
enum Backend {
    /// Ephemeral in-memory mapping; the write path collapses to a direct
    /// memory apply
    Memory(RwLock<HashMap<String, String>>),
    /// Durable store backed by a directory (log + checkpoint)
    Persistent(Store),
}

/// The main database handle.
///
/// Wraps either an ephemeral in-memory mapping or a persistent [`Store`].
/// Thread-safe and cheap to clone; clones share the same backend.
#[derive(Clone)]
pub struct Database {
    inner: Arc<Backend>,
}

impl Database {
    /// Opens a persistent database in the given directory, creating it if
    /// needed and running crash recovery.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let store = Store::open(path)?;
        Ok(Database {
            inner: Arc::new(Backend::Persistent(store)),
        })
    }

    /// Creates an ephemeral in-memory database with no durability.
    pub fn in_memory() -> Self {
        Database {
            inner: Arc::new(Backend::Memory(RwLock::new(HashMap::new()))),
        }
    }

    /// Inserts or updates a key-value pair.
    ///
    /// For a persistent database this returns only after the mutation is
    /// durable. Fails with [`Error::InvalidKey`] on an empty key in
    /// either mode.
    pub fn put(&self, key: &str, value: &str) -> Result<()> {
        match self.inner.as_ref() {
            Backend::Memory(map) => {
                if key.is_empty() {
                    return Err(Error::InvalidKey);
                }
                let mut map = map.write().map_err(|_| Error::LockPoisoned)?;
                map.insert(key.to_string(), value.to_string());
                Ok(())
            }
            Backend::Persistent(store) => store.put(key, value),
        }
    }

    /// Retrieves a value by key; `None` when absent.
    pub fn get(&self, key: &str) -> Option<String> {
        match self.inner.as_ref() {
            Backend::Memory(map) => {
                let map = match map.read() {
                    Ok(guard) => guard,
                    Err(poisoned) => poisoned.into_inner(),
                };
                map.get(key).cloned()
            }
            Backend::Persistent(store) => store.get(key),
        }
    }

    /// Deletes a key. Deleting an absent key succeeds.
    pub fn delete(&self, key: &str) -> Result<()> {
        match self.inner.as_ref() {
            Backend::Memory(map) => {
                if key.is_empty() {
                    return Err(Error::InvalidKey);
                }
                let mut map = map.write().map_err(|_| Error::LockPoisoned)?;
                map.remove(key);
                Ok(())
            }
            Backend::Persistent(store) => store.delete(key),
        }
    }

    /// Snapshots the mapping and compacts the log. A no-op for an
    /// in-memory database.
    pub fn checkpoint(&self) -> Result<()> {
        match self.inner.as_ref() {
            Backend::Memory(_) => Ok(()),
            Backend::Persistent(store) => store.checkpoint(),
        }
    }

    /// Flushes and closes the underlying log. Further mutations on a
    /// persistent database fail with [`Error::Closed`]; a no-op for an
    /// in-memory one.
    pub fn close(&self) -> Result<()> {
        match self.inner.as_ref() {
            Backend::Memory(_) => Ok(()),
            Backend::Persistent(store) => store.close(),
        }
    }

    /// Returns `true` if the database is backed by disk.
    pub fn is_persistent(&self) -> bool {
        matches!(self.inner.as_ref(), Backend::Persistent(_))
    }
}
