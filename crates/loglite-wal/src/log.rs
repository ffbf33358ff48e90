// WAL file management - append, sync, rollback, close
//
// Offsets returned by append() are the byte position a frame started at;
// rollback(offset) truncates the file back to that position to discard a
// frame that never became durable. The log holds the only handle to its
// file and is not internally thread-safe.

use crate::record::WalRecord;
use loglite_core::{Error, Result};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// A callback fired after one phase of a write. Returning an error makes
/// the phase itself fail, which is how tests and crash harnesses inject
/// faults at instrumented points.
pub type Hook = Box<dyn FnMut() -> std::io::Result<()> + Send>;

/// Optional fault-injection hooks, fired in write order.
#[derive(Default)]
pub struct WalHooks {
    /// Fired after the frame bytes were handed to the file
    pub post_append: Option<Hook>,
    /// Fired after the userspace flush, before the hardware sync
    pub post_flush: Option<Hook>,
    /// Fired after the hardware sync
    pub post_sync: Option<Hook>,
}

/// Append-only, fsync-durable log over a single file.
pub struct Wal {
    path: PathBuf,
    /// `None` once closed; every operation on a closed log fails with
    /// [`Error::Closed`].
    file: Option<File>,
    /// Current end offset; bytes below it were appended (not necessarily
    /// synced yet).
    offset: u64,
    hooks: WalHooks,
}

impl Wal {
    /// Open the log file for appending, creating it if absent.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with_hooks(path, WalHooks::default())
    }

    /// Open with fault-injection hooks installed.
    pub fn open_with_hooks(path: impl AsRef<Path>, hooks: WalHooks) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let offset = file.metadata()?.len();

        Ok(Self {
            path,
            file: Some(file),
            offset,
            hooks,
        })
    }

    /// Append a record frame at the current end of the log.
    ///
    /// Returns the offset the frame started at: the position to roll back
    /// to if this write must be undone. Appending claims nothing about
    /// durability; call [`Wal::sync`] for that.
    pub fn append(&mut self, record: &WalRecord) -> Result<u64> {
        let file = self.file.as_mut().ok_or(Error::Closed)?;
        let frame = record.encode()?;
        let start = self.offset;

        if let Err(e) = file.write_all(&frame) {
            // Discard any partially written bytes so tracked offsets stay
            // aligned with the file.
            let _ = file.set_len(start);
            return Err(Error::Io(e));
        }
        self.offset += frame.len() as u64;

        if let Some(hook) = self.hooks.post_append.as_mut() {
            hook()?;
        }
        Ok(start)
    }

    /// Force everything appended so far to stable storage.
    ///
    /// On failure nothing appended since the last successful sync is
    /// guaranteed durable; the caller decides whether to roll those
    /// bytes back.
    pub fn sync(&mut self) -> Result<()> {
        self.file.as_mut().ok_or(Error::Closed)?.flush()?;
        if let Some(hook) = self.hooks.post_flush.as_mut() {
            hook()?;
        }
        self.file.as_ref().ok_or(Error::Closed)?.sync_all()?;
        if let Some(hook) = self.hooks.post_sync.as_mut() {
            hook()?;
        }
        Ok(())
    }

    /// Truncate the log to exactly `offset` bytes.
    ///
    /// `offset` must be a value previously returned by [`Wal::append`] on
    /// this instance, or 0. The file is in append mode, so the next write
    /// lands at the new end without an explicit seek.
    pub fn rollback(&mut self, offset: u64) -> Result<()> {
        let file = self.file.as_mut().ok_or(Error::Closed)?;
        file.set_len(offset)?;
        self.offset = offset;
        tracing::debug!(offset, "log rolled back");
        Ok(())
    }

    /// Sync, then release the file handle. Subsequent operations fail
    /// with [`Error::Closed`].
    pub fn close(&mut self) -> Result<()> {
        self.sync()?;
        self.file = None;
        Ok(())
    }

    /// Current end offset of the log (0 for an empty log).
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Path of the underlying log file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for Wal {
    fn drop(&mut self) {
        // Best effort sync on drop; a no-op when already closed
        if self.file.is_some() {
            let _ = self.sync();
        }
    }
}
