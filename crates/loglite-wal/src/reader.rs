// WAL reader - forward-only, corruption-tolerant replay
//
// Replay policy: a frame with a bad checksum, an unparsable payload, or
// no terminator before end-of-file marks the end of the durable log.
// Everything from that point on is treated as never having been written.
// This assumes corruption only ever happens at the physical tail (a crash
// mid-write); mid-log corruption is not detected beyond stopping there.

use crate::record::{WalRecord, FRAME_TERMINATOR};
use loglite_core::{Error, Result};
use std::fs::File;
use std::io::{BufRead, BufReader, ErrorKind};
use std::path::Path;

/// Reads records from a log file, frame by frame. A fresh `open` re-reads
/// from the start.
pub struct WalReader {
    /// `None` once the trusted prefix is exhausted (or the file is absent,
    /// which reads as an empty log).
    reader: Option<BufReader<File>>,
}

impl WalReader {
    /// Open a log file for reading. A missing file is an empty log, not
    /// an error.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        match File::open(path.as_ref()) {
            Ok(file) => Ok(Self {
                reader: Some(BufReader::new(file)),
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Self { reader: None }),
            Err(e) => Err(Error::Io(e)),
        }
    }

    /// Read the next record from the trusted prefix of the log.
    ///
    /// Returns `Ok(None)` at the end of the log, which includes hitting a
    /// corrupt or incomplete trailing frame: corruption is a signal to
    /// stop replay, never an error surfaced to the caller. `Err` is
    /// reserved for real I/O failures while reading.
    pub fn next_record(&mut self) -> Result<Option<WalRecord>> {
        let reader = match self.reader.as_mut() {
            Some(r) => r,
            None => return Ok(None),
        };

        let mut line = Vec::new();
        let n = reader.read_until(FRAME_TERMINATOR, &mut line)?;
        if n == 0 {
            self.reader = None;
            return Ok(None);
        }

        if line.last() != Some(&FRAME_TERMINATOR) {
            // Crash mid-append left an unterminated frame at the tail.
            tracing::warn!(bytes = n, "discarding incomplete trailing frame");
            self.reader = None;
            return Ok(None);
        }

        match WalRecord::decode(&line) {
            Ok(record) => Ok(Some(record)),
            Err(Error::ChecksumMismatch { stored, computed }) => {
                tracing::warn!(stored, computed, "log ends at frame with bad checksum");
                self.reader = None;
                Ok(None)
            }
            Err(Error::MalformedFrame(msg)) => {
                tracing::warn!(%msg, "log ends at malformed frame");
                self.reader = None;
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Read every remaining record into a vector.
    pub fn read_all(&mut self) -> Result<Vec<WalRecord>> {
        let mut records = Vec::new();
        while let Some(record) = self.next_record()? {
            records.push(record);
        }
        Ok(records)
    }
}

/// Iterator convenience over the trusted prefix. I/O failures terminate
/// the iteration; use [`WalReader::next_record`] to observe them.
impl Iterator for WalReader {
    type Item = WalRecord;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_record().ok().flatten()
    }
}
