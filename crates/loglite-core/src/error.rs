//! Error types for Loglite.

use std::fmt;

/// The main error type for Loglite operations.
#[derive(Debug)]
pub enum Error {
    /// Empty key on put/delete, rejected before any I/O
    InvalidKey,

    /// I/O error from the log file, the checkpoint files, or the store directory
    Io(std::io::Error),

    /// A frame's stored CRC disagrees with the one recomputed over its payload
    ChecksumMismatch {
        /// CRC carried in the frame header
        stored: u32,
        /// CRC recomputed over the payload bytes
        computed: u32,
    },

    /// A frame passed its checksum but its payload cannot be parsed into a
    /// known record shape
    MalformedFrame(String),

    /// Operation attempted on a closed log or store
    Closed,

    /// Serialization/deserialization error
    Serialization(String),

    /// A lock was poisoned (internal error)
    LockPoisoned,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidKey => write!(f, "Key must not be empty"),
            Error::Io(e) => write!(f, "I/O error: {}", e),
            Error::ChecksumMismatch { stored, computed } => write!(
                f,
                "Checksum mismatch: stored {:08x}, computed {:08x}",
                stored, computed
            ),
            Error::MalformedFrame(msg) => write!(f, "Malformed frame: {}", msg),
            Error::Closed => write!(f, "Log is closed"),
            Error::Serialization(msg) => write!(f, "Serialization error: {}", msg),
            Error::LockPoisoned => write!(f, "Lock poisoned"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

/// A specialized `Result` type for Loglite operations.
pub type Result<T> = std::result::Result<T, Error>;
