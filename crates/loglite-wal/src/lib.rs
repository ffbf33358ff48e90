//! # Loglite WAL (Write-Ahead Log)
//!
//! Durable, crash-recoverable append log for Loglite.
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
//! ## File format
//!
//! One text-framed record per line:
//!
//! ```text
//! ┌──────────────┬─────┬──────────────────────────────────────────┬────┐
//! │ CRC32 (8 hex)│ SP  │ JSON payload (control chars escaped)     │ \n │
//! └──────────────┴─────┴──────────────────────────────────────────┴────┘
//! ```
//!
//! The checksum is rendered as fixed-width hexadecimal text and the payload
//! is JSON, so the newline terminator can never occur inside a frame. A
//! byte-scanning reader locates frame boundaries without decoding payloads.
//!
//! The log is not internally thread-safe: callers serialize every
//! append/sync/rollback sequence externally (the store's write lock).

pub mod log;
pub mod reader;
pub mod record;

pub use log::{Wal, WalHooks};
pub use reader::WalReader;
pub use record::{RecordType, WalRecord};

/// Default WAL file name inside a store directory.
pub const WAL_FILE: &str = "wal.log";
