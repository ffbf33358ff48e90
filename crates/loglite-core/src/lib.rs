//! # Loglite Core
//!
//! Shared error type and `Result` alias for the Loglite durable
//! key-value store.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;

pub use error::{Error, Result};
