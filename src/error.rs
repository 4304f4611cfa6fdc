//! Fatal error types for pictoword
//!
//! Everything here aborts session startup or persistence. Things that are
//! *outcomes* — a cancelled block, a trial with no response — are not errors
//! and live in `trial`/`session` result types instead.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for pictoword
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed stimulus tables, invalid bindings, bad protocol code
    #[error("configuration error: {0}")]
    Config(String),

    /// Image or audio file missing/unreadable for a configuration row.
    /// Raised during session setup, never mid-block.
    #[error("missing asset: {}", path.display())]
    AssetMissing { path: PathBuf },

    /// Audio device or decoding failures found while probing clips
    #[error("audio error: {0}")]
    Audio(String),

    /// Terminal and file I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Stimulus table / results parsing and writing errors
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Convenience Result type using pictoword Error
pub type Result<T> = std::result::Result<T, Error>;
