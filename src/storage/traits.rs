//! Storage traits and error types
//!
//! This module defines the trait interface for the local transcript store
//! and its error type.

use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("Invalid filename: {0}")]
    InvalidFilename(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Presence-checked store of downloaded transcript pages
///
/// A filename that `contains` reports is never fetched again, so a store
/// must only record a name after its contents were written in full.
pub trait LocalStore {
    /// Returns true if `filename` was already downloaded
    fn contains(&self, filename: &str) -> bool;

    /// Persists a transcript page and records its filename
    ///
    /// On error the filename must not be recorded.
    fn write(&mut self, filename: &str, text: &str) -> StorageResult<()>;

    /// Number of recorded filenames
    fn len(&self) -> usize;

    /// Returns true if nothing has been downloaded yet
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
