//! Storage module for persisting downloaded transcripts
//!
//! This module handles the local store of transcript pages:
//! - The `LocalStore` capability used by the crawl driver
//! - A directory-backed implementation with small-file purging
//! - Legacy (windows-1250) re-encoding of page text
//! - Summary statistics over the download directory

mod fs;
mod traits;

pub use fs::{encode_legacy, key_of, FsStore, KeyStatistics, StoreStatistics};
pub use traits::{LocalStore, StorageError, StorageResult};

use crate::config::OutputConfig;
use crate::HarvestError;
use std::path::Path;

/// Opens the local store described by the output configuration
///
/// # Returns
///
/// * `Ok(FsStore)` - Store with small files purged and valid files indexed
/// * `Err(HarvestError)` - The directory could not be prepared
pub fn open_store(config: &OutputConfig) -> Result<FsStore, HarvestError> {
    Ok(FsStore::open(
        Path::new(&config.download_dir),
        config.min_file_size_bytes,
    )?)
}
