//! Statistics over the local store
//!
//! This module provides functionality for extracting and displaying
//! statistics about the downloaded transcripts.

use crate::config::OutputConfig;
use crate::storage::{FsStore, StoreStatistics};
use crate::HarvestError;
use std::path::Path;

/// Loads statistics from the configured download directory
///
/// The directory is only read. Files below the minimum size are left in
/// place but not counted, so the numbers match what the next harvest would
/// consider downloaded.
pub fn load_statistics(config: &OutputConfig) -> Result<StoreStatistics, HarvestError> {
    let store = FsStore::inspect(Path::new(&config.download_dir))?;
    Ok(store.statistics(config.min_file_size_bytes)?)
}

/// Prints store statistics to stdout in a formatted manner
pub fn print_statistics(stats: &StoreStatistics) {
    println!("=== Store Statistics ===\n");

    println!("Overview:");
    println!("  Transcript files: {}", stats.files);
    println!("  Total size: {}", format_bytes(stats.total_bytes));
    println!("  Keys: {}", stats.per_key.len());
    println!();

    println!("Files by Key:");
    // most recent first, like the crawl order
    for (key, entry) in stats.per_key.iter().rev() {
        let percentage = if stats.files > 0 {
            (entry.files as f64 / stats.files as f64) * 100.0
        } else {
            0.0
        };
        println!(
            "  {}: {} files, {} ({:.1}%)",
            key,
            entry.files,
            format_bytes(entry.bytes),
            percentage
        );
    }
}

/// Human-readable byte count
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KiB", "MiB", "GiB"];

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    if unit == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.1} {}", value, UNITS[unit])
    }
}
