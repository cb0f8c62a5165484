//! Output module for crawl reports and store statistics
//!
//! This module handles:
//! - Per-key and per-run counters filled by the crawl driver
//! - Printing the closing harvest report
//! - Summarizing what the download directory holds

mod report;
pub mod stats;

pub use report::{print_report, CrawlReport, KeyReport};
pub use stats::{format_bytes, load_statistics, print_statistics};
