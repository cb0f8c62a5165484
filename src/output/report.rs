//! Crawl reports
//!
//! The driver fills one `KeyReport` per key; `CrawlReport` collects them
//! with the run's timestamps for the closing summary.

use chrono::{DateTime, Utc};

/// Counters for one key's session scan
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyReport {
    /// The key that was scanned
    pub key: String,

    /// Number of sessions whose parts were scanned
    pub sessions_scanned: u32,

    /// Robust requests issued (part fetches and session probes)
    pub requests: u32,

    /// Pages written to the local store
    pub downloaded: u32,

    /// Pages skipped because they were already stored
    pub skipped: u32,

    /// Good pages that could not be written
    pub store_failures: u32,
}

impl KeyReport {
    pub fn new(key: &str) -> Self {
        Self {
            key: key.to_string(),
            ..Self::default()
        }
    }
}

/// Summary of a complete harvest run
#[derive(Debug, Clone)]
pub struct CrawlReport {
    /// When the run started
    pub started_at: DateTime<Utc>,

    /// When the run finished, if it did
    pub finished_at: Option<DateTime<Utc>>,

    /// Per-key counters in processing order
    pub keys: Vec<KeyReport>,
}

impl CrawlReport {
    /// Starts a report stamped with the current time
    pub fn start() -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: None,
            keys: Vec::new(),
        }
    }

    /// Stamps the finish time
    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    /// Run duration in seconds, if finished
    pub fn duration_seconds(&self) -> Option<i64> {
        self.finished_at
            .map(|finished| (finished - self.started_at).num_seconds())
    }

    pub fn total_requests(&self) -> u64 {
        self.keys.iter().map(|k| u64::from(k.requests)).sum()
    }

    pub fn total_downloaded(&self) -> u64 {
        self.keys.iter().map(|k| u64::from(k.downloaded)).sum()
    }

    pub fn total_skipped(&self) -> u64 {
        self.keys.iter().map(|k| u64::from(k.skipped)).sum()
    }

    pub fn total_store_failures(&self) -> u64 {
        self.keys.iter().map(|k| u64::from(k.store_failures)).sum()
    }
}

/// Prints a crawl report to stdout
pub fn print_report(report: &CrawlReport) {
    println!("=== Harvest Report ===\n");

    println!("Started: {}", report.started_at.to_rfc3339());
    if let Some(finished) = report.finished_at {
        println!("Finished: {}", finished.to_rfc3339());
    }
    if let Some(seconds) = report.duration_seconds() {
        println!("Duration: {}s", seconds);
    }
    println!();

    println!("Totals:");
    println!("  Keys processed: {}", report.keys.len());
    println!("  Requests issued: {}", report.total_requests());
    println!("  Pages downloaded: {}", report.total_downloaded());
    println!("  Pages already present: {}", report.total_skipped());
    if report.total_store_failures() > 0 {
        println!("  Pages that failed to save: {}", report.total_store_failures());
    }
    println!();

    println!("Per Key:");
    for key in &report.keys {
        println!(
            "  {}: {} sessions, {} downloaded, {} present, {} requests",
            key.key, key.sessions_scanned, key.downloaded, key.skipped, key.requests
        );
    }
}
