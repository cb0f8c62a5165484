//! Crawler module for harvesting transcript pages
//!
//! This module contains the core harvesting logic, including:
//! - Key discovery from the archive index page
//! - Document identity (URL and filename per session/part)
//! - HTTP fetching with retry and backoff
//! - The session/part scan that decides when to stop

mod document;
mod driver;
mod fetcher;
mod keys;
mod retry;

pub use document::DocumentId;
pub use driver::Crawler;
pub use fetcher::{build_http_client, DocumentStore, HttpDocumentStore, RawResponse, TransportError};
pub use keys::{derive_keys, expand_keys, extract_hrefs, fetch_index, is_key_link, key_from_href};
pub use retry::{decode_legacy, FetchOutcome, Fetcher, RetryPolicy};

use crate::config::Config;
use crate::output::CrawlReport;
use crate::storage::open_store;
use crate::HarvestError;
use reqwest::Client;

/// Fetches the index page and derives the ordered key list
///
/// # Returns
///
/// * `Ok(Vec<String>)` - Keys, most recent first
/// * `Err(HarvestError::KeySource)` - The index page could not be fetched
pub async fn discover_keys(client: &Client, config: &Config) -> Result<Vec<String>, HarvestError> {
    let html = fetch_index(client, &config.source.index_url).await?;
    let keys = derive_keys(&html, &config.expansion);
    tracing::info!("Keys to process (most recent first): {}", keys.join(", "));
    Ok(keys)
}

/// Runs a complete harvest
///
/// This is the main entry point. It will:
/// 1. Build the HTTP client
/// 2. Derive the key list from the index page (fatal on failure)
/// 3. Open the local store, purging undersized files
/// 4. Scan every key's sessions and parts
///
/// # Arguments
///
/// * `config` - The harvest configuration
///
/// # Returns
///
/// * `Ok(CrawlReport)` - Harvest completed
/// * `Err(HarvestError)` - Harvest could not start
///
/// # Example
///
/// ```no_run
/// use steno_harvest::config::Config;
/// use steno_harvest::crawler::harvest;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let report = harvest(Config::default()).await?;
/// println!("Downloaded {} pages", report.total_downloaded());
/// # Ok(())
/// # }
/// ```
pub async fn harvest(config: Config) -> Result<CrawlReport, HarvestError> {
    let client = build_http_client(&config.http)?;
    let keys = discover_keys(&client, &config).await?;
    let store = open_store(&config.output)?;

    let fetcher = Fetcher::new(
        HttpDocumentStore::new(client),
        RetryPolicy::from_config(&config.http),
    );
    let mut crawler = Crawler::new(fetcher, store, config.scan.clone(), &config.source.base_url);

    Ok(crawler.run(&keys).await)
}
