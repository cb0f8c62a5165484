//! Key derivation from the archive index page
//!
//! The archive has no listing endpoint for legislative bodies. The index
//! page links to each of them, so keys are taken from anchor hrefs that
//! follow the archive's path naming, then widened with the chambers that
//! live one level deeper.

use crate::config::ExpansionRule;
use crate::HarvestError;
use reqwest::Client;
use scraper::{Html, Selector};
use std::collections::BTreeSet;

/// Path segment that precedes every key in an archive href
const PATH_MARKER: &str = "eknih/";

/// Fetches the index page
///
/// Any failure here is fatal: without the index there is no key list.
pub async fn fetch_index(client: &Client, index_url: &str) -> Result<String, HarvestError> {
    tracing::info!("Extracting initial keys from {}", index_url);

    let key_source = |source: reqwest::Error| HarvestError::KeySource {
        url: index_url.to_string(),
        source,
    };

    let response = client
        .get(index_url)
        .send()
        .await
        .and_then(|r| r.error_for_status())
        .map_err(key_source)?;

    response.text().await.map_err(key_source)
}

/// Collects the `href` of every anchor in the document
pub fn extract_hrefs(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let mut hrefs = Vec::new();

    if let Ok(selector) = Selector::parse("a[href]") {
        for element in document.select(&selector) {
            if let Some(href) = element.value().attr("href") {
                hrefs.push(href.to_string());
            }
        }
    }

    hrefs
}

/// Allow-list heuristic over the archive's href naming
///
/// An href names a key if it points below `/eknih/`, carries a `1` or `0`
/// (every key starts with a year), and is either a `cnr` body or not an
/// `nr` one. This is string matching, not URL parsing, and is deliberately
/// as loose as the archive's own naming.
pub fn is_key_link(href: &str) -> bool {
    href.contains("/eknih/")
        && (href.contains('1') || href.contains('0'))
        && (href.contains("cnr") || !href.contains("nr"))
}

/// First path segment after the last `eknih/` in the href
pub fn key_from_href(href: &str) -> Option<&str> {
    let tail = href.rsplit(PATH_MARKER).next()?;
    tail.split('/').next().filter(|key| !key.is_empty())
}

/// Adds the derived key of every rule whose suffix a key ends with
///
/// Single pass over the original keys; derived keys are not expanded again.
/// The suffix is replaced wherever it occurs in the key.
pub fn expand_keys(keys: &BTreeSet<String>, rules: &[ExpansionRule]) -> BTreeSet<String> {
    let mut expanded = keys.clone();

    for key in keys {
        for rule in rules {
            if key.ends_with(&rule.suffix) {
                let derived = key.replace(&rule.suffix, &rule.replacement);
                if expanded.insert(derived.clone()) {
                    tracing::debug!("Added extended key: {} (from {})", derived, key);
                }
            }
        }
    }

    expanded
}

/// Derives the ordered key list from the index page HTML
///
/// # Returns
///
/// Deduplicated keys, most recent (lexicographically greatest) first
pub fn derive_keys(html: &str, rules: &[ExpansionRule]) -> Vec<String> {
    let initial: BTreeSet<String> = extract_hrefs(html)
        .iter()
        .filter(|href| is_key_link(href))
        .filter_map(|href| key_from_href(href))
        .map(str::to_string)
        .collect();
    tracing::info!("Initial keys found: {}", initial.len());

    let expanded = expand_keys(&initial, rules);
    tracing::info!(
        "Total keys after extension: {} (added {} new keys)",
        expanded.len(),
        expanded.len() - initial.len()
    );

    expanded.into_iter().rev().collect()
}
