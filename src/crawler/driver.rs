//! Crawl driver - the session/part scan
//!
//! The archive offers no listing of sessions or parts, so the driver walks
//! both indices upward from 1 and lets runs of misses decide when to stop:
//!
//! 1. For each key, scan sessions from 1
//! 2. For each session, scan parts from 1 until `max-consecutive-part-errors`
//!    misses in a row
//! 3. Probe part 1 of the next session; stop the key after
//!    `max-consecutive-session-errors` absent sessions in a row
//!
//! Files already in the local store are never requested again, which is
//! what makes restarting an interrupted harvest cheap.

use crate::config::ScanConfig;
use crate::crawler::document::DocumentId;
use crate::crawler::fetcher::DocumentStore;
use crate::crawler::retry::{FetchOutcome, Fetcher};
use crate::output::{CrawlReport, KeyReport};
use crate::state::{FailureCounter, PartOutcome, ScanState, SessionProbe};
use crate::storage::LocalStore;

/// Sequential crawler over the archive's `key × session × part` space
pub struct Crawler<D, S> {
    fetcher: Fetcher<D>,
    store: S,
    scan: ScanConfig,
    base_url: String,
}

impl<D: DocumentStore, S: LocalStore> Crawler<D, S> {
    /// Creates a crawler
    ///
    /// # Arguments
    ///
    /// * `fetcher` - Robust request wrapper around the document store
    /// * `store` - Local store consulted before and written after requests
    /// * `scan` - Content and termination thresholds
    /// * `base_url` - Archive root that document paths are appended to
    pub fn new(fetcher: Fetcher<D>, store: S, scan: ScanConfig, base_url: &str) -> Self {
        Self {
            fetcher,
            store,
            scan,
            base_url: base_url.to_string(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn fetcher(&self) -> &Fetcher<D> {
        &self.fetcher
    }

    /// Scans every key in order, one after the other
    pub async fn run(&mut self, keys: &[String]) -> CrawlReport {
        let mut report = CrawlReport::start();

        for key in keys {
            tracing::info!("--- Processing key: {} ---", key);
            let key_report = self.scan_key(key).await;
            tracing::info!(
                "Finished key {}: {} sessions, {} downloaded, {} already present",
                key,
                key_report.sessions_scanned,
                key_report.downloaded,
                key_report.skipped
            );
            report.keys.push(key_report);
        }

        report.finish();
        report
    }

    /// Session scan for one key
    pub async fn scan_key(&mut self, key: &str) -> KeyReport {
        let mut report = KeyReport::new(key);
        let mut counter = FailureCounter::new(self.scan.max_consecutive_session_errors);
        let mut session = 1;
        let mut prefetched = None;

        loop {
            self.scan_parts(key, session, prefetched.take(), &mut report)
                .await;
            report.sessions_scanned += 1;

            session += 1;
            let (probe, outcome) = self.probe_session(key, session, &mut report).await;
            prefetched = outcome;

            match probe {
                SessionProbe::AlreadyStored => {
                    tracing::debug!("Session {} of {} already downloaded, continuing", session, key);
                    counter.reset();
                }
                SessionProbe::Exists { status } => {
                    tracing::info!(
                        "Next session ({}) of {} exists (status: {}), continuing",
                        session,
                        key,
                        status
                    );
                    counter.reset();
                }
                SessionProbe::Inconclusive => {
                    // Optimistic continuation: a failed probe says nothing
                    // about existence, so the counter is left alone. If the
                    // host stays down this keeps scanning.
                    tracing::warn!(
                        "Network error testing session {} of {}; assuming more data exists",
                        session,
                        key
                    );
                }
                SessionProbe::Missing | SessionProbe::TooSmall { .. } => {
                    tracing::info!(
                        "Session {} of {}: {}; {} consecutive missing sessions",
                        session,
                        key,
                        probe,
                        counter.consecutive() + 1
                    );
                    if counter.record_failure() == ScanState::Terminated {
                        tracing::info!(
                            "Reached {} consecutive missing sessions, done with key {}",
                            counter.limit(),
                            key
                        );
                        break;
                    }
                }
            }
        }

        report
    }

    /// Part scan for one session
    ///
    /// Runs until `max-consecutive-part-errors` misses in a row. `prefetched`
    /// is the already-received response for part 1, if the session probe
    /// got one.
    pub async fn scan_parts(
        &mut self,
        key: &str,
        session: u32,
        mut prefetched: Option<FetchOutcome>,
        report: &mut KeyReport,
    ) {
        let mut counter = FailureCounter::new(self.scan.max_consecutive_part_errors);
        let mut part = 1;

        loop {
            let id = DocumentId::new(key, session, part);
            let outcome = self.fetch_part(&id, prefetched.take(), report).await;

            if outcome.is_failure() {
                if counter.record_failure() == ScanState::Terminated {
                    tracing::info!(
                        "Reached {} consecutive errors in session {} of {}, last part {}",
                        counter.limit(),
                        session,
                        key,
                        part
                    );
                    return;
                }
            } else {
                counter.reset();
            }

            part += 1;
        }
    }

    /// Probes part 1 of `session`
    ///
    /// Returns the classification and, when a request was made, its outcome
    /// so the part scan does not have to request the same page again. A
    /// failed probe is handed on too and counts as a part miss there.
    pub async fn probe_session(
        &mut self,
        key: &str,
        session: u32,
        report: &mut KeyReport,
    ) -> (SessionProbe, Option<FetchOutcome>) {
        let id = DocumentId::new(key, session, 1);

        if self.store.contains(&id.filename()) {
            return (SessionProbe::AlreadyStored, None);
        }

        let url = id.url(&self.base_url);
        tracing::debug!("Testing for next session existence: {}", url);
        report.requests += 1;
        let outcome = self.fetcher.robust_request(&url).await;

        let probe = match &outcome {
            FetchOutcome::Failed { .. } => SessionProbe::Inconclusive,
            FetchOutcome::NotFound => SessionProbe::Missing,
            FetchOutcome::Success { status: 200, body } => {
                let chars = body.chars().count();
                if chars <= self.scan.min_content_length {
                    SessionProbe::TooSmall { chars }
                } else {
                    SessionProbe::Exists { status: 200 }
                }
            }
            FetchOutcome::Success { status, .. } => SessionProbe::Exists { status: *status },
        };

        (probe, Some(outcome))
    }

    /// Fetches and classifies one part, persisting it when it has content
    async fn fetch_part(
        &mut self,
        id: &DocumentId,
        prefetched: Option<FetchOutcome>,
        report: &mut KeyReport,
    ) -> PartOutcome {
        let filename = id.filename();

        if self.store.contains(&filename) {
            tracing::debug!("Already downloaded: {}", filename);
            report.skipped += 1;
            return PartOutcome::AlreadyStored;
        }

        let outcome = match prefetched {
            Some(outcome) => outcome,
            None => {
                let url = id.url(&self.base_url);
                tracing::debug!("Attempting to download: {}", url);
                report.requests += 1;
                self.fetcher.robust_request(&url).await
            }
        };

        match outcome {
            FetchOutcome::Failed { reason } => {
                tracing::warn!("Skipping {}: {}", filename, reason);
                PartOutcome::NetworkFailure
            }
            FetchOutcome::NotFound => {
                tracing::debug!("404 Not Found for part: {}", filename);
                PartOutcome::NotFound
            }
            FetchOutcome::Success { status: 200, body } => {
                let chars = body.chars().count();
                if chars <= self.scan.min_content_length {
                    tracing::debug!("Content too small for {} ({} chars)", filename, chars);
                    return PartOutcome::TooSmall { chars };
                }

                match self.store.write(&filename, &body) {
                    Ok(()) => {
                        tracing::info!("Successfully saved: {} ({} chars)", filename, chars);
                        report.downloaded += 1;
                        PartOutcome::Downloaded { chars }
                    }
                    Err(e) => {
                        tracing::warn!("Error saving file {}: {}", filename, e);
                        report.store_failures += 1;
                        PartOutcome::StoreFailed
                    }
                }
            }
            FetchOutcome::Success { status, .. } => {
                tracing::warn!("Unexpected status code {} for {}", status, filename);
                PartOutcome::UnexpectedStatus(status)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawler::fetcher::{RawResponse, TransportError};
    use crate::crawler::retry::RetryPolicy;
    use crate::storage::{StorageError, StorageResult};
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::time::Duration;

    const BASE: &str = "http://archive.test/eknih";

    /// Serves configured URLs, 404 for everything else, and logs every request
    #[derive(Default)]
    struct MapStore {
        responses: HashMap<String, Result<RawResponse, TransportError>>,
        requested: Mutex<Vec<String>>,
    }

    impl MapStore {
        fn with_page(mut self, key: &str, session: u32, part: u32, body: &str) -> Self {
            let url = DocumentId::new(key, session, part).url(BASE);
            self.responses.insert(url, Ok(RawResponse::new(200, body)));
            self
        }

        fn with_response(
            mut self,
            key: &str,
            session: u32,
            part: u32,
            response: Result<RawResponse, TransportError>,
        ) -> Self {
            let url = DocumentId::new(key, session, part).url(BASE);
            self.responses.insert(url, response);
            self
        }

        fn requested(&self) -> Vec<String> {
            self.requested.lock().unwrap().clone()
        }
    }

    impl DocumentStore for MapStore {
        async fn get(&self, url: &str) -> Result<RawResponse, TransportError> {
            self.requested.lock().unwrap().push(url.to_string());
            self.responses
                .get(url)
                .cloned()
                .unwrap_or_else(|| Ok(RawResponse::new(404, "Not Found")))
        }
    }

    #[derive(Default)]
    struct MemoryStore {
        files: HashMap<String, String>,
    }

    impl LocalStore for MemoryStore {
        fn contains(&self, filename: &str) -> bool {
            self.files.contains_key(filename)
        }

        fn write(&mut self, filename: &str, text: &str) -> StorageResult<()> {
            self.files.insert(filename.to_string(), text.to_string());
            Ok(())
        }

        fn len(&self) -> usize {
            self.files.len()
        }
    }

    struct ReadOnlyStore;

    impl LocalStore for ReadOnlyStore {
        fn contains(&self, _filename: &str) -> bool {
            false
        }

        fn write(&mut self, filename: &str, _text: &str) -> StorageResult<()> {
            Err(StorageError::Io {
                path: filename.to_string(),
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
            })
        }

        fn len(&self) -> usize {
            0
        }
    }

    fn content() -> String {
        "x".repeat(64)
    }

    fn url(key: &str, session: u32, part: u32) -> String {
        DocumentId::new(key, session, part).url(BASE)
    }

    fn crawler<S: LocalStore>(
        documents: MapStore,
        store: S,
        max_parts: u32,
        max_sessions: u32,
    ) -> Crawler<MapStore, S> {
        let policy = RetryPolicy {
            max_attempts: 1,
            backoff_base: Duration::ZERO,
            request_delay: Duration::ZERO,
        };
        let scan = ScanConfig {
            min_content_length: 10,
            max_consecutive_part_errors: max_parts,
            max_consecutive_session_errors: max_sessions,
        };
        Crawler::new(Fetcher::new(documents, policy), store, scan, BASE)
    }

    /// `(session, part)` parsed from `.../s{sss}{ppp}.htm`
    fn indices(url: &str) -> (u32, u32) {
        let name = url.rsplit('/').next().unwrap();
        let digits = &name[1..7];
        (digits[..3].parse().unwrap(), digits[3..].parse().unwrap())
    }

    #[tokio::test]
    async fn test_part_scan_stops_after_threshold() {
        let documents = MapStore::default()
            .with_page("2021ps", 1, 1, &content())
            .with_page("2021ps", 1, 2, &content())
            .with_page("2021ps", 1, 3, &content());
        let mut crawler = crawler(documents, MemoryStore::default(), 3, 3);
        let mut report = KeyReport::new("2021ps");

        crawler.scan_parts("2021ps", 1, None, &mut report).await;

        let expected: Vec<String> = (1..=6).map(|p| url("2021ps", 1, p)).collect();
        assert_eq!(crawler.fetcher().store().requested(), expected);
        assert_eq!(crawler.store().len(), 3);
        assert_eq!(report.downloaded, 3);
        assert_eq!(report.requests, 6);
    }

    #[tokio::test]
    async fn test_empty_success_counts_like_not_found() {
        let mut soft = MapStore::default();
        let mut hard = MapStore::default();
        for part in 1..=5 {
            soft = soft.with_page("k", 1, part, "");
            hard = hard.with_response("k", 1, part, Ok(RawResponse::new(404, "")));
        }

        let mut soft_crawler = crawler(soft, MemoryStore::default(), 3, 3);
        let mut hard_crawler = crawler(hard, MemoryStore::default(), 3, 3);
        let mut soft_report = KeyReport::new("k");
        let mut hard_report = KeyReport::new("k");

        soft_crawler.scan_parts("k", 1, None, &mut soft_report).await;
        hard_crawler.scan_parts("k", 1, None, &mut hard_report).await;

        assert_eq!(
            soft_crawler.fetcher().store().requested(),
            hard_crawler.fetcher().store().requested()
        );
        assert_eq!(soft_crawler.fetcher().store().requested().len(), 3);
        assert!(soft_crawler.store().is_empty());
    }

    #[tokio::test]
    async fn test_body_at_threshold_is_too_small() {
        let documents = MapStore::default()
            .with_page("k", 1, 1, &"x".repeat(10))
            .with_page("k", 1, 2, &"x".repeat(11));
        let mut crawler = crawler(documents, MemoryStore::default(), 3, 3);
        let mut report = KeyReport::new("k");

        crawler.scan_parts("k", 1, None, &mut report).await;

        assert!(!crawler.store().contains(&DocumentId::new("k", 1, 1).filename()));
        assert!(crawler.store().contains(&DocumentId::new("k", 1, 2).filename()));
    }

    #[tokio::test]
    async fn test_characters_not_bytes_are_measured() {
        // 10 characters, 20 bytes in UTF-8
        let documents = MapStore::default().with_response(
            "k",
            1,
            1,
            Ok(RawResponse::new(200, vec![0x9A; 10])),
        );
        let mut crawler = crawler(documents, MemoryStore::default(), 1, 1);
        let mut report = KeyReport::new("k");

        crawler.scan_parts("k", 1, None, &mut report).await;

        assert!(crawler.store().is_empty());
    }

    #[tokio::test]
    async fn test_stored_parts_are_not_requested() {
        let documents = MapStore::default()
            .with_page("k", 1, 1, "fresh content from the server")
            .with_page("k", 1, 2, "fresh content from the server");
        let mut store = MemoryStore::default();
        store
            .write(&DocumentId::new("k", 1, 1).filename(), "original")
            .unwrap();
        store
            .write(&DocumentId::new("k", 1, 2).filename(), "original")
            .unwrap();
        let mut crawler = crawler(documents, store, 3, 3);
        let mut report = KeyReport::new("k");

        crawler.scan_parts("k", 1, None, &mut report).await;

        assert_eq!(
            crawler.fetcher().store().requested(),
            vec![url("k", 1, 3), url("k", 1, 4), url("k", 1, 5)]
        );
        assert_eq!(
            crawler.store().files.get(&DocumentId::new("k", 1, 1).filename()),
            Some(&"original".to_string())
        );
        assert_eq!(report.skipped, 2);
    }

    #[tokio::test]
    async fn test_unexpected_status_counts_as_failure() {
        let documents = MapStore::default()
            .with_response("k", 1, 1, Ok(RawResponse::new(204, "")))
            .with_page("k", 1, 2, &content());
        let mut crawler = crawler(documents, MemoryStore::default(), 1, 1);
        let mut report = KeyReport::new("k");

        crawler.scan_parts("k", 1, None, &mut report).await;

        assert_eq!(crawler.fetcher().store().requested(), vec![url("k", 1, 1)]);
    }

    #[tokio::test]
    async fn test_failed_write_resets_counter_but_is_not_recorded() {
        let documents = MapStore::default().with_page("k", 1, 1, &content());
        let mut crawler = crawler(documents, ReadOnlyStore, 2, 1);
        let mut report = KeyReport::new("k");

        crawler.scan_parts("k", 1, None, &mut report).await;

        assert_eq!(
            crawler.fetcher().store().requested(),
            vec![url("k", 1, 1), url("k", 1, 2), url("k", 1, 3)]
        );
        assert_eq!(report.store_failures, 1);
        assert_eq!(report.downloaded, 0);
    }

    #[tokio::test]
    async fn test_stored_session_probe_issues_no_request() {
        let mut store = MemoryStore::default();
        store
            .write(&DocumentId::new("k", 2, 1).filename(), &content())
            .unwrap();
        let mut crawler = crawler(MapStore::default(), store, 3, 3);

        let report = crawler.scan_key("k").await;

        let requested = crawler.fetcher().store().requested();
        assert!(!requested.contains(&url("k", 2, 1)));
        assert_eq!(
            requested,
            vec![
                url("k", 1, 1),
                url("k", 1, 2),
                url("k", 1, 3),
                // session 2 part 1 is on disk: no probe, no request
                url("k", 2, 2),
                url("k", 2, 3),
                url("k", 2, 4),
                url("k", 3, 1),
                url("k", 3, 2),
                url("k", 3, 3),
                url("k", 4, 1),
                url("k", 4, 2),
                url("k", 4, 3),
                url("k", 5, 1),
            ]
        );
        assert_eq!(report.sessions_scanned, 4);
    }

    #[tokio::test]
    async fn test_indices_increase_without_repeats() {
        let mut documents = MapStore::default();
        for (session, parts) in [(1, 4), (2, 2), (3, 0), (4, 3)] {
            for part in 1..=parts {
                documents = documents.with_page("k", session, part, &content());
            }
        }
        let mut crawler = crawler(documents, MemoryStore::default(), 2, 2);

        crawler.scan_key("k").await;

        let probed: Vec<(u32, u32)> = crawler
            .fetcher()
            .store()
            .requested()
            .iter()
            .map(|u| indices(u))
            .collect();
        assert!(probed.windows(2).all(|w| w[0] < w[1]), "{:?}", probed);
        assert_eq!(crawler.store().len(), 9);
    }

    #[tokio::test]
    async fn test_probe_response_is_reused_for_part_one() {
        let documents = MapStore::default()
            .with_page("k", 1, 1, &content())
            .with_page("k", 2, 1, &content());
        let mut crawler = crawler(documents, MemoryStore::default(), 1, 1);

        let report = crawler.scan_key("k").await;

        assert_eq!(
            crawler.fetcher().store().requested(),
            vec![
                url("k", 1, 1),
                url("k", 1, 2),
                url("k", 2, 1),
                url("k", 2, 2),
                url("k", 3, 1),
            ]
        );
        assert!(crawler.store().contains(&DocumentId::new("k", 2, 1).filename()));
        assert_eq!(report.downloaded, 2);
        assert_eq!(report.sessions_scanned, 2);
    }

    #[tokio::test]
    async fn test_inconclusive_probe_keeps_scanning() {
        let documents = MapStore::default()
            .with_page("k", 1, 1, &content())
            .with_response(
                "k",
                2,
                1,
                Err(TransportError::Connect("connection reset".to_string())),
            );
        let mut crawler = crawler(documents, MemoryStore::default(), 1, 1);

        let report = crawler.scan_key("k").await;

        // with a session limit of 1, counting the failed probe would have
        // ended the key before session 2 was scanned
        assert_eq!(report.sessions_scanned, 2);
        assert_eq!(
            crawler.fetcher().store().requested(),
            vec![url("k", 1, 1), url("k", 1, 2), url("k", 2, 1), url("k", 3, 1)]
        );
    }

    #[tokio::test]
    async fn test_small_session_probe_counts_as_missing() {
        let documents = MapStore::default()
            .with_page("k", 1, 1, &content())
            .with_page("k", 2, 1, "tiny")
            .with_page("k", 3, 1, "tiny");
        let mut crawler = crawler(documents, MemoryStore::default(), 1, 2);

        let report = crawler.scan_key("k").await;

        assert_eq!(
            crawler.fetcher().store().requested(),
            vec![url("k", 1, 1), url("k", 1, 2), url("k", 2, 1), url("k", 3, 1)]
        );
        assert_eq!(report.sessions_scanned, 2);
        assert_eq!(report.downloaded, 1);
    }

    #[tokio::test]
    async fn test_other_success_status_on_probe_resets_session_counter() {
        let documents = MapStore::default()
            .with_page("k", 1, 1, &content())
            .with_response("k", 2, 1, Ok(RawResponse::new(204, "")))
            .with_page("k", 3, 1, &content());
        let mut crawler = crawler(documents, MemoryStore::default(), 1, 1);

        let report = crawler.scan_key("k").await;

        assert_eq!(
            crawler.fetcher().store().requested(),
            vec![
                url("k", 1, 1),
                url("k", 1, 2),
                url("k", 2, 1),
                url("k", 3, 1),
                url("k", 3, 2),
                url("k", 4, 1),
            ]
        );
        assert_eq!(report.downloaded, 2);
    }

    #[tokio::test]
    async fn test_run_processes_keys_in_order() {
        let documents = MapStore::default()
            .with_page("2021ps", 1, 1, &content())
            .with_page("1993ps", 1, 1, &content());
        let mut crawler = crawler(documents, MemoryStore::default(), 1, 1);
        let keys = vec!["2021ps".to_string(), "1993ps".to_string()];

        let report = crawler.run(&keys).await;

        let requested = crawler.fetcher().store().requested();
        assert_eq!(requested.first(), Some(&url("2021ps", 1, 1)));
        assert_eq!(requested.last(), Some(&url("1993ps", 2, 1)));
        assert_eq!(
            report.keys.iter().map(|k| k.key.as_str()).collect::<Vec<_>>(),
            vec!["2021ps", "1993ps"]
        );
        assert_eq!(report.total_downloaded(), 2);
        assert!(report.finished_at.is_some());
    }
}
