//! Robust request wrapper
//!
//! Every request the crawl driver makes goes through `Fetcher::robust_request`,
//! which retries network-level failures with exponential backoff, folds HTTP
//! errors into a three-way outcome, decodes the legacy page encoding, and
//! paces the crawl with a fixed delay after each request sequence.
//!
//! # Retry Logic
//!
//! | Condition | Action |
//! |-----------|--------|
//! | HTTP 404 | Immediate → NotFound |
//! | Other HTTP ≥ 400 | Immediate → Failed |
//! | Timeout / connection error | Retry, `base × 2^attempt` delay |
//! | Other transport error | Immediate → Failed |

use crate::config::HttpConfig;
use crate::crawler::fetcher::DocumentStore;
use encoding_rs::WINDOWS_1250;
use std::time::Duration;

/// Outcome of a robust request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The server answered with a status below 400
    Success {
        /// HTTP status code
        status: u16,
        /// Body decoded from windows-1250
        body: String,
    },

    /// HTTP 404
    NotFound,

    /// Retries exhausted, a non-retryable transport error, or an HTTP error
    Failed {
        /// Error description
        reason: String,
    },
}

/// Attempt count and timing of robust requests
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts before giving up on network failures
    pub max_attempts: u32,
    /// Delay before the second attempt; doubles for each further one
    pub backoff_base: Duration,
    /// Pause after every request sequence
    pub request_delay: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &HttpConfig) -> Self {
        Self {
            max_attempts: config.max_retries,
            backoff_base: Duration::from_millis(config.backoff_base_ms),
            request_delay: Duration::from_millis(config.request_delay_ms),
        }
    }

    /// Wait after the failed attempt number `attempt` (counted from 0)
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let factor = 2u32.checked_pow(attempt).unwrap_or(u32::MAX);
        self.backoff_base.saturating_mul(factor)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&HttpConfig::default())
    }
}

/// Issues robust requests against a document store
#[derive(Debug)]
pub struct Fetcher<D> {
    store: D,
    policy: RetryPolicy,
}

impl<D: DocumentStore> Fetcher<D> {
    pub fn new(store: D, policy: RetryPolicy) -> Self {
        Self { store, policy }
    }

    pub fn store(&self) -> &D {
        &self.store
    }

    /// Fetches a URL, retrying network failures
    ///
    /// # Returns
    ///
    /// A `FetchOutcome`; this never fails outright; every problem is folded
    /// into `FetchOutcome::Failed` and logged.
    pub async fn robust_request(&self, url: &str) -> FetchOutcome {
        let outcome = self.attempt_sequence(url).await;

        if !self.policy.request_delay.is_zero() {
            tokio::time::sleep(self.policy.request_delay).await;
        }

        outcome
    }

    async fn attempt_sequence(&self, url: &str) -> FetchOutcome {
        let max_attempts = self.policy.max_attempts.max(1);

        for attempt in 0..max_attempts {
            match self.store.get(url).await {
                Ok(response) => {
                    if response.status == 404 {
                        return FetchOutcome::NotFound;
                    }

                    if response.status >= 400 {
                        tracing::warn!("HTTP error for {}: status {}", url, response.status);
                        return FetchOutcome::Failed {
                            reason: format!("HTTP {}", response.status),
                        };
                    }

                    return FetchOutcome::Success {
                        status: response.status,
                        body: decode_legacy(&response.body),
                    };
                }
                Err(e) if e.is_retryable() => {
                    tracing::warn!(
                        "Network error on attempt {}/{} for {}: {}",
                        attempt + 1,
                        max_attempts,
                        url,
                        e
                    );

                    if attempt + 1 < max_attempts {
                        let wait = self.policy.backoff_delay(attempt);
                        tracing::info!("Retrying in {:.1} seconds...", wait.as_secs_f64());
                        tokio::time::sleep(wait).await;
                    }
                }
                Err(e) => {
                    tracing::warn!("General request error for {}: {}", url, e);
                    return FetchOutcome::Failed {
                        reason: e.to_string(),
                    };
                }
            }
        }

        tracing::warn!("Failed after {} attempts. Skipping {}", max_attempts, url);
        FetchOutcome::Failed {
            reason: format!("network error after {} attempts", max_attempts),
        }
    }
}

/// Decodes a page body as windows-1250, replacing malformed bytes
pub fn decode_legacy(bytes: &[u8]) -> String {
    let (text, _) = WINDOWS_1250.decode_without_bom_handling(bytes);
    text.into_owned()
}
