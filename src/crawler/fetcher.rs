//! HTTP fetcher implementation
//!
//! This module handles the raw HTTP side of the crawler:
//! - Building the HTTP client with timeout and user agent
//! - The `DocumentStore` seam the crawl driver issues requests through
//! - Error classification into retryable and terminal transport failures

use crate::config::HttpConfig;
use reqwest::Client;
use std::fmt;
use std::future::Future;
use std::time::Duration;

/// Status and raw body of one HTTP response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    /// HTTP status code
    pub status: u16,
    /// Undecoded body bytes
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// A request that produced no HTTP response
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The request or body read timed out
    Timeout(String),
    /// The connection could not be established
    Connect(String),
    /// Anything else (bad URL, protocol error, decode failure)
    Other(String),
}

impl TransportError {
    /// Timeouts and connection errors are worth another attempt
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout(_) | Self::Connect(_))
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout(e) => write!(f, "timeout: {}", e),
            Self::Connect(e) => write!(f, "connection error: {}", e),
            Self::Other(e) => write!(f, "request error: {}", e),
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout(e.to_string())
        } else if e.is_connect() {
            Self::Connect(e.to_string())
        } else {
            Self::Other(e.to_string())
        }
    }
}

/// Remote store that transcript pages are fetched from
///
/// One call is one HTTP GET; retries and classification live above this.
pub trait DocumentStore {
    fn get(&self, url: &str) -> impl Future<Output = Result<RawResponse, TransportError>> + Send;
}

/// `DocumentStore` backed by a reqwest client
#[derive(Debug, Clone)]
pub struct HttpDocumentStore {
    client: Client,
}

impl HttpDocumentStore {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl DocumentStore for HttpDocumentStore {
    async fn get(&self, url: &str) -> Result<RawResponse, TransportError> {
        let response = self.client.get(url).send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?;
        Ok(RawResponse::new(status, body.to_vec()))
    }
}

/// Builds an HTTP client with proper configuration
///
/// # Example
///
/// ```no_run
/// use steno_harvest::config::HttpConfig;
/// use steno_harvest::crawler::build_http_client;
///
/// let client = build_http_client(&HttpConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &HttpConfig) -> Result<Client, reqwest::Error> {
    let timeout = Duration::from_secs(config.request_timeout_secs);

    Client::builder()
        .user_agent(config.user_agent.clone())
        .timeout(timeout)
        .connect_timeout(timeout)
        .gzip(true)
        .brotli(true)
        .build()
}
