use serde::Deserialize;

/// Main configuration structure for Steno-Harvest
///
/// Every section falls back to the archive's defaults, so an empty file (or
/// no file at all) describes a complete run against `www.psp.cz`.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub scan: ScanConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default = "default_expansion_rules")]
    pub expansion: Vec<ExpansionRule>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source: SourceConfig::default(),
            scan: ScanConfig::default(),
            http: HttpConfig::default(),
            output: OutputConfig::default(),
            expansion: default_expansion_rules(),
        }
    }
}

/// Where keys and documents are fetched from
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Index page whose anchors name the legislative bodies
    #[serde(rename = "index-url")]
    pub index_url: String,

    /// Prefix that document paths are appended to
    #[serde(rename = "base-url")]
    pub base_url: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            index_url: "https://www.psp.cz/eknih/index.htm".to_string(),
            base_url: "https://www.psp.cz/eknih".to_string(),
        }
    }
}

/// Termination thresholds for the session/part scan
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Bodies with this many characters or fewer are treated as missing
    #[serde(rename = "min-content-length")]
    pub min_content_length: usize,

    /// Consecutive part misses that end a session
    #[serde(rename = "max-consecutive-part-errors")]
    pub max_consecutive_part_errors: u32,

    /// Consecutive missing sessions that end a key
    #[serde(rename = "max-consecutive-session-errors")]
    pub max_consecutive_session_errors: u32,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            min_content_length: 1024,
            max_consecutive_part_errors: 3,
            max_consecutive_session_errors: 3,
        }
    }
}

/// HTTP client and retry behavior
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Per-request timeout (seconds)
    #[serde(rename = "request-timeout-secs")]
    pub request_timeout_secs: u64,

    /// Total attempts for a request that keeps failing at the network level
    #[serde(rename = "max-retries")]
    pub max_retries: u32,

    /// Base of the exponential backoff between attempts (milliseconds)
    #[serde(rename = "backoff-base-ms")]
    pub backoff_base_ms: u64,

    /// Pause after every request sequence (milliseconds)
    #[serde(rename = "request-delay-ms")]
    pub request_delay_ms: u64,

    /// User-Agent header sent with every request
    #[serde(rename = "user-agent")]
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: 60,
            max_retries: 5,
            backoff_base_ms: 1000,
            request_delay_ms: 500,
            user_agent: format!("steno-harvest/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Local store configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory the transcript pages are written to
    #[serde(rename = "download-dir")]
    pub download_dir: String,

    /// Files smaller than this are deleted before a run and re-fetched
    #[serde(rename = "min-file-size-bytes")]
    pub min_file_size_bytes: u64,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            download_dir: "downloads/schuze".to_string(),
            min_file_size_bytes: 1024,
        }
    }
}

/// Derives an extra key from every key ending in `suffix`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ExpansionRule {
    pub suffix: String,
    pub replacement: String,
}

impl ExpansionRule {
    pub fn new(suffix: &str, replacement: &str) -> Self {
        Self {
            suffix: suffix.to_string(),
            replacement: replacement.to_string(),
        }
    }
}

/// Chambers that live below the era key on the archive
pub fn default_expansion_rules() -> Vec<ExpansionRule> {
    vec![
        // joint sessions of the Chamber and the Senate
        ExpansionRule::new("ps", "ps/psse"),
        // Federal Assembly: House of the People, House of the Nations
        ExpansionRule::new("fs", "fs/slsn"),
        ExpansionRule::new("fs", "fs/sl"),
        ExpansionRule::new("fs", "fs/sn"),
        // First Republic: Chamber of Deputies, Senate
        ExpansionRule::new("ns", "ns/ps"),
        ExpansionRule::new("ns", "ns/se"),
    ]
}
