//! Classification of individual probes

use std::fmt;

/// What happened to one `(key, session, part)` during a part scan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PartOutcome {
    /// Filename already in the local store; no request issued
    AlreadyStored,
    /// Body persisted to the local store
    Downloaded { chars: usize },
    /// Body was good but could not be written; retried on the next run
    StoreFailed,
    /// Timeout, connection error, or non-404 HTTP error after retries
    NetworkFailure,
    /// HTTP 404
    NotFound,
    /// HTTP 200 with a body too short to be a transcript (soft-404)
    TooSmall { chars: usize },
    /// Any other success status
    UnexpectedStatus(u16),
}

impl PartOutcome {
    /// Returns true if this outcome extends the run of consecutive misses
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            Self::NetworkFailure | Self::NotFound | Self::TooSmall { .. } | Self::UnexpectedStatus(_)
        )
    }
}

impl fmt::Display for PartOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyStored => write!(f, "already stored"),
            Self::Downloaded { chars } => write!(f, "downloaded ({} chars)", chars),
            Self::StoreFailed => write!(f, "store failed"),
            Self::NetworkFailure => write!(f, "network failure"),
            Self::NotFound => write!(f, "not found"),
            Self::TooSmall { chars } => write!(f, "too small ({} chars)", chars),
            Self::UnexpectedStatus(status) => write!(f, "unexpected status {}", status),
        }
    }
}

/// Result of probing part 1 of the next session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionProbe {
    /// Part 1 is already in the local store; no request issued
    AlreadyStored,
    /// Part 1 answered with content or a status other than 404/200-small
    Exists { status: u16 },
    /// HTTP 404
    Missing,
    /// HTTP 200 with a body too short to be a transcript
    TooSmall { chars: usize },
    /// The request failed outright, so existence is unknown. The scan
    /// continues without touching the session counter.
    Inconclusive,
}

impl fmt::Display for SessionProbe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyStored => write!(f, "already stored"),
            Self::Exists { status } => write!(f, "exists (status {})", status),
            Self::Missing => write!(f, "not found"),
            Self::TooSmall { chars } => write!(f, "too small ({} chars)", chars),
            Self::Inconclusive => write!(f, "inconclusive"),
        }
    }
}
