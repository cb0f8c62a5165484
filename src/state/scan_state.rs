//! Consecutive-failure bookkeeping for the session and part scans
//!
//! Both scan loops are unbounded; the only thing that stops them is a run of
//! misses. Each loop owns one `FailureCounter` and asks it, after every
//! classified probe, whether it is still `Scanning`.

use std::fmt;

/// State of one scan loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScanState {
    /// Keep probing the next index
    Scanning,
    /// Consecutive-failure limit reached
    Terminated,
}

impl ScanState {
    /// Returns true if the loop should stop
    pub fn is_terminated(&self) -> bool {
        matches!(self, Self::Terminated)
    }
}

impl fmt::Display for ScanState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scanning => write!(f, "scanning"),
            Self::Terminated => write!(f, "terminated"),
        }
    }
}

/// Counts consecutive misses against a fixed limit
#[derive(Debug, Clone)]
pub struct FailureCounter {
    consecutive: u32,
    limit: u32,
}

impl FailureCounter {
    /// Creates a counter that terminates after `limit` consecutive failures
    pub fn new(limit: u32) -> Self {
        Self {
            consecutive: 0,
            limit,
        }
    }

    /// Records a miss and returns the resulting state
    pub fn record_failure(&mut self) -> ScanState {
        self.consecutive = self.consecutive.saturating_add(1);
        self.state()
    }

    /// Records a hit; the run of misses starts over
    pub fn reset(&mut self) {
        self.consecutive = 0;
    }

    /// Current state without changing the count
    pub fn state(&self) -> ScanState {
        if self.consecutive >= self.limit {
            ScanState::Terminated
        } else {
            ScanState::Scanning
        }
    }

    pub fn consecutive(&self) -> u32 {
        self.consecutive
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }
}
