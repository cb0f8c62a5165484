//! State module for tracking scan progress
//!
//! # Components
//!
//! - `ScanState`: whether a session or part loop is still running
//! - `FailureCounter`: consecutive-miss counter that drives termination
//! - `PartOutcome` / `SessionProbe`: how a single probe was classified

mod outcome;
mod scan_state;

// Re-export main types
pub use outcome::{PartOutcome, SessionProbe};
pub use scan_state::{FailureCounter, ScanState};
