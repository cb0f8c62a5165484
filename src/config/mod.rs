//! Configuration module for Steno-Harvest
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use steno_harvest::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("harvest.toml")).unwrap();
//! println!("Writing transcripts to: {}", config.output.download_dir);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    default_expansion_rules, Config, ExpansionRule, HttpConfig, OutputConfig, ScanConfig,
    SourceConfig,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::validate;
