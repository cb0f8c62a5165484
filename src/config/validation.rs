use crate::config::types::{Config, ExpansionRule, HttpConfig, OutputConfig, ScanConfig, SourceConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_source_config(&config.source)?;
    validate_scan_config(&config.scan)?;
    validate_http_config(&config.http)?;
    validate_output_config(&config.output)?;
    validate_expansion_rules(&config.expansion)?;
    Ok(())
}

/// Validates the index and document URLs
fn validate_source_config(config: &SourceConfig) -> Result<(), ConfigError> {
    validate_http_url("index-url", &config.index_url)?;
    validate_http_url("base-url", &config.base_url)?;
    Ok(())
}

fn validate_http_url(field: &str, value: &str) -> Result<(), ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid {} '{}': {}", field, value, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "{} '{}' must use http or https",
            field, value
        )));
    }

    Ok(())
}

/// Validates scan thresholds
fn validate_scan_config(config: &ScanConfig) -> Result<(), ConfigError> {
    if config.max_consecutive_part_errors < 1 {
        return Err(ConfigError::Validation(format!(
            "max_consecutive_part_errors must be >= 1, got {}",
            config.max_consecutive_part_errors
        )));
    }

    if config.max_consecutive_session_errors < 1 {
        return Err(ConfigError::Validation(format!(
            "max_consecutive_session_errors must be >= 1, got {}",
            config.max_consecutive_session_errors
        )));
    }

    Ok(())
}

/// Validates HTTP behavior
fn validate_http_config(config: &HttpConfig) -> Result<(), ConfigError> {
    if config.request_timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "request_timeout_secs must be >= 1, got {}",
            config.request_timeout_secs
        )));
    }

    if config.max_retries < 1 {
        return Err(ConfigError::Validation(format!(
            "max_retries must be >= 1, got {}",
            config.max_retries
        )));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.download_dir.is_empty() {
        return Err(ConfigError::Validation(
            "download_dir cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates key expansion rules
fn validate_expansion_rules(rules: &[ExpansionRule]) -> Result<(), ConfigError> {
    for rule in rules {
        if rule.suffix.is_empty() || rule.replacement.is_empty() {
            return Err(ConfigError::Validation(format!(
                "Expansion rule '{}' -> '{}' must have a non-empty suffix and replacement",
                rule.suffix, rule.replacement
            )));
        }
    }
    Ok(())
}
