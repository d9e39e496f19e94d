use crate::config::types::{Config, CrawlOptions, RetryConfig, SessionConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_session_config(&config.session)?;
    validate_crawl_options(&config.crawl)?;
    validate_retry_config(&config.retry)?;
    Ok(())
}

/// Validates transport configuration
fn validate_session_config(config: &SessionConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base-url: {}", e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "base-url '{}' must use HTTP or HTTPS",
            config.base_url
        )));
    }

    validate_page_path("statement-page", &config.statement_page)?;
    validate_page_path("report-page", &config.report_page)?;

    if config.timeout_secs < 1 || config.timeout_secs > 600 {
        return Err(ConfigError::Validation(format!(
            "timeout-secs must be between 1 and 600, got {}",
            config.timeout_secs
        )));
    }

    for cookie in &config.cookies {
        if !cookie.contains('=') {
            return Err(ConfigError::Validation(format!(
                "Cookie '{}' must have the form name=value",
                cookie
            )));
        }
    }

    Ok(())
}

/// Validates a page path relative to the base URL
fn validate_page_path(key: &str, path: &str) -> Result<(), ConfigError> {
    if path.trim().is_empty() {
        return Err(ConfigError::Validation(format!("{} cannot be empty", key)));
    }

    if path.contains("://") {
        return Err(ConfigError::Validation(format!(
            "{} must be relative to base-url, got '{}'",
            key, path
        )));
    }

    Ok(())
}

/// Validates crawl options
fn validate_crawl_options(options: &CrawlOptions) -> Result<(), ConfigError> {
    if options.downloaded_folder.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "downloaded-folder cannot be empty".to_string(),
        ));
    }
    Ok(())
}

/// Validates retry configuration
fn validate_retry_config(config: &RetryConfig) -> Result<(), ConfigError> {
    if config.attempts < 1 {
        return Err(ConfigError::Validation(format!(
            "retry attempts must be >= 1, got {}",
            config.attempts
        )));
    }

    if config.delay_ms > 60_000 {
        return Err(ConfigError::Validation(format!(
            "retry delay-ms must be <= 60000, got {}",
            config.delay_ms
        )));
    }

    Ok(())
}
