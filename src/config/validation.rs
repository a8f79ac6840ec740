use crate::config::types::{BrowserConfig, Config, CrawlerConfig, HttpConfig};
use crate::ConfigError;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_browser_config(&config.browser)?;
    validate_http_config(&config.http)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.max_concurrent_fetches < 1 || config.max_concurrent_fetches > 100 {
        return Err(ConfigError::Validation(format!(
            "max_concurrent_fetches must be between 1 and 100, got {}",
            config.max_concurrent_fetches
        )));
    }

    Ok(())
}

/// Validates browser configuration
fn validate_browser_config(config: &BrowserConfig) -> Result<(), ConfigError> {
    if config.navigation_timeout_ms < 1_000 {
        return Err(ConfigError::Validation(format!(
            "navigation_timeout_ms must be >= 1000ms, got {}ms",
            config.navigation_timeout_ms
        )));
    }

    if config.max_retries < 1 || config.max_retries > 10 {
        return Err(ConfigError::Validation(format!(
            "max_retries must be between 1 and 10, got {}",
            config.max_retries
        )));
    }

    if let Some(executable) = &config.executable {
        if executable.trim().is_empty() {
            return Err(ConfigError::Validation(
                "browser executable cannot be empty".to_string(),
            ));
        }
    }

    Ok(())
}

/// Validates HTTP fetcher configuration
fn validate_http_config(config: &HttpConfig) -> Result<(), ConfigError> {
    if config.timeout_secs < 1 || config.timeout_secs > 300 {
        return Err(ConfigError::Validation(format!(
            "timeout_secs must be between 1 and 300, got {}",
            config.timeout_secs
        )));
    }

    // Header values must be visible ASCII
    if let Some(agent) = &config.user_agent {
        if agent.is_empty() || !agent.chars().all(|c| (' '..='~').contains(&c)) {
            return Err(ConfigError::Validation(format!(
                "user_agent must be non-empty printable ASCII, got '{}'",
                agent
            )));
        }
    }

    Ok(())
}
