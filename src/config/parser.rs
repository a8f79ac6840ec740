//! Reading `link-ripple.toml`
//!
//! The file is read once. Its text is both parsed and fingerprinted, so the
//! hash logged at startup always describes the settings actually in use.

use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Loads and validates a configuration file
///
/// ```no_run
/// use std::path::Path;
/// use link_ripple::config::load_config;
///
/// let config = load_config(Path::new("link-ripple.toml")).unwrap();
/// println!("Retries: {}", config.browser.max_retries);
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    load_config_with_hash(path).map(|(config, _)| config)
}

/// Loads a configuration along with the hex SHA-256 of the file's text
pub fn load_config_with_hash(path: &Path) -> Result<(Config, String), ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config = parse_config(&content)?;
    Ok((config, content_hash(&content)))
}

/// Parses and validates configuration text
///
/// Missing sections and keys fall back to their defaults, so an empty
/// string yields `Config::default()`.
pub fn parse_config(content: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(content)?;
    validate(&config)?;
    Ok(config)
}

fn content_hash(content: &str) -> String {
    hex::encode(Sha256::digest(content.as_bytes()))
}
