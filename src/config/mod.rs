//! Configuration module for Link-Ripple
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! All keys have defaults, so running without a config file is the common case.
//!
//! # Example
//!
//! ```no_run
//! use link_ripple::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("link-ripple.toml")).unwrap();
//! println!("Concurrent fetches: {}", config.crawler.max_concurrent_fetches);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{BrowserConfig, Config, CrawlerConfig, HttpConfig, DEFAULT_USER_AGENT};

// Re-export parser functions
pub use parser::{load_config, load_config_with_hash, parse_config};
pub use validation::validate;
