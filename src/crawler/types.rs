//! Data types shared by the crawl engine and its callers

use crate::config::Config;
use crate::url::is_navigable;
use crate::RippleError;
use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use std::fmt;
use std::time::Duration;
use url::Url;

/// Deepest traversal a caller may request
pub const MAX_CRAWL_DEPTH: u32 = 4;

/// A validated crawl request
///
/// Only constructible through [`CrawlRequest::new`], so an engine never
/// starts work on a malformed seed or an out-of-range depth.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlRequest {
    seed_url: Url,
    max_depth: u32,
}

impl CrawlRequest {
    /// Validates a seed URL and depth
    ///
    /// # Arguments
    ///
    /// * `seed_url` - Absolute `http`/`https` URL to start from
    /// * `max_depth` - Link hops to follow from the seed (0 checks the seed only)
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlRequest)` - The request is crawlable
    /// * `Err(RippleError::InvalidRequest)` - The seed or depth was rejected
    pub fn new(seed_url: &str, max_depth: u32) -> Result<Self, RippleError> {
        let trimmed = seed_url.trim();
        if trimmed.is_empty() {
            return Err(RippleError::InvalidRequest(
                "seed URL cannot be empty".to_string(),
            ));
        }

        let url = Url::parse(trimmed).map_err(|e| {
            RippleError::InvalidRequest(format!("invalid seed URL '{}': {}", trimmed, e))
        })?;

        if !is_navigable(&url) {
            return Err(RippleError::InvalidRequest(format!(
                "seed URL must use http or https, got '{}'",
                url.scheme()
            )));
        }

        if url.host_str().is_none() {
            return Err(RippleError::InvalidRequest(format!(
                "seed URL '{}' has no host",
                trimmed
            )));
        }

        if max_depth > MAX_CRAWL_DEPTH {
            return Err(RippleError::InvalidRequest(format!(
                "depth must be between 0 and {}, got {}",
                MAX_CRAWL_DEPTH, max_depth
            )));
        }

        Ok(Self {
            seed_url: url,
            max_depth,
        })
    }

    pub fn seed_url(&self) -> &Url {
        &self.seed_url
    }

    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }
}

/// The result of checking one URL
///
/// Serializes to the shape consumed by report writers and API layers:
/// `error` is omitted on success and `parent_url` is omitted for the seed.
#[derive(Debug, Clone, Serialize)]
pub struct LinkOutcome {
    /// The URL that was fetched
    pub url: String,

    /// HTTP status code (0 if no response was received)
    pub status_code: u16,

    /// Failure description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Time from request start until the response (or failure)
    #[serde(serialize_with = "serialize_duration")]
    pub response_time: Duration,

    /// Link hops from the seed (the seed itself is 0)
    pub depth: u32,

    /// The page this URL was discovered on
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_url: Option<String>,

    /// True for 2xx and 3xx responses
    pub is_working: bool,

    /// When the check finished
    pub last_checked: DateTime<Utc>,
}

impl LinkOutcome {
    /// Builds the outcome for a URL that produced an HTTP response
    pub fn response(
        url: String,
        parent_url: Option<String>,
        depth: u32,
        status_code: u16,
        response_time: Duration,
    ) -> Self {
        Self {
            url,
            status_code,
            error: None,
            response_time,
            depth,
            parent_url,
            is_working: is_working_status(status_code),
            last_checked: Utc::now(),
        }
    }

    /// Builds the outcome for a URL that could not be fetched at all
    pub fn failure(
        url: String,
        parent_url: Option<String>,
        depth: u32,
        error: String,
        response_time: Duration,
    ) -> Self {
        Self {
            url,
            status_code: 0,
            error: Some(error),
            response_time,
            depth,
            parent_url,
            is_working: false,
            last_checked: Utc::now(),
        }
    }

    /// Returns true if this is the seed of its run
    pub fn is_seed(&self) -> bool {
        self.parent_url.is_none()
    }
}

/// Returns true for status codes that count as a live link
pub fn is_working_status(status_code: u16) -> bool {
    (200..400).contains(&status_code)
}

fn serialize_duration<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format!("{:?}", duration))
}

/// Which fetch strategy an engine settled on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchMode {
    /// Pages are rendered in headless Chromium
    Rendering,
    /// Pages are fetched with plain HTTP GET requests
    Http,
}

impl fmt::Display for FetchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rendering => write!(f, "rendering"),
            Self::Http => write!(f, "http"),
        }
    }
}

/// Engine-level tuning that applies to every run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrawlOptions {
    /// Size of the per-run fetch permit pool
    pub max_concurrent_fetches: usize,
}

impl Default for CrawlOptions {
    fn default() -> Self {
        Self {
            max_concurrent_fetches: 5,
        }
    }
}

impl From<&Config> for CrawlOptions {
    fn from(config: &Config) -> Self {
        Self {
            max_concurrent_fetches: config.crawler.max_concurrent_fetches as usize,
        }
    }
}

/// Everything a finished run produced
#[derive(Debug, Clone)]
pub struct CrawlReport {
    /// One outcome per fetched URL, in completion order
    pub outcomes: Vec<LinkOutcome>,

    /// Strategy used for the run
    pub mode: FetchMode,

    /// Highest number of fetches that were in flight simultaneously
    pub peak_in_flight: usize,

    /// Wall-clock duration of the whole run
    pub elapsed: Duration,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_request() {
        let request = CrawlRequest::new("https://example.com/docs", 2).unwrap();
        assert_eq!(request.seed_url().as_str(), "https://example.com/docs");
        assert_eq!(request.max_depth(), 2);
    }

    #[test]
    fn test_request_trims_seed() {
        let request = CrawlRequest::new("  http://a.test/  ", 0).unwrap();
        assert_eq!(request.seed_url().as_str(), "http://a.test/");
    }

    #[test]
    fn test_rejects_bad_seeds() {
        for seed in ["", "   ", "not a url", "/relative/path", "ftp://example.com/", "mailto:x@y.z"] {
            let result = CrawlRequest::new(seed, 1);
            assert!(
                matches!(result, Err(RippleError::InvalidRequest(_))),
                "seed {:?} should be rejected",
                seed
            );
        }
    }

    #[test]
    fn test_depth_bounds() {
        assert!(CrawlRequest::new("https://example.com/", 0).is_ok());
        assert!(CrawlRequest::new("https://example.com/", MAX_CRAWL_DEPTH).is_ok());
        assert!(matches!(
            CrawlRequest::new("https://example.com/", MAX_CRAWL_DEPTH + 1),
            Err(RippleError::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_working_status_range() {
        assert!(!is_working_status(0));
        assert!(!is_working_status(199));
        assert!(is_working_status(200));
        assert!(is_working_status(301));
        assert!(is_working_status(399));
        assert!(!is_working_status(404));
        assert!(!is_working_status(500));
    }

    #[test]
    fn test_seed_outcome_serialization_omits_empty_fields() {
        let outcome = LinkOutcome::response(
            "https://example.com/".to_string(),
            None,
            0,
            200,
            Duration::from_millis(150),
        );

        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["url"], "https://example.com/");
        assert_eq!(json["status_code"], 200);
        assert_eq!(json["response_time"], "150ms");
        assert_eq!(json["depth"], 0);
        assert_eq!(json["is_working"], true);
        assert!(json.get("error").is_none());
        assert!(json.get("parent_url").is_none());
        assert!(json.get("last_checked").is_some());
    }

    #[test]
    fn test_failure_outcome() {
        let outcome = LinkOutcome::failure(
            "https://gone.example.com/".to_string(),
            Some("https://example.com/".to_string()),
            1,
            "Connection failed".to_string(),
            Duration::from_secs(2),
        );

        assert_eq!(outcome.status_code, 0);
        assert!(!outcome.is_working);
        assert!(!outcome.is_seed());

        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["error"], "Connection failed");
        assert_eq!(json["parent_url"], "https://example.com/");
        assert_eq!(json["response_time"], "2s");
    }

    #[test]
    fn test_fetch_mode_display() {
        assert_eq!(FetchMode::Rendering.to_string(), "rendering");
        assert_eq!(FetchMode::Http.to_string(), "http");
    }
}
