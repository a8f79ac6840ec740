//! Fetch strategies
//!
//! A fetch strategy visits one URL and reports its status code, how long it
//! took and whatever content the link extractor needs. Two implementations
//! exist: [`HttpFetcher`] (this module) and the Chromium-backed
//! [`ChromiumFetcher`](super::renderer::ChromiumFetcher). The engine picks one
//! when it is constructed and the scheduler only ever sees the trait.

use crate::config::HttpConfig;
use crate::crawler::types::FetchMode;
use crate::RippleError;
use async_trait::async_trait;
use reqwest::header::{
    HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CONNECTION, CONTENT_TYPE,
    UPGRADE_INSECURE_REQUESTS,
};
use reqwest::Client;
use std::time::{Duration, Instant};

/// Content handed to the link extractor after a fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageContent {
    /// Raw HTML body from a plain HTTP fetch
    Html(String),

    /// `href` values collected from a rendered page
    Rendered(Vec<String>),

    /// Nothing to extract from (non-HTML response, unreadable body)
    Empty,
}

/// Result of a fetch operation
#[derive(Debug)]
pub enum FetchResult {
    /// A response was received
    Success {
        /// URL after redirects; relative links resolve against it
        final_url: String,
        /// HTTP status code
        status_code: u16,
        /// Time until the response arrived
        elapsed: Duration,
        /// Content for link extraction
        content: PageContent,
    },

    /// No response could be obtained
    Failure {
        /// Error description
        error: String,
        /// Time spent before giving up
        elapsed: Duration,
    },
}

/// A way of visiting a URL
#[async_trait]
pub trait FetchStrategy: Send + Sync {
    /// Which kind of strategy this is
    fn mode(&self) -> FetchMode;

    /// Fetches one URL; failures are reported in the result, never raised
    async fn fetch(&self, url: &str) -> FetchResult;

    /// Releases any external resources held by the strategy
    async fn shutdown(&self) -> Result<(), RippleError> {
        Ok(())
    }
}

/// Builds an HTTP client that presents itself like a desktop browser
///
/// # Arguments
///
/// * `config` - The HTTP fetcher configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use link_ripple::config::HttpConfig;
/// use link_ripple::crawler::build_http_client;
///
/// let client = build_http_client(&HttpConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &HttpConfig) -> Result<Client, reqwest::Error> {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
        ),
    );
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));
    headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));
    headers.insert(UPGRADE_INSECURE_REQUESTS, HeaderValue::from_static("1"));

    let timeout = Duration::from_secs(config.timeout_secs);

    Client::builder()
        .user_agent(config.user_agent())
        .default_headers(headers)
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Plain HTTP fetch strategy: one GET per URL, no retries
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Creates a fetcher with a browser-like client
    pub fn new(config: &HttpConfig) -> Result<Self, RippleError> {
        Ok(Self {
            client: build_http_client(config)?,
        })
    }
}

#[async_trait]
impl FetchStrategy for HttpFetcher {
    fn mode(&self) -> FetchMode {
        FetchMode::Http
    }

    async fn fetch(&self, url: &str) -> FetchResult {
        let start = Instant::now();

        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(e) => {
                return FetchResult::Failure {
                    error: describe_request_error(&e),
                    elapsed: start.elapsed(),
                }
            }
        };

        let elapsed = start.elapsed();
        let status_code = response.status().as_u16();
        let final_url = response.url().to_string();

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        // Only HTML is worth reading; everything else still gets a status
        let content = if is_html_content_type(&content_type) {
            match response.text().await {
                Ok(body) => PageContent::Html(body),
                Err(e) => {
                    tracing::warn!("Failed to read body of {}: {}", url, e);
                    PageContent::Empty
                }
            }
        } else {
            tracing::trace!("Skipping link extraction for {} ({})", url, content_type);
            PageContent::Empty
        };

        FetchResult::Success {
            final_url,
            status_code,
            elapsed,
            content,
        }
    }
}

/// Returns true if a Content-Type header value denotes an HTML document
pub fn is_html_content_type(content_type: &str) -> bool {
    let lowered = content_type.to_ascii_lowercase();
    lowered.contains("text/html") || lowered.contains("application/xhtml+xml")
}

/// Turns a reqwest error into a short, stable description
fn describe_request_error(error: &reqwest::Error) -> String {
    if error.is_timeout() {
        "Request timeout".to_string()
    } else if error.is_connect() {
        format!("Connection failed: {}", error)
    } else if error.is_redirect() {
        format!("Redirect error: {}", error)
    } else {
        error.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_http_client() {
        assert!(build_http_client(&HttpConfig::default()).is_ok());
    }

    #[test]
    fn test_build_http_client_with_custom_agent() {
        let config = HttpConfig {
            timeout_secs: 5,
            user_agent: Some("LinkRippleTest/1.0".to_string()),
        };
        assert!(HttpFetcher::new(&config).is_ok());
    }

    #[test]
    fn test_html_content_type_detection() {
        assert!(is_html_content_type("text/html"));
        assert!(is_html_content_type("text/html; charset=utf-8"));
        assert!(is_html_content_type("Text/HTML"));
        assert!(is_html_content_type("application/xhtml+xml"));

        assert!(!is_html_content_type(""));
        assert!(!is_html_content_type("application/json"));
        assert!(!is_html_content_type("image/png"));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_a_failure() {
        let config = HttpConfig {
            timeout_secs: 2,
            user_agent: None,
        };
        let fetcher = HttpFetcher::new(&config).unwrap();

        // Port 9 on localhost is the discard service and is essentially never open
        match fetcher.fetch("http://127.0.0.1:9/").await {
            FetchResult::Failure { error, .. } => assert!(!error.is_empty()),
            other => panic!("expected failure, got {:?}", other),
        }
    }

    // Response handling is covered against wiremock in the integration suite
}
