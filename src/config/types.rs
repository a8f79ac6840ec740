use serde::Deserialize;

/// User agent sent by the plain HTTP fetcher unless overridden
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Main configuration structure for Link-Ripple
///
/// Every section is optional; a missing file or section yields the defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub browser: BrowserConfig,
    #[serde(default)]
    pub http: HttpConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Maximum number of fetches in flight at once
    #[serde(rename = "max-concurrent-fetches", default = "default_max_concurrent")]
    pub max_concurrent_fetches: u32,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_concurrent_fetches: default_max_concurrent(),
        }
    }
}

/// Headless browser configuration
#[derive(Debug, Clone, Deserialize)]
pub struct BrowserConfig {
    /// Try to launch Chromium at all
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Explicit path to a Chromium/Chrome executable
    #[serde(default)]
    pub executable: Option<String>,

    /// Per-attempt navigation timeout (milliseconds)
    #[serde(rename = "navigation-timeout-ms", default = "default_navigation_timeout")]
    pub navigation_timeout_ms: u64,

    /// Navigation attempts before a page is reported as failed
    #[serde(rename = "max-retries", default = "default_max_retries")]
    pub max_retries: u32,

    /// Pause between navigation attempts (milliseconds)
    #[serde(rename = "retry-delay-ms", default = "default_retry_delay")]
    pub retry_delay_ms: u64,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            executable: None,
            navigation_timeout_ms: default_navigation_timeout(),
            max_retries: default_max_retries(),
            retry_delay_ms: default_retry_delay(),
        }
    }
}

/// Plain HTTP fetcher configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    /// Whole-request timeout (seconds)
    #[serde(rename = "timeout-secs", default = "default_http_timeout")]
    pub timeout_secs: u64,

    /// User-Agent header override
    #[serde(rename = "user-agent", default)]
    pub user_agent: Option<String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_http_timeout(),
            user_agent: None,
        }
    }
}

impl HttpConfig {
    /// The User-Agent header value to send
    pub fn user_agent(&self) -> &str {
        self.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT)
    }
}

fn default_true() -> bool {
    true
}

fn default_max_concurrent() -> u32 {
    5
}

fn default_navigation_timeout() -> u64 {
    60_000
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_delay() -> u64 {
    2_000
}

fn default_http_timeout() -> u64 {
    30
}
