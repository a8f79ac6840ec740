//! Chromium-backed rendering fetch strategy using chromiumoxide.
//!
//! Every fetch gets a fresh page that is closed afterwards, so no state
//! leaks between URLs. When a page cannot even be opened, or the browser
//! never reports an HTTP status for the document, the fetch is delegated to
//! the plain HTTP fetcher instead.

use crate::config::BrowserConfig;
use crate::crawler::fetcher::{FetchResult, FetchStrategy, HttpFetcher, PageContent};
use crate::crawler::types::FetchMode;
use crate::url::is_skippable_reference;
use crate::RippleError;
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig as LaunchConfig};
use chromiumoxide::page::Page;
use futures::StreamExt;
use serde::Deserialize;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;

/// Environment variable naming a Chromium executable
pub const CHROMIUM_ENV_VAR: &str = "LINK_RIPPLE_CHROMIUM";

/// Executable names looked up on `PATH`, in order
const CHROMIUM_BINARIES: &[&str] = &[
    "chromium",
    "chromium-browser",
    "google-chrome",
    "google-chrome-stable",
    "chrome",
];

/// Collects every link element's `href` attribute as written and as resolved
const COLLECT_LINKS_SCRIPT: &str = r#"(() => {
    const links = [];
    document.querySelectorAll('a[href], link[href]').forEach(el => {
        const href = typeof el.href === 'string' ? el.href : '';
        links.push({ raw: el.getAttribute('href') || '', href: href });
    });
    return links;
})()"#;

/// Reads the main document's HTTP status from the Navigation Timing API
const RESPONSE_STATUS_SCRIPT: &str = r#"(() => {
    const entry = performance.getEntriesByType('navigation')[0];
    return entry && entry.responseStatus ? entry.responseStatus : 0;
})()"#;

/// A link element as the browser reports it
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
struct RenderedLink {
    /// The attribute value as written in the markup
    raw: String,
    /// The value after the browser resolved it against the document
    href: String,
}

/// Keeps the resolved `href` of links whose markup value is navigable
///
/// The browser resolves `#top` or an empty `href` into the page's own URL,
/// so skippable references must be recognised before resolution.
fn navigable_hrefs(links: Vec<RenderedLink>) -> Vec<String> {
    links
        .into_iter()
        .filter(|link| !link.href.is_empty() && !is_skippable_reference(link.raw.trim()))
        .map(|link| link.href)
        .collect()
}

/// Extra command-line flags for one browser launch attempt
#[derive(Debug, Clone, Copy)]
struct LaunchProfile {
    name: &'static str,
    args: &'static [&'static str],
}

/// Tried in order until one launches; sandboxing often fails in containers
const LAUNCH_PROFILES: &[LaunchProfile] = &[
    LaunchProfile {
        name: "default",
        args: &[],
    },
    LaunchProfile {
        name: "no-sandbox",
        args: &["--no-sandbox", "--disable-setuid-sandbox"],
    },
    LaunchProfile {
        name: "no-sandbox-no-shm",
        args: &[
            "--no-sandbox",
            "--disable-setuid-sandbox",
            "--disable-dev-shm-usage",
        ],
    },
];

/// Find the Chromium binary path.
///
/// Looks at the configured path, then `LINK_RIPPLE_CHROMIUM`, then `PATH`,
/// then the usual macOS application bundle.
pub fn find_chromium(configured: Option<&str>) -> Option<PathBuf> {
    if let Some(path) = configured {
        let path = PathBuf::from(path);
        if path.exists() {
            return Some(path);
        }
        tracing::warn!("Configured browser executable {} does not exist", path.display());
    }

    if let Ok(p) = std::env::var(CHROMIUM_ENV_VAR) {
        let path = PathBuf::from(&p);
        if path.exists() {
            return Some(path);
        }
    }

    for binary in CHROMIUM_BINARIES {
        if let Ok(path) = which::which(binary) {
            return Some(path);
        }
    }

    if cfg!(target_os = "macos") {
        let common = PathBuf::from("/Applications/Google Chrome.app/Contents/MacOS/Google Chrome");
        if common.exists() {
            return Some(common);
        }
    }

    None
}

/// Rendering fetch strategy
pub struct ChromiumFetcher {
    browser: RwLock<Option<Browser>>,
    handler: Mutex<Option<JoinHandle<()>>>,
    fallback: HttpFetcher,
    navigation_timeout: Duration,
    max_retries: u32,
    retry_delay: Duration,
}

impl ChromiumFetcher {
    /// Locates Chromium and launches it headless
    ///
    /// Each launch profile is tried in turn; the error of the last attempt
    /// is returned if none succeeds.
    ///
    /// # Arguments
    ///
    /// * `config` - Browser settings (executable, timeouts, retries)
    /// * `fallback` - Used for any fetch whose page cannot be opened
    pub async fn launch(config: &BrowserConfig, fallback: HttpFetcher) -> Result<Self, RippleError> {
        let executable = find_chromium(config.executable.as_deref()).ok_or_else(|| {
            RippleError::Browser(format!(
                "no Chromium executable found (set browser.executable or {})",
                CHROMIUM_ENV_VAR
            ))
        })?;

        let mut last_error = None;

        for profile in LAUNCH_PROFILES {
            match launch_with_profile(&executable, profile).await {
                Ok((browser, handler)) => {
                    tracing::info!(
                        "Launched headless browser {} ({} profile)",
                        executable.display(),
                        profile.name
                    );
                    return Ok(Self {
                        browser: RwLock::new(Some(browser)),
                        handler: Mutex::new(Some(handler)),
                        fallback,
                        navigation_timeout: Duration::from_millis(config.navigation_timeout_ms),
                        max_retries: config.max_retries.max(1),
                        retry_delay: Duration::from_millis(config.retry_delay_ms),
                    });
                }
                Err(e) => {
                    tracing::warn!("Failed to launch browser with {} profile: {}", profile.name, e);
                    last_error = Some(e);
                }
            }
        }

        Err(RippleError::Browser(format!(
            "all browser launch attempts failed: {}",
            last_error.unwrap_or_else(|| "no launch profiles".to_string())
        )))
    }

    async fn open_page(&self) -> Result<Page, String> {
        let guard = self.browser.read().await;
        let browser = guard
            .as_ref()
            .ok_or_else(|| "browser has been shut down".to_string())?;

        browser
            .new_page("about:blank")
            .await
            .map_err(|e| format!("failed to create page: {e}"))
    }

    /// One navigation attempt, bounded by the navigation timeout
    ///
    /// Completes on the page's load event. Links that scripts insert after
    /// load are not seen.
    ///
    /// Returns the document's HTTP status as reported by the browser, if any.
    async fn navigate(&self, page: &Page, url: &str) -> Result<Option<i64>, String> {
        let navigation = async {
            page.goto(url).await.map_err(|e| e.to_string())?;
            let request = page
                .wait_for_navigation_response()
                .await
                .map_err(|e| e.to_string())?;
            Ok::<Option<i64>, String>(
                request.and_then(|request| request.response.as_ref().map(|response| response.status)),
            )
        };

        match tokio::time::timeout(self.navigation_timeout, navigation).await {
            Ok(result) => result,
            Err(_) => Err(format!(
                "navigation timed out after {}ms",
                self.navigation_timeout.as_millis()
            )),
        }
    }
}

async fn launch_with_profile(
    executable: &Path,
    profile: &LaunchProfile,
) -> Result<(Browser, JoinHandle<()>), String> {
    let mut builder = LaunchConfig::builder().chrome_executable(executable);
    for arg in profile.args {
        builder = builder.arg(*arg);
    }
    let config = builder
        .build()
        .map_err(|e| format!("failed to build browser config: {e}"))?;

    let (browser, mut handler) = Browser::launch(config)
        .await
        .map_err(|e| format!("failed to launch Chromium: {e}"))?;

    // The CDP handler must be polled for the browser to make progress
    let handle = tokio::spawn(async move {
        while let Some(event) = handler.next().await {
            if let Err(e) = event {
                tracing::trace!("Browser handler event error: {}", e);
            }
        }
    });

    Ok((browser, handle))
}

/// Reads the document status from the Navigation Timing API
async fn timing_status(page: &Page) -> Option<f64> {
    match page.evaluate(RESPONSE_STATUS_SCRIPT).await {
        Ok(result) => result.into_value::<f64>().ok(),
        Err(e) => {
            tracing::debug!("Could not read response status: {}", e);
            None
        }
    }
}

/// Picks the first plausible HTTP status from the browser's two sources
///
/// `None` means the status is unknown; it is never guessed.
fn settle_status(navigation: Option<i64>, timing: Option<f64>) -> Option<u16> {
    let valid = |code: f64| (100.0..600.0).contains(&code);

    navigation
        .map(|code| code as f64)
        .filter(|code| valid(*code))
        .or_else(|| timing.filter(|code| valid(*code)))
        .map(|code| code as u16)
}

/// Runs `attempt` until it succeeds, at most `max_attempts` times
///
/// Sleeps `delay` between attempts but not after the last one.
async fn with_retries<T, F, Fut>(
    max_attempts: u32,
    delay: Duration,
    url: &str,
    mut attempt: F,
) -> Result<T, String>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, String>>,
{
    let max_attempts = max_attempts.max(1);
    let mut last_error = String::new();

    for n in 1..=max_attempts {
        match attempt(n).await {
            Ok(value) => return Ok(value),
            Err(e) => {
                tracing::warn!("Attempt {} failed for {}: {}", n, url, e);
                last_error = e;
                if n < max_attempts {
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }

    Err(format!(
        "navigation failed after {} attempts: {}",
        max_attempts, last_error
    ))
}

async fn collect_hrefs(page: &Page, url: &str) -> Vec<String> {
    match page.evaluate(COLLECT_LINKS_SCRIPT).await {
        Ok(result) => match result.into_value::<Vec<RenderedLink>>() {
            Ok(links) => navigable_hrefs(links),
            Err(e) => {
                tracing::warn!("Unexpected link list from {}: {:?}", url, e);
                Vec::new()
            }
        },
        Err(e) => {
            tracing::warn!("Error extracting links from {}: {}", url, e);
            Vec::new()
        }
    }
}

async fn close_page(page: Page, url: &str) {
    if let Err(e) = page.close().await {
        tracing::debug!("Failed to close page for {}: {}", url, e);
    }
}

#[async_trait]
impl FetchStrategy for ChromiumFetcher {
    fn mode(&self) -> FetchMode {
        FetchMode::Rendering
    }

    async fn fetch(&self, url: &str) -> FetchResult {
        let page = match self.open_page().await {
            Ok(page) => page,
            Err(e) => {
                tracing::warn!("Rendering unavailable for {} ({}), using plain HTTP", url, e);
                return self.fallback.fetch(url).await;
            }
        };

        let start = Instant::now();
        let fetcher = self;
        let page_ref = &page;

        let navigated = with_retries(self.max_retries, self.retry_delay, url, move |_| {
            fetcher.navigate(page_ref, url)
        })
        .await;
        let elapsed = start.elapsed();

        let navigation_status = match navigated {
            Ok(status) => status,
            Err(error) => {
                close_page(page, url).await;
                return FetchResult::Failure { error, elapsed };
            }
        };

        let status_code = settle_status(navigation_status, timing_status(&page).await);
        let hrefs = collect_hrefs(&page, url).await;
        let final_url = page
            .url()
            .await
            .ok()
            .flatten()
            .unwrap_or_else(|| url.to_string());

        close_page(page, url).await;

        match status_code {
            Some(status_code) => FetchResult::Success {
                final_url,
                status_code,
                elapsed,
                content: PageContent::Rendered(hrefs),
            },
            None => {
                tracing::warn!(
                    "Browser reported no HTTP status for {}, re-checking over plain HTTP",
                    url
                );
                self.fallback.fetch(url).await
            }
        }
    }

    async fn shutdown(&self) -> Result<(), RippleError> {
        let browser = self.browser.write().await.take();

        let result = match browser {
            Some(mut browser) => {
                let closed = browser
                    .close()
                    .await
                    .map(|_| ())
                    .map_err(|e| RippleError::Browser(format!("failed to close browser: {e}")));
                if let Err(e) = browser.wait().await {
                    tracing::debug!("Browser process did not exit cleanly: {}", e);
                }
                closed
            }
            None => Ok(()),
        };

        if let Some(handler) = self.handler.lock().await.take() {
            handler.abort();
        }

        tracing::info!("Headless browser shut down");
        result
    }
}
