//! Crawl engine
//!
//! The engine owns the fetch strategy (and therefore the browser process,
//! if one was launched) for the lifetime of the process. Each call to
//! [`CrawlEngine::check_links`] builds a fresh [`CrawlRun`] around it.

use crate::config::Config;
use crate::crawler::fetcher::{FetchStrategy, HttpFetcher};
use crate::crawler::renderer::ChromiumFetcher;
use crate::crawler::scheduler::CrawlRun;
use crate::crawler::types::{CrawlOptions, CrawlReport, CrawlRequest, FetchMode, LinkOutcome};
use crate::RippleError;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Long-lived link checking engine
pub struct CrawlEngine {
    strategy: Arc<dyn FetchStrategy>,
    options: CrawlOptions,
    closed: AtomicBool,
}

impl CrawlEngine {
    /// Creates an engine, preferring headless Chromium
    ///
    /// If the browser is disabled, cannot be found or fails every launch
    /// profile, the engine degrades to plain HTTP fetches instead of failing.
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlEngine)` - A usable engine (check [`CrawlEngine::mode`])
    /// * `Err(RippleError)` - Not even the HTTP client could be built
    ///
    /// # Example
    ///
    /// ```no_run
    /// use link_ripple::{Config, CrawlEngine};
    ///
    /// # async fn example() -> Result<(), link_ripple::RippleError> {
    /// let engine = CrawlEngine::new(&Config::default()).await?;
    /// let outcomes = engine.check_links("https://example.com/", 1).await?;
    /// println!("{} links checked", outcomes.len());
    /// engine.close().await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn new(config: &Config) -> Result<Self, RippleError> {
        let http = HttpFetcher::new(&config.http)?;

        let strategy: Arc<dyn FetchStrategy> = if !config.browser.enabled {
            tracing::info!("Browser rendering disabled; using plain HTTP fetches");
            Arc::new(http)
        } else {
            match ChromiumFetcher::launch(&config.browser, http.clone()).await {
                Ok(renderer) => Arc::new(renderer),
                Err(e) => {
                    tracing::warn!(
                        "Rendering backend unavailable ({}); falling back to plain HTTP fetches",
                        e
                    );
                    Arc::new(http)
                }
            }
        };

        Ok(Self::with_strategy(strategy, CrawlOptions::from(config)))
    }

    /// Creates an engine around an existing fetch strategy
    pub fn with_strategy(strategy: Arc<dyn FetchStrategy>, options: CrawlOptions) -> Self {
        Self {
            strategy,
            options,
            closed: AtomicBool::new(false),
        }
    }

    /// The fetch strategy this engine settled on
    pub fn mode(&self) -> FetchMode {
        self.strategy.mode()
    }

    pub fn options(&self) -> &CrawlOptions {
        &self.options
    }

    /// Runs a validated crawl request to completion
    pub async fn run(&self, request: CrawlRequest) -> CrawlReport {
        CrawlRun::new(
            request,
            Arc::clone(&self.strategy),
            self.options.max_concurrent_fetches,
        )
        .execute()
        .await
    }

    /// Checks every link reachable from `seed_url` within `max_depth` hops
    ///
    /// # Arguments
    ///
    /// * `seed_url` - Absolute `http`/`https` URL to start from
    /// * `max_depth` - Link hops to follow (0..=4)
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<LinkOutcome>)` - One outcome per fetched URL, unordered
    /// * `Err(RippleError::InvalidRequest)` - Rejected before any fetch
    pub async fn check_links(
        &self,
        seed_url: &str,
        max_depth: u32,
    ) -> Result<Vec<LinkOutcome>, RippleError> {
        let request = CrawlRequest::new(seed_url, max_depth)?;
        Ok(self.run(request).await.outcomes)
    }

    /// Releases the browser, if one was launched
    ///
    /// Only the first call does anything.
    pub async fn close(&self) -> Result<(), RippleError> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        self.strategy.shutdown().await
    }
}
