//! Crawler module: the concurrent link-checking engine
//!
//! This module contains the core crawling logic, including:
//! - Fetch strategies (headless Chromium with retries, plain HTTP)
//! - HTML and rendered-page link extraction
//! - Per-run de-duplication, admission control and joining
//! - The engine that ties a long-lived browser to short-lived runs

mod engine;
mod fetcher;
mod join;
mod limiter;
mod parser;
mod renderer;
mod results;
mod scheduler;
mod types;
mod visited;

pub use engine::CrawlEngine;
pub use fetcher::{
    build_http_client, is_html_content_type, FetchResult, FetchStrategy, HttpFetcher, PageContent,
};
pub use join::{WorkGroup, WorkToken};
pub use limiter::{ConcurrencyLimiter, FetchSlot};
pub use parser::{extract_links, extract_links_from_hrefs, extract_links_from_html};
pub use renderer::{find_chromium, ChromiumFetcher, CHROMIUM_ENV_VAR};
pub use results::ResultAggregator;
pub use scheduler::CrawlRun;
pub use types::{
    is_working_status, CrawlOptions, CrawlReport, CrawlRequest, FetchMode, LinkOutcome,
    MAX_CRAWL_DEPTH,
};
pub use visited::VisitationTracker;

use crate::config::Config;
use crate::RippleError;

/// Runs a complete crawl with a freshly constructed engine
///
/// This is the one-shot entry point: it builds an engine from `config`,
/// checks every link reachable from `seed_url`, and shuts the engine down
/// again. Long-running callers should keep a [`CrawlEngine`] instead so the
/// browser is launched only once.
///
/// # Returns
///
/// * `Ok(CrawlReport)` - The crawl completed (individual links may be broken)
/// * `Err(RippleError)` - The request was invalid or the engine could not be built
pub async fn crawl(config: &Config, seed_url: &str, max_depth: u32) -> Result<CrawlReport, RippleError> {
    let request = CrawlRequest::new(seed_url, max_depth)?;
    let engine = CrawlEngine::new(config).await?;

    let report = engine.run(request).await;

    if let Err(e) = engine.close().await {
        tracing::warn!("Failed to shut down crawl engine cleanly: {}", e);
    }

    Ok(report)
}
