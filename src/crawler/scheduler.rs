//! Crawl scheduler
//!
//! Each discovered URL becomes one tokio task (a unit of work) that runs:
//!
//! 1. Depth gate: units beyond `max_depth` stop without side effects
//! 2. Claim: the visitation tracker refuses URLs seen earlier in the run
//! 3. Admission: one permit from the run's concurrency limiter
//! 4. Fetch: the permit is released as soon as the fetch returns
//! 5. Expand: links of successfully fetched pages spawn units at depth + 1
//! 6. Record: the outcome goes into the result aggregator
//!
//! The run finishes when the work group has drained, i.e. when every unit
//! spawned directly or transitively from the seed has terminated.

use crate::crawler::fetcher::{FetchResult, FetchStrategy};
use crate::crawler::join::WorkGroup;
use crate::crawler::limiter::ConcurrencyLimiter;
use crate::crawler::parser::extract_links;
use crate::crawler::results::ResultAggregator;
use crate::crawler::types::{CrawlReport, CrawlRequest, LinkOutcome};
use crate::crawler::visited::VisitationTracker;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::{Duration, Instant};
use url::Url;

/// One URL waiting to be processed
#[derive(Debug, Clone)]
struct UnitOfWork {
    url: String,
    parent_url: Option<String>,
    /// Depth the outcome will be recorded at (the seed is 0)
    depth: u32,
}

/// State of a single crawl run
///
/// Created per request and dropped when the run returns; nothing here
/// outlives the run except the shared fetch strategy.
pub struct CrawlRun {
    request: CrawlRequest,
    strategy: Arc<dyn FetchStrategy>,
    visited: VisitationTracker,
    limiter: ConcurrencyLimiter,
    results: ResultAggregator,
    work: Arc<WorkGroup>,
}

impl CrawlRun {
    /// Creates a run with its own tracker, limiter and aggregator
    pub fn new(
        request: CrawlRequest,
        strategy: Arc<dyn FetchStrategy>,
        max_concurrent_fetches: usize,
    ) -> Arc<Self> {
        Arc::new(Self {
            request,
            strategy,
            visited: VisitationTracker::new(),
            limiter: ConcurrencyLimiter::new(max_concurrent_fetches),
            results: ResultAggregator::new(),
            work: WorkGroup::new(),
        })
    }

    /// Crawls from the seed and waits for every unit of work to finish
    pub async fn execute(self: Arc<Self>) -> CrawlReport {
        let started = Instant::now();
        let seed = self.request.seed_url().to_string();

        tracing::info!(
            "Starting crawl of {} (max depth {}, {} concurrent fetches, {} mode)",
            seed,
            self.request.max_depth(),
            self.limiter.capacity(),
            self.strategy.mode()
        );

        Self::spawn_unit(
            &self,
            UnitOfWork {
                url: seed,
                parent_url: None,
                depth: 0,
            },
        );

        self.work.wait().await;

        let outcomes = self.results.snapshot();
        let elapsed = started.elapsed();
        let broken = outcomes.iter().filter(|o| !o.is_working).count();

        tracing::info!(
            "Crawl completed: {} links checked ({} broken) in {:?}, peak {} fetches in flight",
            outcomes.len(),
            broken,
            elapsed,
            self.limiter.peak_in_flight()
        );
        tracing::debug!("{} distinct URLs claimed", self.visited.len());

        CrawlReport {
            outcomes,
            mode: self.strategy.mode(),
            peak_in_flight: self.limiter.peak_in_flight(),
            elapsed,
        }
    }

    /// Spawns a unit of work as its own task, registered with the work group
    fn spawn_unit(run: &Arc<Self>, unit: UnitOfWork) {
        let token = run.work.enter();
        let run = Arc::clone(run);

        tokio::spawn(async move {
            let _token = token;
            run.process(unit).await;
        });
    }

    async fn process(self: Arc<Self>, unit: UnitOfWork) {
        let max_depth = self.request.max_depth();

        if unit.depth > max_depth {
            return;
        }

        if !self.visited.claim(&unit.url) {
            tracing::trace!("Already claimed: {}", unit.url);
            return;
        }

        let result = {
            let _slot = match self.limiter.acquire().await {
                Ok(slot) => slot,
                Err(e) => {
                    self.results.append(LinkOutcome::failure(
                        unit.url,
                        unit.parent_url,
                        unit.depth,
                        format!("fetch not admitted: {}", e),
                        Duration::ZERO,
                    ));
                    return;
                }
            };
            tracing::debug!(
                "Crawling URL: {} at depth {} ({} fetches in flight)",
                unit.url,
                unit.depth,
                self.limiter.in_flight()
            );
            self.strategy.fetch(&unit.url).await
        };

        let (outcome, links) = match result {
            FetchResult::Success {
                final_url,
                status_code,
                elapsed,
                content,
            } => {
                // Children would land at depth + 1, so only expand while that fits
                let links = if unit.depth < max_depth {
                    match base_for(&final_url, &unit.url) {
                        Some(base) => extract_links(&content, &base),
                        None => BTreeSet::new(),
                    }
                } else {
                    BTreeSet::new()
                };

                let outcome = LinkOutcome::response(
                    unit.url.clone(),
                    unit.parent_url.clone(),
                    unit.depth,
                    status_code,
                    elapsed,
                );
                (outcome, links)
            }
            FetchResult::Failure { error, elapsed } => {
                tracing::warn!("Fetch failed for {}: {}", unit.url, error);
                let outcome = LinkOutcome::failure(
                    unit.url.clone(),
                    unit.parent_url.clone(),
                    unit.depth,
                    error,
                    elapsed,
                );
                (outcome, BTreeSet::new())
            }
        };

        if !links.is_empty() {
            tracing::debug!("Found {} links in {}", links.len(), unit.url);
        }

        for link in links {
            tracing::trace!(
                "Found link: {} in page {} at depth {}",
                link,
                unit.url,
                unit.depth + 1
            );
            Self::spawn_unit(
                &self,
                UnitOfWork {
                    url: link,
                    parent_url: Some(unit.url.clone()),
                    depth: unit.depth + 1,
                },
            );
        }

        self.results.append(outcome);
    }
}

/// Picks the URL relative links on a page resolve against
fn base_for(final_url: &str, requested_url: &str) -> Option<Url> {
    Url::parse(final_url)
        .or_else(|_| Url::parse(requested_url))
        .ok()
}
