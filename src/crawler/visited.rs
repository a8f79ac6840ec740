//! Per-run visitation tracking
//!
//! The tracker is the crawler's only de-duplication point: whichever unit of
//! work claims a URL first fetches it, every later claim is refused.

use dashmap::DashSet;

/// Concurrency-safe set of URLs claimed during one crawl run
#[derive(Debug, Default)]
pub struct VisitationTracker {
    claimed: DashSet<String>,
}

impl VisitationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims a URL for fetching
    ///
    /// Returns true exactly once per distinct URL string, no matter how many
    /// tasks race on it. URLs are compared verbatim.
    pub fn claim(&self, url: &str) -> bool {
        if self.claimed.contains(url) {
            return false;
        }
        self.claimed.insert(url.to_string())
    }

    /// Number of URLs claimed so far
    pub(crate) fn len(&self) -> usize {
        self.claimed.len()
    }
}
