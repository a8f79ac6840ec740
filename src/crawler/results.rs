//! Thread-safe accumulation of link outcomes

use crate::crawler::types::LinkOutcome;
use std::sync::{Mutex, PoisonError};

/// Append-only collection of the outcomes of one run
///
/// Order reflects completion order, which varies from run to run.
#[derive(Debug, Default)]
pub struct ResultAggregator {
    outcomes: Mutex<Vec<LinkOutcome>>,
}

impl ResultAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&self, outcome: LinkOutcome) {
        self.outcomes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(outcome);
    }

    /// Copies out everything recorded so far
    pub fn snapshot(&self) -> Vec<LinkOutcome> {
        self.outcomes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
