//! Run-scoped join counter
//!
//! Every unit of work holds a [`WorkToken`] for its whole lifetime. A parent
//! enters the group for each child before its own token is dropped, so the
//! count only reaches zero once the last transitively spawned unit is done.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

/// Counted barrier over the outstanding units of one crawl run
#[derive(Debug, Default)]
pub struct WorkGroup {
    outstanding: AtomicUsize,
    idle: Notify,
}

/// Membership of one unit of work in a [`WorkGroup`]
#[derive(Debug)]
pub struct WorkToken {
    group: Arc<WorkGroup>,
}

impl WorkGroup {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Registers one more outstanding unit
    pub fn enter(self: &Arc<Self>) -> WorkToken {
        self.outstanding.fetch_add(1, Ordering::SeqCst);
        WorkToken {
            group: Arc::clone(self),
        }
    }

    /// Units that have entered but not yet finished
    pub fn outstanding(&self) -> usize {
        self.outstanding.load(Ordering::SeqCst)
    }

    /// Waits until no unit is outstanding
    pub async fn wait(&self) {
        loop {
            let notified = self.idle.notified();
            tokio::pin!(notified);
            // Register interest before reading the count so a release that
            // lands in between is not missed
            notified.as_mut().enable();

            if self.outstanding() == 0 {
                return;
            }

            notified.await;
        }
    }
}

impl Drop for WorkToken {
    fn drop(&mut self) {
        if self.group.outstanding.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.group.idle.notify_waiters();
        }
    }
}
