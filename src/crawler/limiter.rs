//! Global fetch admission
//!
//! A fixed pool of permits bounds how many fetches are in flight at once,
//! however wide the link graph fans out. Permits are RAII guards, so every
//! exit path of a fetch (success, failure, panic) hands its slot back.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{AcquireError, OwnedSemaphorePermit, Semaphore};

/// Counting limiter that also records how busy it got
#[derive(Debug)]
pub struct ConcurrencyLimiter {
    semaphore: Arc<Semaphore>,
    capacity: usize,
    in_flight: Arc<AtomicUsize>,
    peak: Arc<AtomicUsize>,
}

/// One admitted fetch; dropping it frees the slot
#[derive(Debug)]
pub struct FetchSlot {
    in_flight: Arc<AtomicUsize>,
    _permit: OwnedSemaphorePermit,
}

impl ConcurrencyLimiter {
    /// Creates a limiter with `capacity` permits (at least one)
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            semaphore: Arc::new(Semaphore::new(capacity)),
            capacity,
            in_flight: Arc::new(AtomicUsize::new(0)),
            peak: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Waits for a free slot
    ///
    /// Only fails if the underlying semaphore was closed.
    pub async fn acquire(&self) -> Result<FetchSlot, AcquireError> {
        let permit = Arc::clone(&self.semaphore).acquire_owned().await?;

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);

        Ok(FetchSlot {
            in_flight: Arc::clone(&self.in_flight),
            _permit: permit,
        })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Slots currently held
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Highest number of slots ever held at the same time
    pub fn peak_in_flight(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

impl Drop for FetchSlot {
    fn drop(&mut self) {
        // Runs before the permit field is dropped, so the counter never
        // exceeds the number of permits handed out
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}
