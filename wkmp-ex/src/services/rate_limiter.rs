//! Request pacing for external services
//!
//! Two flavours:
//! - [`SpacedRateLimiter`]: minimum gap between call *starts*. Enough for a
//!   service with a single logical caller.
//! - [`FifoRateLimiter`]: one call at a time, served in submission order, with
//!   the gap measured from the *completion* of the previous call. Used for
//!   MusicBrainz, whose limit is the strictest, so variable response times
//!   never compress the spacing.
//!
//! Both are meant to be constructed once per process and shared via `Arc`.

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::{Mutex, MutexGuard};
use tokio::time::Instant;
use tracing::debug;

/// Start-spaced rate limiter
pub struct SpacedRateLimiter {
    name: &'static str,
    last_start: Mutex<Option<Instant>>,
    min_interval: Duration,
}

impl SpacedRateLimiter {
    pub fn new(name: &'static str, min_interval: Duration) -> Self {
        Self {
            name,
            last_start: Mutex::new(None),
            min_interval,
        }
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Wait if necessary to comply with rate limit
    async fn wait(&self) {
        let mut last = self.last_start.lock().await;

        if let Some(last_time) = *last {
            let elapsed = last_time.elapsed();
            if elapsed < self.min_interval {
                let wait_time = self.min_interval - elapsed;
                debug!(limiter = self.name, "Rate limiting: waiting {:?}", wait_time);
                tokio::time::sleep(wait_time).await;
            }
        }

        *last = Some(Instant::now());
    }

    /// Wait for the next slot, then run `operation`.
    ///
    /// The operation itself runs outside the limiter lock.
    pub async fn run<F, Fut, T>(&self, operation: F) -> T
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        self.wait().await;
        operation().await
    }
}

/// Completion-spaced FIFO rate limiter
///
/// Queueing relies on `tokio::sync::Mutex` being fair: waiters acquire the
/// lock in the order they asked for it. The lock is held for the whole
/// operation, so at most one operation is in flight.
pub struct FifoRateLimiter {
    name: &'static str,
    last_completed: Mutex<Option<Instant>>,
    min_interval: Duration,
    pending: AtomicUsize,
}

/// Stamps the completion time when dropped, whether the operation finished,
/// failed, panicked or was cancelled.
struct CompletionStamp<'a> {
    last_completed: MutexGuard<'a, Option<Instant>>,
}

impl Drop for CompletionStamp<'_> {
    fn drop(&mut self) {
        *self.last_completed = Some(Instant::now());
    }
}

/// Keeps the `pending` counter honest when a queued caller is cancelled.
struct PendingSlot<'a>(&'a AtomicUsize);

impl Drop for PendingSlot<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl FifoRateLimiter {
    pub fn new(name: &'static str, min_interval: Duration) -> Self {
        Self {
            name,
            last_completed: Mutex::new(None),
            min_interval,
            pending: AtomicUsize::new(0),
        }
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Operations submitted but not yet finished (including the running one)
    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }

    /// Queue `operation` behind all earlier submissions and run it once the
    /// previous operation completed at least `min_interval` ago.
    ///
    /// Whatever the operation returns (including `Err`) is handed back
    /// unchanged; the completion clock advances either way.
    pub async fn run<F, Fut, T>(&self, operation: F) -> T
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let depth = self.pending.fetch_add(1, Ordering::SeqCst);
        let _slot = PendingSlot(&self.pending);
        if depth > 0 {
            debug!(limiter = self.name, queued_ahead = depth, "Queued behind earlier requests");
        }

        let last = self.last_completed.lock().await;
        if let Some(last_time) = *last {
            let elapsed = last_time.elapsed();
            if elapsed < self.min_interval {
                let wait_time = self.min_interval - elapsed;
                debug!(limiter = self.name, "Rate limiting: waiting {:?}", wait_time);
                tokio::time::sleep(wait_time).await;
            }
        }

        let stamp = CompletionStamp {
            last_completed: last,
        };
        let output = operation().await;
        drop(stamp);
        output
    }
}
