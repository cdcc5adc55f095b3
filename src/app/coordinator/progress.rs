//! Progress tracking shared by all workers
//!
//! Counters are plain atomics: many workers increment them concurrently and
//! the controller only ever reads aggregate values. Every change that matters
//! to a user is followed by [`ProgressTracker::notify_progress`], which logs
//! the snapshot and publishes it to any subscribed display.

use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::watch;
use tracing::info;

use crate::app::models::ProgressCounters;

/// Atomic discovered/processed counters for one mirror run
#[derive(Debug)]
pub struct ProgressTracker {
    discovered: AtomicU64,
    processed: AtomicU64,
    verified: AtomicU64,
    abandoned: AtomicU64,
    pages_fetched: AtomicU64,
    pages_failed: AtomicU64,
    updates: watch::Sender<ProgressCounters>,
}

impl Default for ProgressTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressTracker {
    /// Create a tracker with all counters at zero
    pub fn new() -> Self {
        let (updates, _) = watch::channel(ProgressCounters::default());
        Self {
            discovered: AtomicU64::new(0),
            processed: AtomicU64::new(0),
            verified: AtomicU64::new(0),
            abandoned: AtomicU64::new(0),
            pages_fetched: AtomicU64::new(0),
            pages_failed: AtomicU64::new(0),
            updates,
        }
    }

    /// Add a batch of newly discovered assets
    pub fn record_discovered(&self, count: u64) {
        self.discovered.fetch_add(count, Ordering::SeqCst);
    }

    /// Count one asset as finished, whatever its outcome
    pub fn record_processed(&self) {
        self.processed.fetch_add(1, Ordering::SeqCst);
    }

    pub fn record_verified(&self) {
        self.verified.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_abandoned(&self) {
        self.abandoned.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_page_fetched(&self) {
        self.pages_fetched.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_page_failed(&self) {
        self.pages_failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Current counter values
    ///
    /// `processed` is read before `discovered`, and every asset is discovered
    /// before its download is submitted, so a snapshot never shows more
    /// processed than discovered assets.
    pub fn snapshot(&self) -> ProgressCounters {
        let processed = self.processed.load(Ordering::SeqCst);
        let discovered = self.discovered.load(Ordering::SeqCst);
        ProgressCounters {
            discovered,
            processed,
            verified: self.verified.load(Ordering::Relaxed),
            abandoned: self.abandoned.load(Ordering::Relaxed),
            pages_fetched: self.pages_fetched.load(Ordering::Relaxed),
            pages_failed: self.pages_failed.load(Ordering::Relaxed),
        }
    }

    /// Log the current snapshot and publish it to subscribers
    pub fn notify_progress(&self) {
        let snapshot = self.snapshot();
        info!(
            "Downloaded {} assets on {} found",
            snapshot.processed, snapshot.discovered
        );
        self.updates.send_replace(snapshot);
    }

    /// Receive a snapshot after every progress notification
    pub fn subscribe(&self) -> watch::Receiver<ProgressCounters> {
        self.updates.subscribe()
    }
}
