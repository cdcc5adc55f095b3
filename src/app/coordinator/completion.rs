//! Run completion detection and monitoring
//!
//! The run is complete when the work queue has no outstanding items. Page
//! tasks submit their follow-on work before they complete, so an empty queue
//! cannot be observed while the listing is still being walked. While waiting,
//! the detector logs a status line every poll interval.

use std::future::pending;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::progress::ProgressTracker;
use crate::app::queue::WorkQueue;

/// Why the detector stopped waiting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionStatus {
    /// Every submitted item has completed
    Drained,
    /// The run token was cancelled
    Cancelled,
    /// The configured deadline passed first
    DeadlineExceeded,
}

/// Waits for the end of a mirror run
pub struct CompletionDetector {
    queue: Arc<WorkQueue>,
    tracker: Arc<ProgressTracker>,
    poll_interval: Duration,
    deadline: Option<Duration>,
}

impl CompletionDetector {
    pub fn new(
        queue: Arc<WorkQueue>,
        tracker: Arc<ProgressTracker>,
        poll_interval: Duration,
        deadline: Option<Duration>,
    ) -> Self {
        Self {
            queue,
            tracker,
            poll_interval,
            deadline,
        }
    }

    /// Wait until the queue drains, `cancel` fires, or the deadline passes
    ///
    /// Cancellation wins over a simultaneously drained queue: interrupted
    /// workers complete their items too, so draining after a cancel does not
    /// mean the work was done.
    pub async fn wait_for_completion(&self, cancel: &CancellationToken) -> CompletionStatus {
        debug!("Starting completion detection");

        let deadline = async {
            match self.deadline {
                Some(limit) => tokio::time::sleep(limit).await,
                None => pending::<()>().await,
            }
        };
        tokio::pin!(deadline);

        let mut ticker = tokio::time::interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately
        ticker.tick().await;

        let status = loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break CompletionStatus::Cancelled,
                _ = self.queue.wait_until_drained() => break CompletionStatus::Drained,
                _ = &mut deadline => break CompletionStatus::DeadlineExceeded,
                _ = ticker.tick() => info!("Waiting for completion: {}", self.summary()),
            }
        };

        debug!("Completion detection finished: {:?}", status);
        status
    }

    /// One-line view of progress and queue state
    pub fn summary(&self) -> String {
        let progress = self.tracker.snapshot();
        format!(
            "{}/{} assets processed ({:.1}%), {}",
            progress.processed,
            progress.discovered,
            progress.completion_percentage(),
            self.queue.stats().summary()
        )
    }
}
