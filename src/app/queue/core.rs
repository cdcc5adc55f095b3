//! Core work queue implementation
//!
//! Items travel through an unbounded channel; the receiving end is shared by
//! all workers behind an async mutex so each item is handed to exactly one of
//! them. Next to the channel the queue keeps an outstanding counter that is
//! raised before an item is sent and lowered only after the worker reports the
//! item complete, which happens after any follow-on work has been submitted.
//! Zero outstanding items therefore means the whole run is finished.

use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::{mpsc, Mutex, Notify};
use tracing::{debug, trace};

use crate::app::models::AssetRecord;
use crate::errors::{QueueError, QueueResult};

use super::types::{QueueStats, WorkItem, WorkKind};

/// Multi-consumer work queue with a completion barrier
#[derive(Debug)]
pub struct WorkQueue {
    sender: mpsc::UnboundedSender<WorkItem>,
    receiver: Mutex<mpsc::UnboundedReceiver<WorkItem>>,
    outstanding: AtomicU64,
    pages_submitted: AtomicU64,
    pages_completed: AtomicU64,
    downloads_submitted: AtomicU64,
    downloads_completed: AtomicU64,
    drained: Notify,
}

impl Default for WorkQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkQueue {
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self {
            sender,
            receiver: Mutex::new(receiver),
            outstanding: AtomicU64::new(0),
            pages_submitted: AtomicU64::new(0),
            pages_completed: AtomicU64::new(0),
            downloads_submitted: AtomicU64::new(0),
            downloads_completed: AtomicU64::new(0),
            drained: Notify::new(),
        }
    }

    /// Enqueue a work item
    ///
    /// The item counts as outstanding from this call until
    /// [`WorkQueue::complete`] is called for it.
    ///
    /// # Errors
    ///
    /// Returns `QueueError::QueueClosed` once the queue has been closed
    pub fn submit(&self, item: WorkItem) -> QueueResult<()> {
        let kind = item.kind();
        self.outstanding.fetch_add(1, Ordering::SeqCst);
        self.submitted_counter(kind).fetch_add(1, Ordering::Relaxed);

        if self.sender.send(item).is_err() {
            // Never handed to a worker, so nobody else will complete it
            self.complete(kind);
            return Err(QueueError::QueueClosed);
        }

        trace!("Submitted {:?} task", kind);
        Ok(())
    }

    /// Enqueue a page fetch
    pub fn submit_page(&self, continuation_token: Option<String>) -> QueueResult<()> {
        self.submit(WorkItem::FetchPage { continuation_token })
    }

    /// Enqueue an asset download
    pub fn submit_download(&self, asset: AssetRecord) -> QueueResult<()> {
        self.submit(WorkItem::Download(asset))
    }

    /// Wait for the next item
    ///
    /// Returns `None` once the queue is closed and empty.
    pub async fn next(&self) -> Option<WorkItem> {
        self.receiver.lock().await.recv().await
    }

    /// Take an item without waiting
    ///
    /// Returns `None` when the channel is empty, and also when another
    /// consumer is currently parked in [`WorkQueue::next`] holding the
    /// receiver. Workers use `next`; this is for single-consumer callers.
    pub fn try_next(&self) -> Option<WorkItem> {
        self.receiver.try_lock().ok()?.try_recv().ok()
    }

    /// Mark one item of `kind` as finished
    pub fn complete(&self, kind: WorkKind) {
        self.completed_counter(kind).fetch_add(1, Ordering::Relaxed);
        let previous = self.outstanding.fetch_sub(1, Ordering::SeqCst);
        debug_assert!(previous > 0, "completed more items than were submitted");

        if previous == 1 {
            debug!("Work queue drained");
            self.drained.notify_waiters();
        }
    }

    /// Number of submitted items not yet completed
    pub fn outstanding(&self) -> u64 {
        self.outstanding.load(Ordering::SeqCst)
    }

    pub fn is_drained(&self) -> bool {
        self.outstanding() == 0
    }

    /// Resolve once no item is outstanding
    ///
    /// Returns immediately on a queue that never received work, so callers
    /// submit the first item before waiting.
    pub async fn wait_until_drained(&self) {
        loop {
            // Registered before the check so a concurrent completion is not missed
            let notified = self.drained.notified();
            if self.is_drained() {
                return;
            }
            notified.await;
        }
    }

    /// Stop accepting work and wake any worker waiting in [`WorkQueue::next`]
    ///
    /// Items already in the channel can still be received.
    pub async fn close(&self) {
        self.receiver.lock().await.close();
    }

    pub fn stats(&self) -> QueueStats {
        QueueStats {
            pages_submitted: self.pages_submitted.load(Ordering::Relaxed),
            pages_completed: self.pages_completed.load(Ordering::Relaxed),
            downloads_submitted: self.downloads_submitted.load(Ordering::Relaxed),
            downloads_completed: self.downloads_completed.load(Ordering::Relaxed),
            outstanding: self.outstanding(),
        }
    }

    fn submitted_counter(&self, kind: WorkKind) -> &AtomicU64 {
        match kind {
            WorkKind::Page => &self.pages_submitted,
            WorkKind::Download => &self.downloads_submitted,
        }
    }

    fn completed_counter(&self, kind: WorkKind) -> &AtomicU64 {
        match kind {
            WorkKind::Page => &self.pages_completed,
            WorkKind::Download => &self.downloads_completed,
        }
    }
}
