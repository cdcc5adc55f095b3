//! Individual worker implementation
//!
//! A worker repeatedly takes the next item from the shared queue, executes it
//! and reports it complete. Cancellation is observed both while waiting for
//! work and while executing; an interrupted item is still reported complete
//! so the outstanding count stays balanced.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

use super::tasks::MirrorTasks;
use crate::app::queue::WorkQueue;

/// A single worker of the pool
#[derive(Debug)]
pub struct MirrorWorker {
    id: usize,
    queue: Arc<WorkQueue>,
    tasks: Arc<MirrorTasks>,
    cancel: CancellationToken,
}

impl MirrorWorker {
    pub fn new(
        id: usize,
        queue: Arc<WorkQueue>,
        tasks: Arc<MirrorTasks>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            id,
            queue,
            tasks,
            cancel,
        }
    }

    /// Main worker loop
    ///
    /// Returns the number of items this worker handled.
    pub async fn run(self) -> usize {
        debug!("Worker {} started", self.id);
        let mut handled = 0;

        loop {
            let item = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break,
                item = self.queue.next() => match item {
                    Some(item) => item,
                    None => break,
                },
            };

            let kind = item.kind();
            let execution = AssertUnwindSafe(self.tasks.execute(item)).catch_unwind();

            let cancelled = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => true,
                result = execution => {
                    if result.is_err() {
                        error!("Worker {} panicked while executing a {:?} task", self.id, kind);
                    }
                    false
                }
            };

            self.queue.complete(kind);
            handled += 1;

            if cancelled {
                debug!("Worker {} interrupted during a {:?} task", self.id, kind);
                break;
            }
        }

        debug!("Worker {} stopped after {} item(s)", self.id, handled);
        handled
    }
}
