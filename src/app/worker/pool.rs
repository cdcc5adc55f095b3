//! Worker pool management and coordination
//!
//! The pool owns the worker task handles. All workers share one queue, one
//! task executor and one cancellation token; cancelling the token is how the
//! pool tells them to stop.

use std::sync::Arc;

use futures::future::join_all;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::config::WorkerConfig;
use super::core::MirrorWorker;
use super::tasks::MirrorTasks;
use crate::app::queue::WorkQueue;
use crate::errors::{QueueError, QueueResult};

/// Pool of mirror workers
#[derive(Debug)]
pub struct WorkerPool {
    config: WorkerConfig,
    queue: Arc<WorkQueue>,
    tasks: Arc<MirrorTasks>,
    cancel: CancellationToken,
    worker_handles: Vec<JoinHandle<usize>>,
    state: PoolState,
}

/// Current state of the worker pool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolState {
    /// Pool has been created but not started
    Created,
    /// Pool is running with active workers
    Running,
    /// Pool is shutting down
    ShuttingDown,
    /// Pool has been shut down
    Shutdown,
}

impl WorkerPool {
    /// Create a new worker pool
    ///
    /// `cancel` stops the workers; pass a child of the run token so that
    /// cancelling the run stops the pool too.
    pub fn new(
        config: WorkerConfig,
        queue: Arc<WorkQueue>,
        tasks: Arc<MirrorTasks>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            config,
            queue,
            tasks,
            cancel,
            worker_handles: Vec::new(),
            state: PoolState::Created,
        }
    }

    /// Start all workers
    pub fn start(&mut self) -> QueueResult<()> {
        if self.state != PoolState::Created {
            return Err(QueueError::InvalidPoolState {
                state: format!("{:?}", self.state),
            });
        }

        info!("Starting {} workers", self.config.worker_count);

        for worker_id in 0..self.config.worker_count {
            let worker = MirrorWorker::new(
                worker_id,
                self.queue.clone(),
                self.tasks.clone(),
                self.cancel.clone(),
            );
            self.worker_handles
                .push(tokio::spawn(async move { worker.run().await }));
        }

        self.state = PoolState::Running;
        Ok(())
    }

    pub fn state(&self) -> PoolState {
        self.state
    }

    pub fn worker_count(&self) -> usize {
        self.worker_handles.len()
    }

    /// Stop all workers and wait for them
    ///
    /// Workers still running when the shutdown timeout expires are aborted.
    /// On success returns the total number of items the workers handled.
    pub async fn shutdown(mut self) -> QueueResult<usize> {
        if self.state == PoolState::Created {
            self.state = PoolState::Shutdown;
            return Ok(0);
        }

        self.state = PoolState::ShuttingDown;
        info!("Shutting down worker pool");
        self.cancel.cancel();

        let joined = tokio::time::timeout(
            self.config.shutdown_timeout,
            join_all(self.worker_handles.iter_mut()),
        )
        .await;

        let results = match joined {
            Ok(results) => results,
            Err(_) => {
                warn!(
                    "Workers did not stop within {:?}, aborting them",
                    self.config.shutdown_timeout
                );
                for handle in &self.worker_handles {
                    handle.abort();
                }
                self.state = PoolState::Shutdown;
                return Err(QueueError::ShutdownTimeout {
                    seconds: self.config.shutdown_timeout.as_secs(),
                });
            }
        };

        let mut handled = 0;
        let mut failed = 0;
        for (worker_id, result) in results.into_iter().enumerate() {
            match result {
                Ok(count) => handled += count,
                Err(e) => {
                    debug!("Worker {} terminated abnormally: {}", worker_id, e);
                    failed += 1;
                }
            }
        }

        if failed > 0 {
            warn!("{} workers terminated abnormally", failed);
        }

        // Late submissions now fail instead of sitting in the channel
        self.queue.close().await;

        self.state = PoolState::Shutdown;
        info!("Worker pool shutdown complete");
        Ok(handled)
    }
}
