//! Mirror orchestration and progress coordination
//!
//! This module provides the control plane of a mirror run. The controller
//! prepares the destination, seeds the work queue with the first listing page,
//! starts the worker pool and waits until every discovered asset has been
//! processed, the run is stopped, or the deadline passes.
//!
//! # Architecture
//!
//! - [`config`] - Run configuration and failure policies
//! - [`control`] - Cancellation token plus abort reason
//! - [`progress`] - Discovered/processed counters shared by all workers
//! - [`completion`] - Completion detection and periodic status logging
//! - [`signals`] - Signal handling for graceful shutdown
//! - [`stats`] - Final session result
//!
//! # Examples
//!
//! ```rust,no_run
//! use nexus_mirror::app::{ClientConfig, CoordinatorConfig, MirrorController, NexusClient};
//! use nexus_mirror::app::models::RepositoryCoordinates;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Arc::new(NexusClient::new(&ClientConfig::default())?);
//! let coordinates = RepositoryCoordinates::parse("http://localhost:8081", "maven-releases")?;
//!
//! let controller = MirrorController::new(CoordinatorConfig::default().with_worker_count(4), client);
//! let result = controller.run(coordinates, None).await?;
//! println!("{}", result.summary());
//! # Ok(())
//! # }
//! ```

pub mod completion;
pub mod config;
pub mod control;
pub mod progress;
pub mod signals;
pub mod stats;

#[cfg(test)]
pub mod tests;

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tracing::{info, warn};

use crate::app::client::{CatalogClient, NexusClient};
use crate::app::destination::DestinationRoot;
use crate::app::downloader::AssetDownloader;
use crate::app::models::RepositoryCoordinates;
use crate::app::queue::WorkQueue;
use crate::app::worker::{MirrorTasks, WorkerPool};
use crate::errors::MirrorResult;

pub use completion::{CompletionDetector, CompletionStatus};
pub use config::{CoordinatorConfig, ListingFailurePolicy};
pub use control::RunControl;
pub use progress::ProgressTracker;
pub use signals::SignalHandler;
pub use stats::{RunOutcome, SessionResult};

/// Orchestrates one mirror run
///
/// A controller is consumed by [`MirrorController::run`]. Grab the
/// [`RunControl`] or subscribe to the [`ProgressTracker`] before starting it.
pub struct MirrorController {
    config: CoordinatorConfig,
    client: Arc<NexusClient>,
    control: RunControl,
    tracker: Arc<ProgressTracker>,
}

impl MirrorController {
    /// Create a new controller with the given configuration and shared client
    pub fn new(config: CoordinatorConfig, client: Arc<NexusClient>) -> Self {
        Self {
            config,
            client,
            control: RunControl::new(),
            tracker: Arc::new(ProgressTracker::new()),
        }
    }

    /// Handle for cancelling the run from outside
    pub fn control(&self) -> RunControl {
        self.control.clone()
    }

    /// Progress counters of the run
    pub fn tracker(&self) -> Arc<ProgressTracker> {
        self.tracker.clone()
    }

    /// Mirror every asset of a repository into `destination`
    ///
    /// A fresh temporary directory is used when `destination` is `None`.
    ///
    /// # Errors
    ///
    /// Fails before any request is made when the configuration is invalid or
    /// the destination is unusable. Once the run has started, failures are
    /// reported through [`SessionResult::outcome`] instead.
    pub async fn run(
        self,
        coordinates: RepositoryCoordinates,
        destination: Option<&Path>,
    ) -> MirrorResult<SessionResult> {
        let started_at = Utc::now();
        let session_start = Instant::now();

        self.config.validate()?;
        let destination = DestinationRoot::prepare(destination).await?;

        info!(
            "Mirroring repository {} from {} into {} with {} workers",
            coordinates.repository_id(),
            coordinates.base_url(),
            destination.path().display(),
            self.config.worker.worker_count
        );

        let queue = Arc::new(WorkQueue::new());
        let downloader = AssetDownloader::new(
            self.client.clone(),
            self.tracker.clone(),
            self.config.downloader.clone(),
        );
        let tasks = Arc::new(MirrorTasks::new(
            CatalogClient::new(self.client.clone(), coordinates),
            downloader,
            destination.clone(),
            queue.clone(),
            self.tracker.clone(),
            self.control.clone(),
            self.config.task_policy(),
        ));

        queue.submit_page(None)?;

        let mut pool = WorkerPool::new(
            self.config.worker.clone(),
            queue.clone(),
            tasks,
            self.control.token().child_token(),
        );
        pool.start()?;

        let detector = CompletionDetector::new(
            queue.clone(),
            self.tracker.clone(),
            self.config.poll_interval,
            self.config.deadline,
        );
        let status = detector.wait_for_completion(self.control.token()).await;

        if status == CompletionStatus::DeadlineExceeded {
            warn!(
                "Deadline of {:?} exceeded: {}",
                self.config.deadline.unwrap_or_default(),
                detector.summary()
            );
        }

        let mut shutdown_errors = Vec::new();
        if let Err(e) = pool.shutdown().await {
            warn!("Worker pool did not shut down cleanly: {}", e);
            shutdown_errors.push(e.to_string());
        }

        let outcome = match (self.control.abort_reason(), status) {
            (Some(reason), _) => RunOutcome::Aborted { reason },
            (None, CompletionStatus::Drained) => RunOutcome::Completed,
            (None, CompletionStatus::Cancelled) => RunOutcome::Cancelled,
            (None, CompletionStatus::DeadlineExceeded) => RunOutcome::DeadlineExceeded,
        };

        let result = SessionResult {
            outcome,
            counters: self.tracker.snapshot(),
            destination: destination.path().to_path_buf(),
            started_at,
            total_duration: session_start.elapsed(),
            shutdown_errors,
        };

        info!("{}", result.summary());
        Ok(result)
    }
}
