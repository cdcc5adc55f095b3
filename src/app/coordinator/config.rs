//! Configuration structures for the mirror controller
//!
//! This module defines the options for one mirror run: worker pool settings,
//! per-asset retry behaviour, progress polling, the optional deadline and the
//! failure policies.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::app::downloader::DownloaderConfig;
use crate::app::worker::{TaskPolicy, WorkerConfig};
use crate::constants::coordinator;
use crate::errors::{ConfigError, ConfigResult};

/// What happens when a listing page cannot be fetched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListingFailurePolicy {
    /// Stop the whole run; the catalog cannot be walked past a failed page
    #[default]
    Abort,
    /// Log the failure and finish with whatever was discovered so far
    Skip,
}

/// Configuration for the mirror controller
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoordinatorConfig {
    /// Worker pool configuration
    pub worker: WorkerConfig,
    /// Per-asset download attempts
    pub downloader: DownloaderConfig,
    /// How often the controller logs a status line while waiting
    pub poll_interval: Duration,
    /// Give up on the run after this long
    pub deadline: Option<Duration>,
    pub listing_failure: ListingFailurePolicy,
    /// Keep going when an asset is abandoned
    pub continue_on_asset_failure: bool,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            worker: WorkerConfig::default(),
            downloader: DownloaderConfig::default(),
            poll_interval: coordinator::POLL_INTERVAL,
            deadline: None,
            listing_failure: ListingFailurePolicy::default(),
            continue_on_asset_failure: true,
        }
    }
}

impl CoordinatorConfig {
    /// Set the number of concurrent workers
    pub fn with_worker_count(mut self, count: usize) -> Self {
        self.worker.worker_count = count;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_deadline(mut self, deadline: Option<Duration>) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.worker.shutdown_timeout = timeout;
        self
    }

    pub fn with_listing_failure(mut self, policy: ListingFailurePolicy) -> Self {
        self.listing_failure = policy;
        self
    }

    pub fn with_continue_on_asset_failure(mut self, enabled: bool) -> Self {
        self.continue_on_asset_failure = enabled;
        self
    }

    /// Set attempts per asset and the pause between them
    pub fn with_download_attempts(mut self, max_attempts: u32, retry_delay: Duration) -> Self {
        self.downloader.max_attempts = max_attempts;
        self.downloader.retry_delay = retry_delay;
        self
    }

    /// Failure policies handed to the task executor
    pub fn task_policy(&self) -> TaskPolicy {
        TaskPolicy {
            listing_failure: self.listing_failure,
            continue_on_asset_failure: self.continue_on_asset_failure,
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> ConfigResult<()> {
        self.worker.validate()?;
        self.downloader.validate()?;

        if self.poll_interval.is_zero() {
            return Err(ConfigError::InvalidValue {
                field: "mirror.poll_interval".to_string(),
                value: "0s".to_string(),
                reason: "Poll interval cannot be zero".to_string(),
            });
        }

        if self.deadline.is_some_and(|d| d.is_zero()) {
            return Err(ConfigError::InvalidValue {
                field: "mirror.deadline".to_string(),
                value: "0s".to_string(),
                reason: "Deadline cannot be zero".to_string(),
            });
        }

        Ok(())
    }
}
