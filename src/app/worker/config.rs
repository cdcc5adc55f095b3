//! Worker pool configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{coordinator, workers};
use crate::errors::{ConfigError, ConfigResult};

/// Configuration for the worker pool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Number of concurrent workers to spawn
    pub worker_count: usize,
    /// Maximum time to wait for workers to stop before aborting them
    pub shutdown_timeout: Duration,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            worker_count: workers::DEFAULT_WORKER_COUNT,
            shutdown_timeout: coordinator::SHUTDOWN_TIMEOUT,
        }
    }
}

impl WorkerConfig {
    /// Validate configuration values and return errors for invalid settings
    pub fn validate(&self) -> ConfigResult<()> {
        if self.worker_count == 0 || self.worker_count > workers::MAX_WORKER_COUNT {
            return Err(ConfigError::InvalidValue {
                field: "mirror.worker_count".to_string(),
                value: self.worker_count.to_string(),
                reason: format!("Must be between 1 and {}", workers::MAX_WORKER_COUNT),
            });
        }

        if self.shutdown_timeout.is_zero() {
            return Err(ConfigError::InvalidValue {
                field: "mirror.shutdown_timeout".to_string(),
                value: "0s".to_string(),
                reason: "Shutdown timeout cannot be zero".to_string(),
            });
        }

        Ok(())
    }
}
