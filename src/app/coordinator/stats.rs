//! Final result of a mirror run

use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::app::models::ProgressCounters;

/// How a mirror run ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RunOutcome {
    /// The listing was walked and every discovered asset processed
    Completed,
    /// A failure policy stopped the run
    Aborted { reason: String },
    /// Interrupted from outside, e.g. by a signal
    Cancelled,
    /// The configured deadline passed before the run finished
    DeadlineExceeded,
}

impl RunOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, RunOutcome::Completed)
    }
}

/// Final result of a mirror session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionResult {
    pub outcome: RunOutcome,
    /// Counters at the moment the run ended
    pub counters: ProgressCounters,
    /// Directory the assets were written to
    pub destination: PathBuf,
    pub started_at: DateTime<Utc>,
    /// Time taken for the entire session
    pub total_duration: Duration,
    /// Problems encountered while stopping the worker pool
    pub shutdown_errors: Vec<String>,
}

impl SessionResult {
    /// True when the run completed and every asset was verified
    pub fn is_success(&self) -> bool {
        self.outcome.is_completed() && self.counters.abandoned == 0
    }

    /// True when the worker pool did not stop cleanly
    pub fn has_errors(&self) -> bool {
        !self.shutdown_errors.is_empty()
    }

    /// Get a summary of the session result
    pub fn summary(&self) -> String {
        let counts = format!(
            "{} of {} assets verified, {} abandoned, {} listing page(s) failed",
            self.counters.verified,
            self.counters.discovered,
            self.counters.abandoned,
            self.counters.pages_failed
        );

        match &self.outcome {
            RunOutcome::Completed if self.is_success() => format!(
                "Mirror completed in {:.1?}: {} into {}",
                self.total_duration,
                counts,
                self.destination.display()
            ),
            RunOutcome::Completed => format!(
                "Mirror completed with failures in {:.1?}: {} into {}",
                self.total_duration,
                counts,
                self.destination.display()
            ),
            RunOutcome::Aborted { reason } => {
                format!("Mirror aborted after {:.1?} ({}): {}", self.total_duration, reason, counts)
            }
            RunOutcome::Cancelled => {
                format!("Mirror cancelled after {:.1?}: {}", self.total_duration, counts)
            }
            RunOutcome::DeadlineExceeded => format!(
                "Mirror deadline exceeded after {:.1?}: {}",
                self.total_duration, counts
            ),
        }
    }
}
