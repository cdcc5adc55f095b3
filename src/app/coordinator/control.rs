//! Run-wide cancellation with an optional abort reason

use std::sync::{Arc, Mutex};

use tokio_util::sync::CancellationToken;
use tracing::warn;

/// Handle used to stop a mirror run
///
/// Cloning shares the same state. A plain [`RunControl::cancel`] is an
/// external interruption; [`RunControl::abort`] also records why the run
/// could not finish. Only the first abort reason is kept.
#[derive(Debug, Clone, Default)]
pub struct RunControl {
    token: CancellationToken,
    abort_reason: Arc<Mutex<Option<String>>>,
}

impl RunControl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Token cancelled when the run stops for any reason
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// Interrupt the run without a failure reason
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Stop the run because something went wrong
    pub fn abort(&self, reason: impl Into<String>) {
        let reason = reason.into();
        {
            let mut slot = match self.abort_reason.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            if slot.is_none() {
                warn!("Aborting mirror run: {}", reason);
                *slot = Some(reason);
            }
        }
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Reason recorded by the first call to [`RunControl::abort`]
    pub fn abort_reason(&self) -> Option<String> {
        match self.abort_reason.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}
