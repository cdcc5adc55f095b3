//! Signal handling for graceful shutdown
//!
//! CTRL-C and SIGTERM cancel the run. Workers notice the cancelled token,
//! abandon their current task and the controller reports the run as
//! cancelled.

use tokio::signal;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use super::control::RunControl;

/// Signal handler for graceful shutdown coordination
pub struct SignalHandler {
    control: RunControl,
}

impl SignalHandler {
    /// Create a new signal handler cancelling the given run
    pub fn new(control: RunControl) -> Self {
        Self { control }
    }

    /// Setup signal handling for graceful shutdown (CTRL-C, SIGTERM)
    ///
    /// Returns a handle to the background task that monitors for signals.
    /// Abort the handle once the run is over.
    pub fn setup(&self) -> JoinHandle<()> {
        let control = self.control.clone();

        tokio::spawn(async move {
            let ctrl_c = async {
                if let Err(e) = signal::ctrl_c().await {
                    warn!("Failed to install Ctrl+C handler: {}", e);
                    std::future::pending::<()>().await;
                }
            };

            #[cfg(unix)]
            let terminate = async {
                match signal::unix::signal(signal::unix::SignalKind::terminate()) {
                    Ok(mut stream) => {
                        stream.recv().await;
                    }
                    Err(e) => {
                        warn!("Failed to install SIGTERM handler: {}", e);
                        std::future::pending::<()>().await;
                    }
                }
            };

            #[cfg(not(unix))]
            let terminate = std::future::pending::<()>();

            tokio::select! {
                _ = ctrl_c => {
                    info!("Received Ctrl+C, initiating shutdown");
                },
                _ = terminate => {
                    info!("Received terminate signal, initiating shutdown");
                },
                _ = control.token().cancelled() => return,
            }

            control.cancel();
        })
    }
}
