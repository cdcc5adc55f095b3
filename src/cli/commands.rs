//! Command implementations for the CLI
//!
//! Turns parsed arguments plus loaded configuration into a mirror run and
//! reports its result.

use std::sync::Arc;

use tracing::{error, info, warn};

use super::args::Cli;
use super::progress::ProgressDisplay;
use crate::app::coordinator::{MirrorController, SignalHandler};
use crate::app::models::RepositoryCoordinates;
use crate::app::NexusClient;
use crate::config::AppConfig;
use crate::errors::{AppError, Result};

/// Mirror the repository named on the command line
///
/// # Errors
///
/// Returns an error when the arguments or configuration are invalid, the
/// destination cannot be used, or the run ends without completing every
/// asset.
pub async fn handle_mirror(cli: &Cli, config: &AppConfig) -> Result<()> {
    cli.validate().map_err(AppError::generic)?;

    let coordinates = RepositoryCoordinates::parse(&cli.url, cli.repository.as_str())?;
    let coordinator_config = cli.mirror.apply_to(config.coordinator_config());
    let client = Arc::new(NexusClient::new(&config.client_config())?);

    info!(
        "Starting mirror of {} with {} workers",
        coordinates.repository_id(),
        coordinator_config.worker.worker_count
    );

    let controller = MirrorController::new(coordinator_config, client);
    let signal_task = SignalHandler::new(controller.control()).setup();
    let tracker = controller.tracker();

    let display = if cli.mirror.progress {
        Some(ProgressDisplay::start(tracker.subscribe())?)
    } else {
        None
    };

    let result = controller
        .run(coordinates, cli.destination.as_deref())
        .await;
    signal_task.abort();

    if let Some(display) = display {
        display.finish(&tracker.snapshot());
    }

    let session = result?;
    println!("{}", session.summary());
    if session.has_errors() {
        for problem in &session.shutdown_errors {
            warn!("Shutdown problem: {}", problem);
        }
    }

    if session.is_success() {
        Ok(())
    } else {
        error!("Mirror run did not complete: {:?}", session.outcome);
        Err(AppError::Incomplete {
            reason: session.summary(),
        })
    }
}
