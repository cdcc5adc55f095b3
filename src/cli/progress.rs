//! Progress bar for mirror runs
//!
//! Renders `processed/discovered` with indicatif. The bar's length grows as
//! listing pages discover more assets, so the ETA only covers what is known
//! so far.

use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::app::models::ProgressCounters;
use crate::errors::{AppError, Result};

/// Live progress bar fed by the tracker's watch channel
pub struct ProgressDisplay {
    bar: ProgressBar,
    updater: JoinHandle<()>,
}

impl ProgressDisplay {
    /// Start rendering updates from `updates`
    pub fn start(mut updates: watch::Receiver<ProgressCounters>) -> Result<Self> {
        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} assets ({eta}) {msg}",
                )
                .map_err(|e| AppError::generic(format!("Progress bar template error: {}", e)))?
                .progress_chars("##-"),
        );
        bar.set_message("Listing repository");

        let handle = bar.clone();
        let updater = tokio::spawn(async move {
            while updates.changed().await.is_ok() {
                let counters = *updates.borrow_and_update();
                render(&handle, &counters);
            }
        });

        Ok(Self { bar, updater })
    }

    /// Stop updating and leave the final state on screen
    pub fn finish(self, counters: &ProgressCounters) {
        self.updater.abort();
        render(&self.bar, counters);
        self.bar.finish_with_message(format!(
            "{} verified, {} abandoned",
            counters.verified, counters.abandoned
        ));
    }
}

fn render(bar: &ProgressBar, counters: &ProgressCounters) {
    bar.set_length(counters.discovered);
    bar.set_position(counters.processed);
    if counters.abandoned > 0 {
        bar.set_message(format!("{} abandoned", counters.abandoned));
    } else {
        bar.set_message(format!("{} listing page(s)", counters.pages_fetched));
    }
}
