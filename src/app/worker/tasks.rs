//! The two task bodies executed by workers
//!
//! A page task fetches one listing page, queues the next page when there is
//! one, records the discovered assets and queues one download per asset. A
//! download task hands its asset to the verified downloader. Failures are
//! resolved here according to the run's policies and never propagate to the
//! worker loop.

use std::sync::Arc;

use tracing::{error, warn};

use crate::app::client::CatalogClient;
use crate::app::coordinator::{ListingFailurePolicy, ProgressTracker, RunControl};
use crate::app::destination::DestinationRoot;
use crate::app::downloader::{AssetDownloader, DownloadOutcome};
use crate::app::models::{AssetPage, AssetRecord};
use crate::app::queue::{WorkItem, WorkQueue};

/// How task failures affect the rest of the run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskPolicy {
    pub listing_failure: ListingFailurePolicy,
    pub continue_on_asset_failure: bool,
}

impl Default for TaskPolicy {
    fn default() -> Self {
        Self {
            listing_failure: ListingFailurePolicy::Abort,
            continue_on_asset_failure: true,
        }
    }
}

/// Everything a worker needs to execute page and download tasks
#[derive(Debug)]
pub struct MirrorTasks {
    catalog: CatalogClient,
    downloader: AssetDownloader,
    destination: DestinationRoot,
    queue: Arc<WorkQueue>,
    tracker: Arc<ProgressTracker>,
    control: RunControl,
    policy: TaskPolicy,
}

impl MirrorTasks {
    pub fn new(
        catalog: CatalogClient,
        downloader: AssetDownloader,
        destination: DestinationRoot,
        queue: Arc<WorkQueue>,
        tracker: Arc<ProgressTracker>,
        control: RunControl,
        policy: TaskPolicy,
    ) -> Self {
        Self {
            catalog,
            downloader,
            destination,
            queue,
            tracker,
            control,
            policy,
        }
    }

    /// Run one work item to completion
    ///
    /// Any follow-on work is submitted before this returns, so the caller may
    /// mark the item complete as soon as it does.
    pub async fn execute(&self, item: WorkItem) {
        match item {
            WorkItem::FetchPage { continuation_token } => {
                self.fetch_page(continuation_token).await
            }
            WorkItem::Download(asset) => self.download(asset).await,
        }
    }

    async fn fetch_page(&self, continuation_token: Option<String>) {
        match self.catalog.fetch_page(continuation_token.as_deref()).await {
            Ok(page) => self.enqueue_page(page),
            Err(e) => {
                self.tracker.record_page_failed();
                let token = continuation_token.as_deref().unwrap_or("none");
                match self.policy.listing_failure {
                    ListingFailurePolicy::Abort => {
                        error!(
                            "Failed to retrieve listing page (continuation token: {}): {}",
                            token, e
                        );
                        self.control.abort(format!(
                            "Listing of {} failed: {}",
                            self.catalog.coordinates().repository_id(),
                            e
                        ));
                    }
                    ListingFailurePolicy::Skip => {
                        warn!(
                            "Skipping listing page (continuation token: {}): {}",
                            token, e
                        );
                    }
                }
            }
        }
    }

    fn enqueue_page(&self, page: AssetPage) {
        self.tracker.record_page_fetched();

        let AssetPage {
            items,
            continuation_token,
        } = page;

        // Next page first, so the listing keeps moving while downloads queue up
        if let Some(token) = continuation_token {
            if let Err(e) = self.queue.submit_page(Some(token)) {
                warn!("Could not queue the next listing page: {}", e);
            }
        }

        self.tracker.record_discovered(items.len() as u64);
        self.tracker.notify_progress();

        for asset in items {
            if let Err(e) = self.queue.submit_download(asset) {
                warn!("Could not queue remaining downloads of this page: {}", e);
                break;
            }
        }
    }

    async fn download(&self, asset: AssetRecord) {
        let outcome = self
            .downloader
            .download_and_verify(&asset, &self.destination)
            .await;

        if let DownloadOutcome::Abandoned { reason, .. } = outcome {
            if !self.policy.continue_on_asset_failure {
                self.control.abort(format!(
                    "Asset {} could not be mirrored: {}",
                    asset.relative_path, reason
                ));
            }
        }
    }
}
