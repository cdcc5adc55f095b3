//! Core application logic for Nexus Mirror
//!
//! This module contains the HTTP client for the Nexus REST API, the data
//! models, the integrity-verified downloader, the work queue and worker pool,
//! and the controller orchestrating a mirror run.
//!
//! # Examples
//!
//! ```rust,no_run
//! use nexus_mirror::app::{ClientConfig, CatalogClient, NexusClient};
//! use nexus_mirror::app::models::RepositoryCoordinates;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Arc::new(NexusClient::new(&ClientConfig::default())?);
//! let coordinates = RepositoryCoordinates::parse("http://localhost:8081", "maven-releases")?;
//! let catalog = CatalogClient::new(client, coordinates);
//!
//! let mut token = None;
//! loop {
//!     let page = catalog.fetch_page(token.as_deref()).await?;
//!     for asset in &page.items {
//!         println!("{} -> {}", asset.relative_path, asset.download_url);
//!     }
//!     match page.continuation_token {
//!         Some(next) => token = Some(next),
//!         None => break,
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod coordinator;
pub mod destination;
pub mod downloader;
pub mod hash;
pub mod models;
pub mod queue;
pub mod worker;

// Re-export main public API
pub use client::{CatalogClient, ClientConfig, NexusClient};
pub use coordinator::{
    CoordinatorConfig, ListingFailurePolicy, MirrorController, ProgressTracker, RunControl,
    RunOutcome, SessionResult,
};
pub use destination::DestinationRoot;
pub use downloader::{AssetDownloader, DownloadOutcome, DownloaderConfig};
pub use hash::Sha1Hash;
pub use models::{AssetPage, AssetRecord, ProgressCounters, RepositoryCoordinates};
pub use queue::{QueueStats, WorkItem, WorkQueue};
pub use worker::{WorkerConfig, WorkerPool};
