//! Integrity-verified asset downloads
//!
//! One call handles one asset end to end: resolve its local path, transfer
//! the bytes, hash what landed on disk and compare with the catalog SHA-1.
//! Mismatches and transfer failures are retried up to a fixed number of
//! attempts. Whatever happens, the asset is counted as processed exactly once
//! and no error escapes to the scheduler.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::app::client::NexusClient;
use crate::app::coordinator::ProgressTracker;
use crate::app::destination::DestinationRoot;
use crate::app::hash::Sha1Hash;
use crate::app::models::AssetRecord;
use crate::constants::download;
use crate::errors::{ConfigError, ConfigResult, DownloadError, DownloadResult};

/// Retry settings for asset downloads
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloaderConfig {
    /// Attempts per asset, including the first one
    pub max_attempts: u32,
    /// Pause between two attempts of the same asset
    pub retry_delay: Duration,
}

impl Default for DownloaderConfig {
    fn default() -> Self {
        Self {
            max_attempts: download::MAX_ATTEMPTS,
            retry_delay: download::RETRY_DELAY,
        }
    }
}

impl DownloaderConfig {
    pub fn validate(&self) -> ConfigResult<()> {
        if self.max_attempts == 0 {
            return Err(ConfigError::InvalidValue {
                field: "mirror.max_attempts".to_string(),
                value: "0".to_string(),
                reason: "At least one download attempt is required".to_string(),
            });
        }
        Ok(())
    }
}

/// How a single asset ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    /// The file on disk matches the catalog checksum
    Verified { attempts: u32, bytes: u64 },
    /// The asset was given up on; the last attempt's file may remain on disk
    Abandoned { attempts: u32, reason: String },
}

impl DownloadOutcome {
    pub fn is_verified(&self) -> bool {
        matches!(self, DownloadOutcome::Verified { .. })
    }

    /// Number of transfer attempts made
    pub fn attempts(&self) -> u32 {
        match self {
            DownloadOutcome::Verified { attempts, .. }
            | DownloadOutcome::Abandoned { attempts, .. } => *attempts,
        }
    }
}

/// Downloads assets and verifies them against their SHA-1 checksum
#[derive(Debug, Clone)]
pub struct AssetDownloader {
    client: Arc<NexusClient>,
    tracker: Arc<ProgressTracker>,
    config: DownloaderConfig,
}

impl AssetDownloader {
    pub fn new(
        client: Arc<NexusClient>,
        tracker: Arc<ProgressTracker>,
        config: DownloaderConfig,
    ) -> Self {
        Self {
            client,
            tracker,
            config,
        }
    }

    /// Download one asset below `destination` and verify it
    ///
    /// Never fails: the outcome says whether the asset was verified or
    /// abandoned, and the processed counter is incremented exactly once
    /// either way.
    pub async fn download_and_verify(
        &self,
        asset: &AssetRecord,
        destination: &DestinationRoot,
    ) -> DownloadOutcome {
        info!("Downloading asset <{}>", asset.download_url);

        let outcome = match self.download_with_retries(asset, destination).await {
            Ok((attempts, bytes)) => {
                debug!(
                    "Verified {} ({} bytes, {} attempt(s))",
                    asset.relative_path, bytes, attempts
                );
                self.tracker.record_verified();
                DownloadOutcome::Verified { attempts, bytes }
            }
            Err((attempts, e)) => {
                error!("Failed to download asset <{}>: {}", asset.download_url, e);
                self.tracker.record_abandoned();
                DownloadOutcome::Abandoned {
                    attempts,
                    reason: e.to_string(),
                }
            }
        };

        self.tracker.record_processed();
        self.tracker.notify_progress();
        outcome
    }

    async fn download_with_retries(
        &self,
        asset: &AssetRecord,
        destination: &DestinationRoot,
    ) -> Result<(u32, u64), (u32, DownloadError)> {
        let expected = Sha1Hash::from_hex(&asset.expected_checksum.sha1).map_err(|e| (0, e))?;

        let local_path = destination
            .resolve(&asset.relative_path)
            .map_err(|e| (0, e.into()))?;
        destination
            .ensure_parent(&local_path)
            .await
            .map_err(|e| (0, e.into()))?;

        let max_attempts = self.config.max_attempts.max(1);
        let mut last_error = None;

        for attempt in 1..=max_attempts {
            if attempt > 1 && !self.config.retry_delay.is_zero() {
                tokio::time::sleep(self.config.retry_delay).await;
            }

            match self.attempt(asset, &local_path, &expected).await {
                Ok(bytes) => return Ok((attempt, bytes)),
                Err(e) => {
                    if attempt < max_attempts {
                        warn!(
                            "Download of {} failed (attempt {}/{}): {}. Retrying",
                            asset.relative_path, attempt, max_attempts, e
                        );
                    }
                    last_error = Some(e);
                }
            }
        }

        Err((
            max_attempts,
            DownloadError::AttemptsExhausted {
                max_attempts,
                last_error: last_error
                    .map(|e| e.to_string())
                    .unwrap_or_else(|| "no attempt made".to_string()),
            },
        ))
    }

    /// One transfer plus verification of the written file
    async fn attempt(
        &self,
        asset: &AssetRecord,
        local_path: &Path,
        expected: &Sha1Hash,
    ) -> DownloadResult<u64> {
        let bytes = self
            .client
            .download_to_file(&asset.download_url, local_path)
            .await?;

        let actual = Sha1Hash::digest_file(local_path).await?;
        if actual != *expected {
            return Err(DownloadError::ChecksumMismatch {
                expected: expected.to_hex(),
                actual: actual.to_hex(),
            });
        }

        Ok(bytes)
    }
}
