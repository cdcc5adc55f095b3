//! Data models for repository listings and mirror progress
//!
//! The listing types mirror the JSON returned by the Nexus 3
//! `service/rest/v1/assets` endpoint. Only the fields the mirror needs are
//! decoded; anything else the server sends is ignored.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::errors::{ConfigError, ConfigResult};

/// Location of the repository being mirrored
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryCoordinates {
    base_url: Url,
    repository_id: String,
}

impl RepositoryCoordinates {
    /// Create coordinates from an already parsed base URL
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the URL is not http(s) or the repository id is blank
    pub fn new(base_url: Url, repository_id: impl Into<String>) -> ConfigResult<Self> {
        let repository_id = repository_id.into();

        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidBaseUrl {
                url: base_url.to_string(),
                error: "only http and https are supported".to_string(),
            });
        }

        if repository_id.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "repository".to_string(),
                value: repository_id,
                reason: "Repository identifier cannot be empty".to_string(),
            });
        }

        Ok(Self {
            base_url,
            repository_id,
        })
    }

    /// Parse the base URL and create coordinates
    pub fn parse(base_url: &str, repository_id: impl Into<String>) -> ConfigResult<Self> {
        let url = Url::parse(base_url).map_err(|e| ConfigError::InvalidBaseUrl {
            url: base_url.to_string(),
            error: e.to_string(),
        })?;
        Self::new(url, repository_id)
    }

    /// Base URL of the repository manager
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Identifier of the repository to mirror
    pub fn repository_id(&self) -> &str {
        &self.repository_id
    }
}

/// One page of the asset listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetPage {
    /// Assets on this page, in server order
    pub items: Vec<AssetRecord>,
    /// Cursor for the next page, absent on the last page
    #[serde(default)]
    pub continuation_token: Option<String>,
}

impl AssetPage {
    /// Whether another page follows this one
    pub fn has_next(&self) -> bool {
        self.continuation_token.is_some()
    }
}

/// A single downloadable asset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetRecord {
    /// Path of the asset inside the repository, used as its local path
    #[serde(rename = "path")]
    pub relative_path: String,
    /// Absolute URL the asset bytes are served from
    #[serde(rename = "downloadUrl")]
    pub download_url: String,
    /// Checksums published by the server
    #[serde(rename = "checksum")]
    pub expected_checksum: AssetChecksum,
}

/// Checksums attached to an asset
///
/// Nexus also publishes md5/sha256/sha512; only SHA-1 is verified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetChecksum {
    pub sha1: String,
}

/// Aggregate mirror progress
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressCounters {
    /// Assets found across all fetched pages
    pub discovered: u64,
    /// Assets finished, verified or abandoned
    pub processed: u64,
    /// Assets whose digest matched
    pub verified: u64,
    /// Assets given up on
    pub abandoned: u64,
    /// Listing pages decoded
    pub pages_fetched: u64,
    /// Listing pages that failed
    pub pages_failed: u64,
}

impl ProgressCounters {
    /// Assets discovered but not yet processed
    pub fn remaining(&self) -> u64 {
        self.discovered.saturating_sub(self.processed)
    }

    /// Completion percentage of the assets discovered so far
    pub fn completion_percentage(&self) -> f64 {
        if self.discovered == 0 {
            return 0.0;
        }
        (self.processed as f64 / self.discovered as f64) * 100.0
    }
}
