//! HTTP client implementation for Nexus repository access
//!
//! The module is organized into specialized components:
//! - `config`: HTTP client configuration and building
//! - `http`: Core HTTP operations with rate limiting and transient retries
//! - `catalog`: Paginated asset listing
//! - `download`: Streaming asset transfer to disk

use std::path::Path;

use crate::errors::{ConfigResult, DownloadResult};

pub mod catalog;
pub mod config;
pub mod download;
pub mod http;

pub use catalog::CatalogClient;
pub use config::ClientConfig;

use download::DownloadHandler;
use http::HttpHandler;

/// HTTP client shared by every task of a mirror run
///
/// Wraps one connection pool and one rate limiter, so all workers together
/// stay within the configured request rate.
#[derive(Debug)]
pub struct NexusClient {
    http_handler: HttpHandler,
}

impl NexusClient {
    /// Creates a new client from configuration
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the configuration is invalid or the HTTP
    /// client cannot be built
    pub fn new(config: &ClientConfig) -> ConfigResult<Self> {
        config.validate()?;
        let client = config.build_http_client()?;
        let http_handler = HttpHandler::new(client, config)?;

        tracing::debug!(
            "Created repository client ({} requests/s, {} transient retries)",
            config.rate_limit_rps,
            config.transient_retries
        );

        Ok(Self { http_handler })
    }

    /// Stream a URL into a local file, replacing any previous contents
    ///
    /// # Errors
    ///
    /// Returns `DownloadError` if the request, the transfer, or the write fails
    pub async fn download_to_file(&self, url: &str, destination: &Path) -> DownloadResult<u64> {
        DownloadHandler::new(&self.http_handler)
            .stream_to_file(url, destination)
            .await
    }

    /// Low-level HTTP handler
    pub fn http(&self) -> &HttpHandler {
        &self.http_handler
    }
}
