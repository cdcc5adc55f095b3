//! Streaming asset transfer to disk
//!
//! The response body is written chunk by chunk into the destination file,
//! which is truncated first so a retried attempt never appends to the bytes
//! of an earlier one.

use std::path::Path;

use futures::StreamExt;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use url::Url;

use crate::app::client::http::HttpHandler;
use crate::errors::{DownloadError, DownloadResult};

/// File download operations handler
pub struct DownloadHandler<'a> {
    http_handler: &'a HttpHandler,
}

impl<'a> DownloadHandler<'a> {
    /// Creates a new DownloadHandler with the given HTTP handler
    pub fn new(http_handler: &'a HttpHandler) -> Self {
        Self { http_handler }
    }

    /// Stream one GET response into `destination`, replacing its contents
    ///
    /// Returns the number of bytes written. The parent directory must exist.
    ///
    /// # Errors
    ///
    /// Returns `DownloadError` if the URL is invalid, the server answers with
    /// a non-success status, the body transfer fails, or the file cannot be
    /// written. A partially written file is left in place for the next
    /// attempt to truncate.
    pub async fn stream_to_file(&self, url: &str, destination: &Path) -> DownloadResult<u64> {
        let parsed_url = Url::parse(url).map_err(|e| DownloadError::InvalidUrl {
            url: url.to_string(),
            error: e.to_string(),
        })?;

        let response = self.http_handler.send_once(&parsed_url).await?;
        if !response.status().is_success() {
            return Err(DownloadError::ServerError {
                status: response.status().as_u16(),
            });
        }

        let mut file = File::create(destination).await?;
        let mut stream = response.bytes_stream();
        let mut written: u64 = 0;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }

        file.flush().await?;
        file.sync_all().await?;

        tracing::debug!("Wrote {} bytes to {}", written, destination.display());
        Ok(written)
    }
}
