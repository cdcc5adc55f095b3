//! Paginated asset catalog access
//!
//! Each call fetches exactly one page of `service/rest/v1/assets`. Walking the
//! pages is the scheduler's job: a page task submits the next page task when
//! the response carries a continuation token.

use std::sync::Arc;

use url::Url;

use crate::app::client::NexusClient;
use crate::app::models::{AssetPage, RepositoryCoordinates};
use crate::constants::api;
use crate::errors::{ListingError, ListingResult};

/// Client for the asset listing endpoint of one repository
#[derive(Debug, Clone)]
pub struct CatalogClient {
    client: Arc<NexusClient>,
    coordinates: RepositoryCoordinates,
}

impl CatalogClient {
    /// Create a catalog client for the given repository
    pub fn new(client: Arc<NexusClient>, coordinates: RepositoryCoordinates) -> Self {
        Self {
            client,
            coordinates,
        }
    }

    /// Repository this client lists
    pub fn coordinates(&self) -> &RepositoryCoordinates {
        &self.coordinates
    }

    /// Build the listing URL for a page
    ///
    /// The API path is appended to whatever path the base URL already has, so
    /// Nexus instances served under a context path work unchanged.
    pub fn listing_url(&self, continuation_token: Option<&str>) -> ListingResult<Url> {
        let base = self.coordinates.base_url();
        let mut url = base.clone();

        url.path_segments_mut()
            .map_err(|_| ListingError::InvalidUrl {
                url: base.to_string(),
                error: "URL cannot be a base".to_string(),
            })?
            .pop_if_empty()
            .extend(api::ASSETS_PATH_SEGMENTS);

        url.set_query(None);
        {
            let mut query = url.query_pairs_mut();
            query.append_pair(api::REPOSITORY_PARAM, self.coordinates.repository_id());
            if let Some(token) = continuation_token {
                query.append_pair(api::CONTINUATION_TOKEN_PARAM, token);
            }
        }

        Ok(url)
    }

    /// Fetch and decode one page of the listing
    ///
    /// # Errors
    ///
    /// Returns `ListingError` if the request fails, the status is not a
    /// success, or the body is not a valid asset page
    pub async fn fetch_page(&self, continuation_token: Option<&str>) -> ListingResult<AssetPage> {
        let url = self.listing_url(continuation_token)?;
        tracing::info!(
            "Retrieving assets of {} (continuation token: {})",
            self.coordinates.repository_id(),
            continuation_token.unwrap_or("none")
        );

        let response = self.client.http().get_with_retries(&url).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ListingError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.bytes().await?;
        let page: AssetPage =
            serde_json::from_slice(&body).map_err(|e| ListingError::Decode {
                reason: e.to_string(),
            })?;

        tracing::debug!(
            "Decoded page with {} assets, next page: {}",
            page.items.len(),
            page.has_next()
        );
        Ok(page)
    }
}
