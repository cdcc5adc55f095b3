//! Core HTTP operations with rate limiting and retry logic
//!
//! Listing requests go through [`HttpHandler::get_with_retries`], which backs
//! off on 429/503 responses and connection failures. Asset downloads use
//! [`HttpHandler::send_once`]: the downloader owns the per-asset attempt bound,
//! so a second retry layer here would multiply it.

use std::num::NonZeroU32;
use std::time::Duration;

use governor::{clock::DefaultClock, state::InMemoryState, Jitter, Quota, RateLimiter};
use reqwest::{Client, Response, StatusCode};
use url::Url;

use crate::app::client::config::ClientConfig;
use crate::constants::http;
use crate::errors::{ConfigError, ConfigResult, DownloadResult, ListingError, ListingResult};

type DirectRateLimiter = RateLimiter<governor::state::NotKeyed, InMemoryState, DefaultClock>;

/// HTTP operations handler with resilience patterns
#[derive(Debug)]
pub struct HttpHandler {
    client: Client,
    rate_limiter: DirectRateLimiter,
    transient_retries: u32,
    retry_base_delay: Duration,
    listing_timeout: Duration,
}

impl HttpHandler {
    /// Creates a new HttpHandler from a built client and its configuration
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the rate limit is zero
    pub fn new(client: Client, config: &ClientConfig) -> ConfigResult<Self> {
        let rate_limiter = Self::build_rate_limiter(config.rate_limit_rps)?;
        Ok(Self {
            client,
            rate_limiter,
            transient_retries: config.transient_retries,
            retry_base_delay: config.retry_base_delay,
            listing_timeout: config.listing_timeout,
        })
    }

    fn build_rate_limiter(rate_limit_rps: u32) -> ConfigResult<DirectRateLimiter> {
        let rps = NonZeroU32::new(rate_limit_rps).ok_or_else(|| ConfigError::InvalidValue {
            field: "client.rate_limit_rps".to_string(),
            value: rate_limit_rps.to_string(),
            reason: "Rate limit must be non-zero".to_string(),
        })?;
        Ok(RateLimiter::direct(Quota::per_second(rps)))
    }

    async fn throttle(&self) {
        self.rate_limiter
            .until_ready_with_jitter(Jitter::up_to(http::RATE_LIMIT_JITTER))
            .await;
    }

    fn backoff_delay(&self, retry: u32) -> Duration {
        self.retry_base_delay
            .saturating_mul(2_u32.saturating_pow(retry.saturating_sub(1)))
    }

    /// Issue a GET, retrying transient failures with exponential backoff
    ///
    /// Returns the response for any status other than 429/503; callers decide
    /// what a non-success status means.
    ///
    /// # Errors
    ///
    /// Returns `ListingError` once retries are exhausted
    pub async fn get_with_retries(&self, url: &Url) -> ListingResult<Response> {
        let mut retries = 0;
        loop {
            self.throttle().await;

            let request = self.client.get(url.as_str()).timeout(self.listing_timeout);
            match request.send().await {
                Ok(response) => {
                    let status = response.status();
                    let transient = status == StatusCode::TOO_MANY_REQUESTS
                        || status == StatusCode::SERVICE_UNAVAILABLE;

                    if !transient {
                        tracing::debug!("Fetched {} ({})", url, status);
                        return Ok(response);
                    }

                    if retries >= self.transient_retries {
                        return Err(if status == StatusCode::TOO_MANY_REQUESTS {
                            ListingError::RateLimitExceeded
                        } else {
                            ListingError::ServerOverloaded
                        });
                    }

                    retries += 1;
                    let delay = self.backoff_delay(retries);
                    tracing::warn!(
                        "Server responded {} for {}. Backing off for {}ms",
                        status.as_u16(),
                        url,
                        delay.as_millis()
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) if retries < self.transient_retries => {
                    retries += 1;
                    let delay = self.backoff_delay(retries);
                    tracing::warn!(
                        "Request failed (attempt {}/{}): {}. Retrying in {}ms",
                        retries,
                        self.transient_retries,
                        e,
                        delay.as_millis()
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => {
                    tracing::error!("Request to {} failed after {} retries: {}", url, retries, e);
                    return Err(if retries == 0 {
                        ListingError::Http(e)
                    } else {
                        ListingError::MaxRetriesExceeded {
                            max_retries: self.transient_retries,
                        }
                    });
                }
            }
        }
    }

    /// Issue a single rate limited GET without retrying
    ///
    /// No total timeout applies, so the body may stream for as long as the
    /// server keeps sending.
    pub async fn send_once(&self, url: &Url) -> DownloadResult<Response> {
        self.throttle().await;
        let response = self.client.get(url.as_str()).send().await?;
        tracing::debug!("Fetched {} ({})", url, response.status());
        Ok(response)
    }
}
