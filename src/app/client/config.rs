//! HTTP client configuration and building logic
//!
//! This module handles the configuration and construction of the HTTP client
//! shared by catalog listing and asset downloads.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::constants::{http, limits};
use crate::errors::{ConfigError, ConfigResult};

/// Configuration for the repository HTTP client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// TCP keep-alive settings
    pub tcp_keepalive: Option<Duration>,
    /// TCP nodelay (disable Nagle's algorithm)
    pub tcp_nodelay: bool,
    /// Connection pool idle timeout
    pub pool_idle_timeout: Option<Duration>,
    /// Maximum number of idle connections per host
    pub pool_max_per_host: usize,
    /// Timeout of one listing request, body included
    ///
    /// Asset downloads are not bounded by it: a large artifact may stream for
    /// as long as bytes keep arriving.
    pub listing_timeout: Duration,
    /// Connect timeout
    pub connect_timeout: Duration,
    /// Rate limit (requests per second)
    pub rate_limit_rps: u32,
    /// Retries of transient listing failures (429, 503, connection errors)
    pub transient_retries: u32,
    /// Base delay of the exponential listing backoff
    pub retry_base_delay: Duration,
    /// User agent sent with every request
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            tcp_keepalive: Some(http::TCP_KEEPALIVE),
            tcp_nodelay: true,
            pool_idle_timeout: Some(http::POOL_IDLE_TIMEOUT),
            pool_max_per_host: http::POOL_MAX_PER_HOST,
            listing_timeout: http::LISTING_TIMEOUT,
            connect_timeout: http::CONNECT_TIMEOUT,
            rate_limit_rps: limits::DEFAULT_RATE_LIMIT_RPS,
            transient_retries: limits::TRANSIENT_RETRIES,
            retry_base_delay: Duration::from_millis(limits::RETRY_BASE_DELAY_MS),
            user_agent: http::USER_AGENT.to_string(),
        }
    }
}

impl ClientConfig {
    /// Validate configuration values
    pub fn validate(&self) -> ConfigResult<()> {
        if self.rate_limit_rps == 0 {
            return Err(ConfigError::InvalidValue {
                field: "client.rate_limit_rps".to_string(),
                value: "0".to_string(),
                reason: "Rate limit must be greater than zero".to_string(),
            });
        }

        if self.listing_timeout.is_zero() || self.connect_timeout.is_zero() {
            return Err(ConfigError::InvalidValue {
                field: "client.listing_timeout".to_string(),
                value: format!("{:?}/{:?}", self.listing_timeout, self.connect_timeout),
                reason: "Timeouts cannot be zero".to_string(),
            });
        }

        Ok(())
    }

    /// Builds the HTTP client with the specified configuration
    pub fn build_http_client(&self) -> ConfigResult<Client> {
        let mut client_builder = Client::builder()
            .connect_timeout(self.connect_timeout)
            .user_agent(self.user_agent.as_str())
            .tcp_nodelay(self.tcp_nodelay)
            .pool_max_idle_per_host(self.pool_max_per_host);

        if let Some(keepalive) = self.tcp_keepalive {
            client_builder = client_builder.tcp_keepalive(keepalive);
        }

        if let Some(idle_timeout) = self.pool_idle_timeout {
            client_builder = client_builder.pool_idle_timeout(idle_timeout);
        }

        client_builder.build().map_err(ConfigError::HttpClient)
    }
}
