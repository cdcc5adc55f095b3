//! Configuration management for Nexus Mirror
//!
//! Settings come from an optional TOML file layered over built-in defaults;
//! command-line flags are applied on top by the CLI. Durations are written in
//! human-readable form, e.g. `retry_delay = "1s"` or `deadline = "2h"`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::app::coordinator::ListingFailurePolicy;
use crate::app::downloader::DownloaderConfig;
use crate::app::worker::WorkerConfig;
use crate::app::{ClientConfig, CoordinatorConfig};
use crate::constants::{coordinator, download, files, http, limits, logging, workers};
use crate::errors::{ConfigError, ConfigResult};

/// Unified application configuration for TOML serialization
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP client settings
    pub client: ClientConfigToml,
    /// Mirror run settings
    pub mirror: MirrorConfigToml,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// TOML-friendly client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfigToml {
    /// TCP keep-alive interval (absent = disabled)
    #[serde(with = "humantime_serde", skip_serializing_if = "Option::is_none")]
    pub tcp_keepalive: Option<Duration>,
    pub tcp_nodelay: bool,
    /// Idle connection timeout (absent = no timeout)
    #[serde(with = "humantime_serde", skip_serializing_if = "Option::is_none")]
    pub pool_idle_timeout: Option<Duration>,
    pub pool_max_per_host: usize,
    #[serde(with = "humantime_serde")]
    pub listing_timeout: Duration,
    #[serde(with = "humantime_serde")]
    pub connect_timeout: Duration,
    /// Requests per second across all workers
    pub rate_limit_rps: u32,
    /// Retries of 429/503/connection failures on listing requests
    pub transient_retries: u32,
    #[serde(with = "humantime_serde")]
    pub retry_base_delay: Duration,
    pub user_agent: String,
}

impl Default for ClientConfigToml {
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

/// TOML-friendly mirror run configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MirrorConfigToml {
    /// Number of concurrent workers
    pub worker_count: usize,
    /// Download attempts per asset
    pub max_attempts: u32,
    /// Pause between attempts of one asset
    #[serde(with = "humantime_serde")]
    pub retry_delay: Duration,
    /// Status log interval while waiting for completion
    #[serde(with = "humantime_serde")]
    pub poll_interval: Duration,
    /// Overall time limit (absent = none)
    #[serde(with = "humantime_serde", skip_serializing_if = "Option::is_none")]
    pub deadline: Option<Duration>,
    #[serde(with = "humantime_serde")]
    pub shutdown_timeout: Duration,
    /// `abort` or `skip`
    pub listing_failure: ListingFailurePolicy,
    pub continue_on_asset_failure: bool,
}

impl Default for MirrorConfigToml {
    fn default() -> Self {
        Self {
            worker_count: workers::DEFAULT_WORKER_COUNT,
            max_attempts: download::MAX_ATTEMPTS,
            retry_delay: download::RETRY_DELAY,
            poll_interval: coordinator::POLL_INTERVAL,
            deadline: None,
            shutdown_timeout: coordinator::SHUTDOWN_TIMEOUT,
            listing_failure: ListingFailurePolicy::Abort,
            continue_on_asset_failure: true,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level used when no verbosity flag is given
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: logging::DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl AppConfig {
    /// Runtime HTTP client configuration
    pub fn client_config(&self) -> ClientConfig {
        self.client.to_runtime_config()
    }

    /// Runtime mirror run configuration
    pub fn coordinator_config(&self) -> CoordinatorConfig {
        self.mirror.to_runtime_config()
    }

    /// Load configuration with precedence:
    /// 1. Explicit config file (must exist)
    /// 2. `./nexus-mirror.toml`
    /// 3. `<user config dir>/nexus-mirror/config.toml`
    /// 4. Built-in defaults
    pub async fn load(config_file_override: Option<&Path>) -> ConfigResult<Self> {
        if let Some(path) = config_file_override {
            if !path.exists() {
                return Err(ConfigError::NotFound {
                    path: path.to_path_buf(),
                });
            }
            return Self::load_from_file(path).await;
        }

        match Self::find_config_file() {
            Some(path) => Self::load_from_file(&path).await,
            None => {
                debug!("No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Find configuration file in standard locations
    fn find_config_file() -> Option<PathBuf> {
        let mut search_paths = vec![PathBuf::from(files::LOCAL_CONFIG_FILE)];
        if let Ok(user_config) = Self::default_config_path() {
            search_paths.push(user_config);
        }

        search_paths.into_iter().find(|path| {
            let found = path.is_file();
            if found {
                debug!("Found config file: {}", path.display());
            }
            found
        })
    }

    /// Get the default config file path for the current user
    pub fn default_config_path() -> ConfigResult<PathBuf> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDirectory)?;
        Ok(config_dir
            .join(files::CONFIG_DIR_NAME)
            .join(files::CONFIG_FILE_NAME))
    }

    /// Load configuration from a TOML file
    pub async fn load_from_file(path: &Path) -> ConfigResult<Self> {
        let content =
            tokio::fs::read_to_string(path)
                .await
                .map_err(|source| ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })?;

        let config = Self::from_toml(&content)?;
        info!("Loaded configuration from: {}", path.display());
        Ok(config)
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> ConfigResult<Self> {
        Ok(toml::from_str(content)?)
    }
}

impl ClientConfigToml {
    /// Convert to runtime ClientConfig
    pub fn to_runtime_config(&self) -> ClientConfig {
        ClientConfig {
            tcp_keepalive: self.tcp_keepalive,
            tcp_nodelay: self.tcp_nodelay,
            pool_idle_timeout: self.pool_idle_timeout,
            pool_max_per_host: self.pool_max_per_host,
            listing_timeout: self.listing_timeout,
            connect_timeout: self.connect_timeout,
            rate_limit_rps: self.rate_limit_rps,
            transient_retries: self.transient_retries,
            retry_base_delay: self.retry_base_delay,
            user_agent: self.user_agent.clone(),
        }
    }
}

impl MirrorConfigToml {
    /// Convert to runtime CoordinatorConfig
    pub fn to_runtime_config(&self) -> CoordinatorConfig {
        CoordinatorConfig {
            worker: WorkerConfig {
                worker_count: self.worker_count,
                shutdown_timeout: self.shutdown_timeout,
            },
            downloader: DownloaderConfig {
                max_attempts: self.max_attempts,
                retry_delay: self.retry_delay,
            },
            poll_interval: self.poll_interval,
            deadline: self.deadline,
            listing_failure: self.listing_failure,
            continue_on_asset_failure: self.continue_on_asset_failure,
        }
    }
}
