//! Application constants for Nexus Mirror
//!
//! This module centralizes all constants used throughout the application,
//! organized by functional domain.

use std::time::Duration;

/// Nexus REST API layout
pub mod api {
    /// Path segments of the asset listing endpoint, appended to the base URL
    pub const ASSETS_PATH_SEGMENTS: [&str; 4] = ["service", "rest", "v1", "assets"];

    /// Query parameter naming the repository to list
    pub const REPOSITORY_PARAM: &str = "repository";

    /// Query parameter carrying the continuation token of the next page
    pub const CONTINUATION_TOKEN_PARAM: &str = "continuationToken";
}

/// HTTP client configuration constants
pub mod http {
    use super::Duration;

    /// Default user agent for all HTTP requests
    pub const USER_AGENT: &str = concat!("Nexus-Mirror/", env!("CARGO_PKG_VERSION"));

    /// Timeout of one listing request. Downloads have no total timeout
    pub const LISTING_TIMEOUT: Duration = Duration::from_secs(300);

    /// Connection establishment timeout
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

    /// TCP keep-alive interval
    pub const TCP_KEEPALIVE: Duration = Duration::from_secs(30);

    /// Connection pool idle timeout
    pub const POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(90);

    /// Maximum idle connections per host in pool
    pub const POOL_MAX_PER_HOST: usize = 16;

    /// Upper bound of the jitter added to rate limited requests
    pub const RATE_LIMIT_JITTER: Duration = Duration::from_millis(50);
}

/// Rate limiting and retry configuration
pub mod limits {
    /// Default rate limit for repository requests (requests per second)
    pub const DEFAULT_RATE_LIMIT_RPS: u32 = 50;

    /// Transient retries for listing requests (429, 503, connection errors)
    pub const TRANSIENT_RETRIES: u32 = 3;

    /// Base delay for exponential backoff of listing requests (milliseconds)
    pub const RETRY_BASE_DELAY_MS: u64 = 500;
}

/// Asset download configuration
pub mod download {
    use super::Duration;

    /// Maximum download attempts per asset
    pub const MAX_ATTEMPTS: u32 = 3;

    /// Delay between download attempts of the same asset
    pub const RETRY_DELAY: Duration = Duration::from_secs(1);

    /// Read buffer size when hashing a downloaded file (64KB)
    pub const HASH_BUFFER_SIZE: usize = 64 * 1024;
}

/// Worker and concurrency configuration
pub mod workers {
    /// Default number of workers in the pool
    pub const DEFAULT_WORKER_COUNT: usize = 10;

    /// Maximum allowed workers
    pub const MAX_WORKER_COUNT: usize = 128;
}

/// Coordinator and orchestration constants
pub mod coordinator {
    use super::Duration;

    /// Interval at which the controller logs progress while waiting
    pub const POLL_INTERVAL: Duration = Duration::from_secs(10);

    /// Maximum time to wait for workers to stop after completion
    pub const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(30);
}

/// File system constants
pub mod files {
    /// Prefix of the temporary destination directory
    pub const TEMP_DIR_PREFIX: &str = "nexus3";

    /// Project-local configuration file name
    pub const LOCAL_CONFIG_FILE: &str = "nexus-mirror.toml";

    /// Directory under the user config dir holding the configuration
    pub const CONFIG_DIR_NAME: &str = "nexus-mirror";

    /// Configuration file name inside the config directory
    pub const CONFIG_FILE_NAME: &str = "config.toml";
}

/// Logging constants
pub mod logging {
    /// Default log level
    pub const DEFAULT_LOG_LEVEL: &str = "info";
}

// Re-export commonly used constants for convenience
pub use download::MAX_ATTEMPTS;
pub use http::USER_AGENT;
pub use workers::DEFAULT_WORKER_COUNT;
