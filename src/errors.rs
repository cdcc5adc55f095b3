//! Error types for Nexus Mirror
//!
//! This module defines the error types for every component of the mirror.
//! Per-task errors (listing, download, storage) are contained inside the task
//! that raised them and only logged; the top-level [`AppError`] is what the
//! CLI reports when a run cannot start or finish.

use std::path::PathBuf;
use thiserror::Error;

/// Catalog listing errors
#[derive(Error, Debug)]
pub enum ListingError {
    /// HTTP request failed after transient retries
    #[error("Listing request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Server returned a non-success status for the listing
    #[error("Listing request returned HTTP {status} for {url}")]
    Status { status: u16, url: String },

    /// Response body could not be decoded as an asset page
    #[error("Listing response could not be decoded: {reason}")]
    Decode { reason: String },

    /// Listing URL could not be built from the base URL
    #[error("Invalid listing URL: {url} - {error}")]
    InvalidUrl { url: String, error: String },

    /// Rate limit exceeded after retries
    #[error("Rate limit exceeded. Server responded with HTTP 429")]
    RateLimitExceeded,

    /// Server overloaded after retries
    #[error("Server overloaded. Server responded with HTTP 503")]
    ServerOverloaded,

    /// Maximum transient retries exceeded
    #[error("Maximum retry attempts ({max_retries}) exceeded for listing request")]
    MaxRetriesExceeded { max_retries: u32 },
}

/// Asset download errors
#[derive(Error, Debug)]
pub enum DownloadError {
    /// HTTP request or body transfer error
    #[error("HTTP transfer failed: {0}")]
    Http(#[from] reqwest::Error),

    /// I/O error while writing or hashing the local file
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid download URL provided by the catalog
    #[error("Invalid URL: {url} - {error}")]
    InvalidUrl { url: String, error: String },

    /// Server returned error status
    #[error("Server error: HTTP {status}")]
    ServerError { status: u16 },

    /// Computed digest disagrees with the catalog checksum
    #[error("Checksum mismatch. Expected: {expected}, got: {actual}")]
    ChecksumMismatch { expected: String, actual: String },

    /// Catalog checksum is not a SHA-1 hex string
    #[error("Invalid SHA-1 checksum: {value}")]
    InvalidChecksum { value: String },

    /// Every attempt failed
    #[error("Maximum download attempts ({max_attempts}) exhausted: {last_error}")]
    AttemptsExhausted {
        max_attempts: u32,
        last_error: String,
    },

    /// Local storage could not be prepared for the asset
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Local storage errors
#[derive(Error, Debug)]
pub enum StorageError {
    /// Destination already holds files
    #[error("Destination directory already exists and is not empty: {path}")]
    DestinationNotEmpty { path: PathBuf },

    /// Destination exists but is not a directory
    #[error("Destination is not a directory: {path}")]
    NotADirectory { path: PathBuf },

    /// Directory creation failed
    #[error("Unable to create directory {path}: {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Temporary destination could not be created
    #[error("Unable to create temporary destination directory: {0}")]
    TempDirectory(#[source] std::io::Error),

    /// Destination could not be inspected
    #[error("Unable to inspect destination {path}: {source}")]
    Inspect {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Asset path would escape the destination root
    #[error("Asset path escapes the destination directory: {path}")]
    UnsafePath { path: String },
}

/// Work queue and worker pool errors
#[derive(Error, Debug)]
pub enum QueueError {
    /// Pool used in a state that does not allow the operation
    #[error("Invalid worker pool state: {state}")]
    InvalidPoolState { state: String },

    /// Shutdown did not finish in time
    #[error("Worker pool shutdown timeout after {seconds} seconds")]
    ShutdownTimeout { seconds: u64 },

    /// Queue closed while work was being submitted
    #[error("Work queue closed")]
    QueueClosed,
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    NotFound { path: PathBuf },

    /// Configuration file could not be read
    #[error("Failed to read configuration file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Invalid configuration format
    #[error("Invalid configuration format: {0}")]
    InvalidFormat(#[from] toml::de::Error),

    /// Invalid configuration value
    #[error("Invalid configuration value for {field}: {value}. {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    /// Base URL could not be parsed
    #[error("Invalid repository URL: {url} - {error}")]
    InvalidBaseUrl { url: String, error: String },

    /// Could not locate the user configuration directory
    #[error("Could not determine user config directory")]
    NoConfigDirectory,

    /// HTTP client could not be built from the configuration
    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// Top-level application error that can represent any error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Listing error
    #[error(transparent)]
    Listing(#[from] ListingError),

    /// Download error
    #[error(transparent)]
    Download(#[from] DownloadError),

    /// Storage error
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Queue error
    #[error(transparent)]
    Queue(#[from] QueueError),

    /// Configuration error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Generic I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Mirror run did not complete
    #[error("Mirror run did not complete: {reason}")]
    Incomplete { reason: String },

    /// Generic application error with context
    #[error("Application error: {message}")]
    Generic { message: String },
}

impl AppError {
    /// Create a generic application error with a message
    pub fn generic(message: impl Into<String>) -> Self {
        Self::Generic {
            message: message.into(),
        }
    }

    /// Check if the error is recoverable (transient)
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            AppError::Listing(ListingError::Http(_))
                | AppError::Listing(ListingError::RateLimitExceeded)
                | AppError::Listing(ListingError::ServerOverloaded)
                | AppError::Download(DownloadError::Http(_))
                | AppError::Download(DownloadError::ChecksumMismatch { .. })
                | AppError::Download(DownloadError::ServerError { .. })
        )
    }

    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            AppError::Listing(_) => "listing",
            AppError::Download(_) => "download",
            AppError::Storage(_) => "storage",
            AppError::Queue(_) => "queue",
            AppError::Config(_) => "config",
            AppError::Io(_) => "io",
            AppError::Incomplete { .. } => "incomplete",
            AppError::Generic { .. } => "generic",
        }
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, AppError>;

/// Listing result type alias
pub type ListingResult<T> = std::result::Result<T, ListingError>;

/// Download result type alias
pub type DownloadResult<T> = std::result::Result<T, DownloadError>;

/// Storage result type alias
pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// Queue result type alias
pub type QueueResult<T> = std::result::Result<T, QueueError>;

/// Configuration result type alias
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Mirror controller result type alias
pub type MirrorResult<T> = std::result::Result<T, AppError>;
