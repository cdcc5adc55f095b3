//! Command-line argument parsing for Nexus Mirror
//!
//! This module defines the CLI structure using clap derive macros. A single
//! invocation mirrors one repository; flags override the configuration file.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser};

use crate::app::coordinator::{CoordinatorConfig, ListingFailurePolicy};

/// Nexus Mirror - Copy every asset of a Nexus 3 repository to disk
#[derive(Parser, Debug)]
#[command(
    name = "nexus_mirror",
    version,
    about = "Mirror every asset of a Nexus 3 repository to a local directory",
    long_about = "Walks the paginated asset listing of a Sonatype Nexus 3 repository and downloads
every asset concurrently, verifying each file against its published SHA-1 checksum."
)]
pub struct Cli {
    /// Base URL of the Nexus instance (e.g. http://localhost:8081)
    #[arg(value_name = "URL")]
    pub url: String,

    /// Identifier of the repository to mirror
    #[arg(value_name = "REPOSITORY")]
    pub repository: String,

    /// Empty or missing directory to mirror into (temporary directory when omitted)
    #[arg(value_name = "DESTINATION")]
    pub destination: Option<PathBuf>,

    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Mirror run options
    #[command(flatten)]
    pub mirror: MirrorArgs,
}

/// Logging and configuration options
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Enable verbose logging (debug level)
    #[arg(short, long)]
    pub verbose: bool,

    /// Very verbose logging (trace level)
    #[arg(long)]
    pub very_verbose: bool,

    /// Quiet mode - only errors are logged
    #[arg(short, long)]
    pub quiet: bool,

    /// Configuration file path
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

/// Options overriding the `[mirror]` configuration section
#[derive(Args, Debug, Clone, Default)]
pub struct MirrorArgs {
    /// Number of concurrent workers
    #[arg(short = 'w', long)]
    pub workers: Option<usize>,

    /// Download attempts per asset
    #[arg(long)]
    pub max_attempts: Option<u32>,

    /// Stop the run after this many seconds
    #[arg(long, value_name = "SECONDS")]
    pub deadline: Option<u64>,

    /// Keep going when a listing page cannot be fetched
    #[arg(long)]
    pub skip_failed_pages: bool,

    /// Abort the run as soon as one asset is abandoned
    #[arg(long)]
    pub stop_on_asset_failure: bool,

    /// Show a progress bar
    #[arg(long)]
    pub progress: bool,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Log level requested by verbosity flags, if any
    ///
    /// `None` means the configured level applies.
    pub fn log_level(&self) -> Option<tracing::Level> {
        if self.global.quiet {
            Some(tracing::Level::ERROR)
        } else if self.global.very_verbose {
            Some(tracing::Level::TRACE)
        } else if self.global.verbose {
            Some(tracing::Level::DEBUG)
        } else {
            None
        }
    }

    /// Validate argument combinations
    pub fn validate(&self) -> Result<(), String> {
        if self.global.quiet && (self.global.verbose || self.global.very_verbose) {
            return Err("--quiet cannot be combined with --verbose".to_string());
        }
        self.mirror.validate()
    }
}

impl MirrorArgs {
    /// Validate argument values
    pub fn validate(&self) -> Result<(), String> {
        if self.workers == Some(0) {
            return Err("Worker count must be greater than 0".to_string());
        }

        if self.max_attempts == Some(0) {
            return Err("At least one download attempt is required".to_string());
        }

        if self.deadline == Some(0) {
            return Err("Deadline must be at least one second".to_string());
        }

        Ok(())
    }

    /// Apply command-line overrides to a configuration
    pub fn apply_to(&self, mut config: CoordinatorConfig) -> CoordinatorConfig {
        if let Some(workers) = self.workers {
            config = config.with_worker_count(workers);
        }

        if let Some(max_attempts) = self.max_attempts {
            config.downloader.max_attempts = max_attempts;
        }

        if let Some(seconds) = self.deadline {
            config = config.with_deadline(Some(Duration::from_secs(seconds)));
        }

        if self.skip_failed_pages {
            config = config.with_listing_failure(ListingFailurePolicy::Skip);
        }

        if self.stop_on_asset_failure {
            config = config.with_continue_on_asset_failure(false);
        }

        config
    }
}
