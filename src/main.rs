//! Nexus Mirror CLI application
//!
//! Command-line interface for mirroring every asset of a Sonatype Nexus 3
//! repository into a local directory, with concurrent downloads and SHA-1
//! verification.

use std::process;

use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use nexus_mirror::cli::{handle_mirror, Cli};
use nexus_mirror::config::AppConfig;
use nexus_mirror::errors::Result;

#[tokio::main]
async fn main() {
    let result = run().await;

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Main application logic
async fn run() -> Result<()> {
    let cli = Cli::parse_args();
    let config = AppConfig::load(cli.global.config.as_deref()).await?;

    init_logging(&cli, &config);

    info!("Nexus Mirror v{} starting", env!("CARGO_PKG_VERSION"));
    handle_mirror(&cli, &config).await
}

/// Initialize logging from CLI verbosity, falling back to the configured level
fn init_logging(cli: &Cli, config: &AppConfig) {
    let log_level = cli
        .log_level()
        .map(|level| level.to_string().to_lowercase())
        .unwrap_or_else(|| config.logging.level.to_lowercase());

    let mut filter = EnvFilter::from_default_env();
    match format!("nexus_mirror={}", log_level).parse() {
        Ok(directive) => filter = filter.add_directive(directive),
        Err(e) => eprintln!("Ignoring invalid log level '{}': {}", log_level, e),
    }

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(cli.global.very_verbose)
        .init();

    if cli.global.very_verbose {
        info!("Very verbose logging enabled");
    } else if cli.global.verbose {
        info!("Verbose logging enabled");
    }
}
