//! Nexus Mirror Library
//!
//! Mirrors every asset of a Sonatype Nexus 3 repository into a local
//! directory. The paginated asset listing is walked concurrently with the
//! downloads, and every file is verified against its published SHA-1.

pub mod app;
pub mod cli;
pub mod config;
pub mod constants;
pub mod errors;

// Re-export commonly used types for convenience
pub use errors::{AppError, Result};
