//! Command-line interface components
//!
//! This module contains CLI-specific code for the Nexus Mirror application,
//! including argument parsing, the mirror command, and progress display.

pub mod args;
pub mod commands;
pub mod progress;

pub use args::{Cli, GlobalArgs, MirrorArgs};
pub use commands::handle_mirror;
pub use progress::ProgressDisplay;
