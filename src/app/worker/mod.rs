//! Mirror worker system
//!
//! A fixed number of workers share the work queue. Each worker takes whatever
//! item is next, page fetch or download, and executes it with
//! [`MirrorTasks`]. Page tasks feed new items back into the same queue.
//!
//! # Module Organization
//!
//! - [`config`] - Pool size and shutdown timeout
//! - [`tasks`] - Page and download task bodies plus failure policies
//! - [`core`] - Individual worker loop
//! - [`pool`] - Worker pool lifecycle
//!
//! # Basic Usage
//!
//! ```rust,no_run
//! use nexus_mirror::app::worker::{MirrorTasks, WorkerConfig, WorkerPool};
//! use nexus_mirror::app::queue::WorkQueue;
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example(tasks: Arc<MirrorTasks>, queue: Arc<WorkQueue>) -> Result<(), Box<dyn std::error::Error>> {
//! let mut pool = WorkerPool::new(WorkerConfig::default(), queue.clone(), tasks, CancellationToken::new());
//! pool.start()?;
//!
//! queue.submit_page(None)?;
//! queue.wait_until_drained().await;
//!
//! pool.shutdown().await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod core;
pub mod pool;
pub mod tasks;

#[cfg(test)]
mod tests;

pub use config::WorkerConfig;
pub use self::core::MirrorWorker;
pub use pool::{PoolState, WorkerPool};
pub use tasks::{MirrorTasks, TaskPolicy};
