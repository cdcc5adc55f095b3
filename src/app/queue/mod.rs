//! Work queue shared by the worker pool
//!
//! Carries two kinds of work: listing page fetches and asset downloads. Page
//! tasks discover more work while the run is in progress, so the queue also
//! acts as the completion barrier: it knows how many submitted items are still
//! outstanding and wakes waiters when that number reaches zero.
//!
//! # Basic Usage
//!
//! ```rust,no_run
//! use nexus_mirror::app::queue::{WorkItem, WorkQueue};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let queue = WorkQueue::new();
//! queue.submit_page(None)?;
//!
//! while let Some(item) = queue.try_next() {
//!     let kind = item.kind();
//!     if let WorkItem::FetchPage { continuation_token } = item {
//!         println!("fetch page {:?}", continuation_token);
//!     }
//!     queue.complete(kind);
//! }
//!
//! queue.wait_until_drained().await;
//! # Ok(())
//! # }
//! ```

mod core;
mod types;

#[cfg(test)]
mod tests;

pub use self::core::WorkQueue;
pub use types::{QueueStats, WorkItem, WorkKind};
