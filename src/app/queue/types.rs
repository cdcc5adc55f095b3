//! Types carried by the work queue

use serde::{Deserialize, Serialize};

use crate::app::models::AssetRecord;

/// A unit of work picked up by one worker
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkItem {
    /// Fetch one listing page; `None` is the first page
    FetchPage { continuation_token: Option<String> },
    /// Download and verify one asset
    Download(AssetRecord),
}

impl WorkItem {
    pub fn kind(&self) -> WorkKind {
        match self {
            WorkItem::FetchPage { .. } => WorkKind::Page,
            WorkItem::Download(_) => WorkKind::Download,
        }
    }
}

/// Which of the two task families an item belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkKind {
    Page,
    Download,
}

/// Point-in-time view of queue activity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueStats {
    pub pages_submitted: u64,
    pub pages_completed: u64,
    pub downloads_submitted: u64,
    pub downloads_completed: u64,
    /// Submitted but not yet completed, both kinds together
    pub outstanding: u64,
}

impl QueueStats {
    pub fn pages_outstanding(&self) -> u64 {
        self.pages_submitted.saturating_sub(self.pages_completed)
    }

    pub fn downloads_outstanding(&self) -> u64 {
        self.downloads_submitted
            .saturating_sub(self.downloads_completed)
    }

    /// One-line summary for periodic status logs
    pub fn summary(&self) -> String {
        format!(
            "{} page task(s) and {} download task(s) outstanding",
            self.pages_outstanding(),
            self.downloads_outstanding()
        )
    }
}
