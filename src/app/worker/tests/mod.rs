//! Tests for task execution and the worker pool
//!
//! A wiremock server stands in for the Nexus listing endpoint and the asset
//! downloads.

use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::*;
use crate::app::client::{CatalogClient, ClientConfig, NexusClient};
use crate::app::coordinator::{ListingFailurePolicy, ProgressTracker, RunControl};
use crate::app::destination::DestinationRoot;
use crate::app::downloader::{AssetDownloader, DownloaderConfig};
use crate::app::hash::Sha1Hash;
use crate::app::models::RepositoryCoordinates;
use crate::app::queue::{WorkItem, WorkKind, WorkQueue};
use crate::errors::QueueError;

struct Harness {
    tasks: Arc<MirrorTasks>,
    queue: Arc<WorkQueue>,
    tracker: Arc<ProgressTracker>,
    control: RunControl,
    _temp_dir: TempDir,
    root: std::path::PathBuf,
}

fn harness(server: &MockServer, policy: TaskPolicy) -> Harness {
    let client_config = ClientConfig {
        rate_limit_rps: 1000,
        transient_retries: 0,
        retry_base_delay: Duration::from_millis(1),
        ..Default::default()
    };
    let client = Arc::new(NexusClient::new(&client_config).unwrap());
    let coordinates = RepositoryCoordinates::parse(&server.uri(), "releases").unwrap();

    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().to_path_buf();
    let queue = Arc::new(WorkQueue::new());
    let tracker = Arc::new(ProgressTracker::new());
    let control = RunControl::new();

    let downloader = AssetDownloader::new(
        client.clone(),
        tracker.clone(),
        DownloaderConfig {
            max_attempts: 2,
            retry_delay: Duration::ZERO,
        },
    );
    let tasks = Arc::new(MirrorTasks::new(
        CatalogClient::new(client, coordinates),
        downloader,
        DestinationRoot::from_existing(&root),
        queue.clone(),
        tracker.clone(),
        control.clone(),
        policy,
    ));

    Harness {
        tasks,
        queue,
        tracker,
        control,
        _temp_dir: temp_dir,
        root,
    }
}

fn asset_json(server: &MockServer, relative_path: &str, content: &[u8]) -> serde_json::Value {
    serde_json::json!({
        "path": relative_path,
        "downloadUrl": format!("{}/repository/releases/{}", server.uri(), relative_path),
        "checksum": {
            "sha1": Sha1Hash::digest_bytes(content).to_hex(),
            "md5": "ignored"
        }
    })
}

async fn mount_asset(server: &MockServer, relative_path: &str, content: &[u8]) {
    Mock::given(method("GET"))
        .and(path(format!("/repository/releases/{}", relative_path)))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(content.to_vec()))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_page_task_submits_next_page_before_downloads() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/service/rest/v1/assets"))
        .and(query_param_is_missing("continuationToken"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "items": [
                asset_json(&server, "a.jar", b"a"),
                asset_json(&server, "b.jar", b"b"),
            ],
            "continuationToken": "tok2"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let h = harness(&server, TaskPolicy::default());
    h.tasks
        .execute(WorkItem::FetchPage {
            continuation_token: None,
        })
        .await;

    assert_eq!(
        h.queue.try_next(),
        Some(WorkItem::FetchPage {
            continuation_token: Some("tok2".to_string())
        })
    );
    assert_eq!(h.queue.try_next().map(|i| i.kind()), Some(WorkKind::Download));
    assert_eq!(h.queue.try_next().map(|i| i.kind()), Some(WorkKind::Download));
    assert!(h.queue.try_next().is_none());

    let counters = h.tracker.snapshot();
    assert_eq!(counters.discovered, 2);
    assert_eq!(counters.pages_fetched, 1);
    assert_eq!(counters.processed, 0);
}

#[tokio::test]
async fn test_last_page_submits_no_follow_on_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/service/rest/v1/assets"))
        .and(query_param("continuationToken", "tok2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "items": [asset_json(&server, "c.jar", b"c")],
            "continuationToken": null
        })))
        .mount(&server)
        .await;

    let h = harness(&server, TaskPolicy::default());
    h.tasks
        .execute(WorkItem::FetchPage {
            continuation_token: Some("tok2".to_string()),
        })
        .await;

    assert_eq!(h.queue.try_next().map(|i| i.kind()), Some(WorkKind::Download));
    assert!(h.queue.try_next().is_none());
}

#[tokio::test]
async fn test_page_failure_aborts_under_abort_policy() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/service/rest/v1/assets"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let h = harness(&server, TaskPolicy::default());
    h.tasks
        .execute(WorkItem::FetchPage {
            continuation_token: None,
        })
        .await;

    assert!(h.control.is_cancelled());
    let reason = h.control.abort_reason().unwrap();
    assert!(reason.contains("releases"), "unexpected reason: {}", reason);
    assert_eq!(h.tracker.snapshot().pages_failed, 1);
    assert!(h.queue.is_drained());
}

#[tokio::test]
async fn test_page_failure_is_skipped_under_skip_policy() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/service/rest/v1/assets"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let policy = TaskPolicy {
        listing_failure: ListingFailurePolicy::Skip,
        ..Default::default()
    };
    let h = harness(&server, policy);
    h.tasks
        .execute(WorkItem::FetchPage {
            continuation_token: None,
        })
        .await;

    assert!(!h.control.is_cancelled());
    assert_eq!(h.tracker.snapshot().pages_failed, 1);
}

#[tokio::test]
async fn test_abandoned_download_aborts_when_stopping_on_failure() {
    let server = MockServer::start().await;
    mount_asset(&server, "bad.jar", b"served").await;

    let policy = TaskPolicy {
        continue_on_asset_failure: false,
        ..Default::default()
    };
    let h = harness(&server, policy);
    let asset = serde_json::from_value(asset_json(&server, "bad.jar", b"expected")).unwrap();

    h.tasks.execute(WorkItem::Download(asset)).await;

    assert!(h.control.abort_reason().unwrap().contains("bad.jar"));
    assert_eq!(h.tracker.snapshot().abandoned, 1);
}

#[tokio::test]
async fn test_abandoned_download_continues_by_default() {
    let server = MockServer::start().await;
    mount_asset(&server, "bad.jar", b"served").await;

    let h = harness(&server, TaskPolicy::default());
    let asset = serde_json::from_value(asset_json(&server, "bad.jar", b"expected")).unwrap();

    h.tasks.execute(WorkItem::Download(asset)).await;

    assert!(!h.control.is_cancelled());
    assert_eq!(h.tracker.snapshot().processed, 1);
}

#[tokio::test]
async fn test_pool_processes_all_work_until_drained() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/service/rest/v1/assets"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "items": [
                asset_json(&server, "org/a.jar", b"alpha"),
                asset_json(&server, "org/b.jar", b"beta"),
            ]
        })))
        .mount(&server)
        .await;
    mount_asset(&server, "org/a.jar", b"alpha").await;
    mount_asset(&server, "org/b.jar", b"beta").await;

    let h = harness(&server, TaskPolicy::default());
    let config = WorkerConfig {
        worker_count: 2,
        shutdown_timeout: Duration::from_secs(5),
    };
    let mut pool = WorkerPool::new(
        config,
        h.queue.clone(),
        h.tasks.clone(),
        CancellationToken::new(),
    );

    h.queue.submit_page(None).unwrap();
    pool.start().unwrap();
    assert_eq!(pool.state(), PoolState::Running);
    assert_eq!(pool.worker_count(), 2);

    tokio::time::timeout(Duration::from_secs(5), h.queue.wait_until_drained())
        .await
        .expect("queue should drain");

    let handled = pool.shutdown().await.unwrap();
    assert_eq!(handled, 3);

    let counters = h.tracker.snapshot();
    assert_eq!(counters.discovered, 2);
    assert_eq!(counters.verified, 2);
    assert_eq!(
        tokio::fs::read(h.root.join("org/b.jar")).await.unwrap(),
        b"beta"
    );
}

#[tokio::test]
async fn test_cancelled_workers_complete_interrupted_items() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/service/rest/v1/assets"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"items": []}))
                .set_delay(Duration::from_secs(10)),
        )
        .mount(&server)
        .await;

    let h = harness(&server, TaskPolicy::default());
    let cancel = CancellationToken::new();
    let mut pool = WorkerPool::new(
        WorkerConfig {
            worker_count: 1,
            shutdown_timeout: Duration::from_secs(5),
        },
        h.queue.clone(),
        h.tasks.clone(),
        cancel.clone(),
    );

    h.queue.submit_page(None).unwrap();
    pool.start().unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;

    cancel.cancel();
    tokio::time::timeout(Duration::from_secs(2), h.queue.wait_until_drained())
        .await
        .expect("interrupted item should be completed");

    assert_eq!(pool.shutdown().await.unwrap(), 1);
}

#[tokio::test]
async fn test_pool_cannot_start_twice() {
    let server = MockServer::start().await;
    let h = harness(&server, TaskPolicy::default());
    let mut pool = WorkerPool::new(
        WorkerConfig {
            worker_count: 1,
            shutdown_timeout: Duration::from_secs(1),
        },
        h.queue.clone(),
        h.tasks.clone(),
        CancellationToken::new(),
    );

    pool.start().unwrap();
    assert!(matches!(
        pool.start(),
        Err(QueueError::InvalidPoolState { .. })
    ));
    pool.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_shutdown_without_start() {
    let server = MockServer::start().await;
    let h = harness(&server, TaskPolicy::default());
    let pool = WorkerPool::new(
        WorkerConfig::default(),
        h.queue.clone(),
        h.tasks.clone(),
        CancellationToken::new(),
    );
    assert_eq!(pool.shutdown().await.unwrap(), 0);
}
