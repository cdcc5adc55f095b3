//! Run-level tests for the mirror controller
//!
//! Each test drives a complete run against a wiremock server and checks the
//! session outcome together with the final counters.

use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::*;
use crate::app::client::ClientConfig;
use crate::app::hash::Sha1Hash;
use crate::errors::{AppError, StorageError};

fn test_client() -> Arc<NexusClient> {
    let config = ClientConfig {
        rate_limit_rps: 1000,
        transient_retries: 0,
        retry_base_delay: Duration::from_millis(1),
        ..Default::default()
    };
    Arc::new(NexusClient::new(&config).unwrap())
}

fn test_config() -> CoordinatorConfig {
    CoordinatorConfig::default()
        .with_worker_count(4)
        .with_poll_interval(Duration::from_millis(50))
        .with_shutdown_timeout(Duration::from_secs(5))
        .with_download_attempts(3, Duration::ZERO)
}

fn coordinates(server: &MockServer) -> RepositoryCoordinates {
    RepositoryCoordinates::parse(&server.uri(), "releases").unwrap()
}

fn asset_json(server: &MockServer, relative_path: &str, sha1: &str) -> serde_json::Value {
    serde_json::json!({
        "path": relative_path,
        "downloadUrl": format!("{}/repository/releases/{}", server.uri(), relative_path),
        "checksum": {"sha1": sha1}
    })
}

fn sha1_hex(content: &[u8]) -> String {
    Sha1Hash::digest_bytes(content).to_hex()
}

async fn mount_page(
    server: &MockServer,
    token: Option<&str>,
    items: Vec<serde_json::Value>,
    next: Option<&str>,
) {
    let body = serde_json::json!({"items": items, "continuationToken": next});
    let mock = Mock::given(method("GET")).and(path("/service/rest/v1/assets"));
    let mock = match token {
        Some(token) => mock.and(query_param("continuationToken", token)),
        None => mock.and(query_param_is_missing("continuationToken")),
    };
    mock.respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(1)
        .mount(server)
        .await;
}

async fn mount_asset(server: &MockServer, relative_path: &str, content: &[u8]) {
    Mock::given(method("GET"))
        .and(path(format!("/repository/releases/{}", relative_path)))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(content.to_vec()))
        .mount(server)
        .await;
}

/// Two listing pages, the second reached through a continuation token.
#[tokio::test]
async fn test_two_page_repository_is_mirrored() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        None,
        vec![
            asset_json(&server, "org/acme/a/1.0/a-1.0.jar", &sha1_hex(b"a")),
            asset_json(&server, "org/acme/b/1.0/b-1.0.jar", &sha1_hex(b"b")),
        ],
        Some("tok2"),
    )
    .await;
    mount_page(
        &server,
        Some("tok2"),
        vec![asset_json(&server, "org/acme/c/1.0/c-1.0.pom", &sha1_hex(b"c"))],
        None,
    )
    .await;
    mount_asset(&server, "org/acme/a/1.0/a-1.0.jar", b"a").await;
    mount_asset(&server, "org/acme/b/1.0/b-1.0.jar", b"b").await;
    mount_asset(&server, "org/acme/c/1.0/c-1.0.pom", b"c").await;

    let temp_dir = TempDir::new().unwrap();
    let destination = temp_dir.path().join("mirror");

    let controller = MirrorController::new(test_config(), test_client());
    let result = controller
        .run(coordinates(&server), Some(&destination))
        .await
        .unwrap();

    assert_eq!(result.outcome, RunOutcome::Completed);
    assert!(result.is_success());
    assert_eq!(result.counters.discovered, 3);
    assert_eq!(result.counters.processed, 3);
    assert_eq!(result.counters.verified, 3);
    assert_eq!(result.counters.pages_fetched, 2);
    assert_eq!(result.destination, destination);

    for (relative_path, content) in [
        ("org/acme/a/1.0/a-1.0.jar", b"a"),
        ("org/acme/b/1.0/b-1.0.jar", b"b"),
        ("org/acme/c/1.0/c-1.0.pom", b"c"),
    ] {
        let bytes = tokio::fs::read(destination.join(relative_path))
            .await
            .unwrap();
        assert_eq!(bytes, content);
    }
}

#[tokio::test]
async fn test_empty_repository_completes() {
    let server = MockServer::start().await;
    mount_page(&server, None, vec![], None).await;

    let controller = MirrorController::new(test_config(), test_client());
    let result = controller.run(coordinates(&server), None).await.unwrap();

    assert_eq!(result.outcome, RunOutcome::Completed);
    assert_eq!(result.counters.discovered, 0);
    assert!(result.destination.is_dir());
    let _ = std::fs::remove_dir_all(&result.destination);
}

#[tokio::test]
async fn test_non_empty_destination_fails_before_any_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let temp_dir = TempDir::new().unwrap();
    std::fs::write(temp_dir.path().join("existing.txt"), b"keep me").unwrap();

    let controller = MirrorController::new(test_config(), test_client());
    let result = controller
        .run(coordinates(&server), Some(temp_dir.path()))
        .await;

    assert!(matches!(
        result,
        Err(AppError::Storage(StorageError::DestinationNotEmpty { .. }))
    ));
}

#[tokio::test]
async fn test_invalid_config_fails_before_any_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let controller = MirrorController::new(test_config().with_worker_count(0), test_client());
    let result = controller.run(coordinates(&server), None).await;
    assert!(matches!(result, Err(AppError::Config(_))));
}

#[tokio::test]
async fn test_listing_failure_aborts_by_default() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        None,
        vec![asset_json(&server, "a.jar", &sha1_hex(b"a"))],
        Some("tok2"),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/service/rest/v1/assets"))
        .and(query_param("continuationToken", "tok2"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    mount_asset(&server, "a.jar", b"a").await;

    let temp_dir = TempDir::new().unwrap();
    let controller = MirrorController::new(test_config(), test_client());
    let result = controller
        .run(coordinates(&server), Some(temp_dir.path()))
        .await
        .unwrap();

    assert!(matches!(result.outcome, RunOutcome::Aborted { .. }));
    assert!(!result.is_success());
    assert_eq!(result.counters.pages_failed, 1);
}

#[tokio::test]
async fn test_listing_failure_skipped_when_configured() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        None,
        vec![
            asset_json(&server, "a.jar", &sha1_hex(b"a")),
            asset_json(&server, "b.jar", &sha1_hex(b"b")),
        ],
        Some("tok2"),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/service/rest/v1/assets"))
        .and(query_param("continuationToken", "tok2"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    mount_asset(&server, "a.jar", b"a").await;
    mount_asset(&server, "b.jar", b"b").await;

    let temp_dir = TempDir::new().unwrap();
    let config = test_config().with_listing_failure(ListingFailurePolicy::Skip);
    let controller = MirrorController::new(config, test_client());
    let result = controller
        .run(coordinates(&server), Some(temp_dir.path()))
        .await
        .unwrap();

    assert_eq!(result.outcome, RunOutcome::Completed);
    assert_eq!(result.counters.discovered, 2);
    assert_eq!(result.counters.processed, 2);
    assert_eq!(result.counters.pages_failed, 1);
}

#[tokio::test]
async fn test_abandoned_asset_does_not_stop_run_by_default() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        None,
        vec![
            asset_json(&server, "good.jar", &sha1_hex(b"good")),
            asset_json(&server, "bad.jar", &sha1_hex(b"expected")),
        ],
        None,
    )
    .await;
    mount_asset(&server, "good.jar", b"good").await;
    Mock::given(method("GET"))
        .and(path("/repository/releases/bad.jar"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"corrupt".to_vec()))
        .expect(3)
        .mount(&server)
        .await;

    let temp_dir = TempDir::new().unwrap();
    let controller = MirrorController::new(test_config(), test_client());
    let result = controller
        .run(coordinates(&server), Some(temp_dir.path()))
        .await
        .unwrap();

    assert_eq!(result.outcome, RunOutcome::Completed);
    assert!(!result.is_success());
    assert_eq!(result.counters.processed, 2);
    assert_eq!(result.counters.verified, 1);
    assert_eq!(result.counters.abandoned, 1);
}

#[tokio::test]
async fn test_abandoned_asset_aborts_when_stopping_on_failure() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        None,
        vec![asset_json(&server, "bad.jar", &sha1_hex(b"expected"))],
        None,
    )
    .await;
    mount_asset(&server, "bad.jar", b"corrupt").await;

    let temp_dir = TempDir::new().unwrap();
    let config = test_config().with_continue_on_asset_failure(false);
    let controller = MirrorController::new(config, test_client());
    let result = controller
        .run(coordinates(&server), Some(temp_dir.path()))
        .await
        .unwrap();

    match result.outcome {
        RunOutcome::Aborted { reason } => assert!(reason.contains("bad.jar")),
        other => panic!("Expected aborted run, got {:?}", other),
    }
}

#[tokio::test]
async fn test_external_cancel_stops_run() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/service/rest/v1/assets"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"items": []}))
                .set_delay(Duration::from_secs(30)),
        )
        .mount(&server)
        .await;

    let temp_dir = TempDir::new().unwrap();
    let controller = MirrorController::new(test_config(), test_client());
    let control = controller.control();

    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        control.cancel();
    });

    let result = tokio::time::timeout(
        Duration::from_secs(10),
        controller.run(coordinates(&server), Some(temp_dir.path())),
    )
    .await
    .expect("cancelled run should stop promptly")
    .unwrap();

    assert_eq!(result.outcome, RunOutcome::Cancelled);
}

#[tokio::test]
async fn test_deadline_stops_run() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/service/rest/v1/assets"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"items": []}))
                .set_delay(Duration::from_secs(30)),
        )
        .mount(&server)
        .await;

    let temp_dir = TempDir::new().unwrap();
    let config = test_config().with_deadline(Some(Duration::from_millis(200)));
    let controller = MirrorController::new(config, test_client());

    let result = tokio::time::timeout(
        Duration::from_secs(10),
        controller.run(coordinates(&server), Some(temp_dir.path())),
    )
    .await
    .expect("run should stop at the deadline")
    .unwrap();

    assert_eq!(result.outcome, RunOutcome::DeadlineExceeded);
}

#[tokio::test]
async fn test_progress_subscribers_see_final_counts() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        None,
        vec![asset_json(&server, "a.jar", &sha1_hex(b"a"))],
        None,
    )
    .await;
    mount_asset(&server, "a.jar", b"a").await;

    let temp_dir = TempDir::new().unwrap();
    let controller = MirrorController::new(test_config(), test_client());
    let updates = controller.tracker().subscribe();

    controller
        .run(coordinates(&server), Some(temp_dir.path()))
        .await
        .unwrap();

    let last = *updates.borrow();
    assert_eq!(last.discovered, 1);
    assert_eq!(last.processed, 1);
}
