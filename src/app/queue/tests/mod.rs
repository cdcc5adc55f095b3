//! Unit tests for the work queue
//!
//! Focus on the completion barrier: outstanding counts, drain notification,
//! and follow-on work submitted while an item is still being processed.

#[cfg(test)]
mod integration_tests {
    use super::super::*;
    use crate::app::models::{AssetChecksum, AssetRecord};
    use crate::errors::QueueError;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::time::{sleep, timeout};
    use tokio_util::sync::CancellationToken;

    fn create_test_asset(name: &str) -> AssetRecord {
        AssetRecord {
            relative_path: format!("org/acme/{}", name),
            download_url: format!("http://nexus.test/repository/releases/org/acme/{}", name),
            expected_checksum: AssetChecksum {
                sha1: "da39a3ee5e6b4b0d3255bfef95601890afd80709".to_string(),
            },
        }
    }

    #[tokio::test]
    async fn test_submit_and_complete_workflow() {
        let queue = WorkQueue::new();
        queue.submit_page(None).unwrap();
        queue.submit_download(create_test_asset("a.jar")).unwrap();

        assert_eq!(queue.outstanding(), 2);
        assert!(!queue.is_drained());

        let first = queue.next().await.unwrap();
        assert_eq!(first, WorkItem::FetchPage { continuation_token: None });
        queue.complete(first.kind());

        let second = queue.next().await.unwrap();
        assert_eq!(second.kind(), WorkKind::Download);
        queue.complete(second.kind());

        assert!(queue.is_drained());
        let stats = queue.stats();
        assert_eq!(stats.pages_submitted, 1);
        assert_eq!(stats.pages_completed, 1);
        assert_eq!(stats.downloads_submitted, 1);
        assert_eq!(stats.downloads_completed, 1);
        assert_eq!(stats.outstanding, 0);
    }

    #[tokio::test]
    async fn test_try_next_on_empty_queue() {
        let queue = WorkQueue::new();
        assert!(queue.try_next().is_none());
    }

    #[tokio::test]
    async fn test_wait_until_drained_returns_when_last_item_completes() {
        let queue = Arc::new(WorkQueue::new());
        queue.submit_page(None).unwrap();

        let waiter = {
            let queue = queue.clone();
            tokio::spawn(async move { queue.wait_until_drained().await })
        };

        sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());

        let item = queue.try_next().unwrap();
        queue.complete(item.kind());

        timeout(Duration::from_secs(1), waiter)
            .await
            .expect("waiter should be released")
            .unwrap();
    }

    /// A page task submits its follow-on page before it completes, so the
    /// queue never looks drained between the two pages.
    #[tokio::test]
    async fn test_follow_on_work_keeps_queue_open() {
        let queue = Arc::new(WorkQueue::new());
        queue.submit_page(None).unwrap();

        let waiter = {
            let queue = queue.clone();
            tokio::spawn(async move { queue.wait_until_drained().await })
        };

        let page = queue.try_next().unwrap();
        queue.submit_page(Some("tok2".to_string())).unwrap();
        queue.submit_download(create_test_asset("a.jar")).unwrap();
        queue.complete(page.kind());

        sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());
        assert_eq!(queue.outstanding(), 2);

        while let Some(item) = queue.try_next() {
            queue.complete(item.kind());
        }

        timeout(Duration::from_secs(1), waiter)
            .await
            .expect("waiter should be released")
            .unwrap();
        assert_eq!(queue.stats().pages_completed, 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_worker_simulation() {
        let queue = Arc::new(WorkQueue::new());
        for i in 0..200 {
            queue
                .submit_download(create_test_asset(&format!("{}.jar", i)))
                .unwrap();
        }

        let stop = CancellationToken::new();
        let mut handles = Vec::new();
        for _ in 0..8 {
            let queue = queue.clone();
            let stop = stop.clone();
            handles.push(tokio::spawn(async move {
                let mut handled = 0;
                loop {
                    let item = tokio::select! {
                        biased;
                        _ = stop.cancelled() => break,
                        item = queue.next() => item,
                    };
                    let Some(item) = item else { break };
                    tokio::task::yield_now().await;
                    queue.complete(item.kind());
                    handled += 1;
                }
                handled
            }));
        }

        timeout(Duration::from_secs(5), queue.wait_until_drained())
            .await
            .unwrap();
        stop.cancel();

        let mut total = 0;
        for handle in handles {
            total += handle.await.unwrap();
        }

        assert_eq!(total, 200);
        assert!(queue.is_drained());
        assert_eq!(queue.stats().downloads_completed, 200);
    }

    #[tokio::test]
    async fn test_submit_after_close_fails_without_leaking() {
        let queue = WorkQueue::new();
        queue.close().await;

        let result = queue.submit_page(None);
        assert!(matches!(result, Err(QueueError::QueueClosed)));
        assert!(queue.is_drained());
        assert!(queue.next().await.is_none());
    }

    #[test]
    fn test_stats_summary() {
        let stats = QueueStats {
            pages_submitted: 3,
            pages_completed: 1,
            downloads_submitted: 10,
            downloads_completed: 4,
            outstanding: 8,
        };
        assert_eq!(
            stats.summary(),
            "2 page task(s) and 6 download task(s) outstanding"
        );
    }
}
