mod common;

use common::{source, Behavior, FakeClient};
use iptv_manager::{DownloadCoordinator, FetchPolicy, SourceFetcher};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

fn coordinator(client: Arc<FakeClient>, data_dir: &std::path::Path, max_workers: usize) -> DownloadCoordinator {
    let fetcher = SourceFetcher::new(
        client,
        data_dir,
        FetchPolicy {
            retry_count: 2,
            retry_delay: Duration::ZERO,
        },
    );
    DownloadCoordinator::new(Arc::new(fetcher), max_workers)
}

#[tokio::test]
async fn one_failing_source_does_not_affect_the_others() {
    let ids = ["a", "b", "c", "d", "e"];

    for failing in 0..ids.len() {
        let dir = TempDir::new().unwrap();
        let sources: Vec<_> = ids.iter().map(|id| source(id)).collect();
        let client = Arc::new(FakeClient::new(sources.iter().enumerate().map(|(i, s)| {
            let behavior = if i == failing {
                Behavior::Status(500)
            } else {
                Behavior::Playlist
            };
            (s.url.clone(), behavior)
        })));

        let results = coordinator(client, dir.path(), 3).run_all(&sources).await;

        assert_eq!(results.len(), ids.len());
        assert_eq!(results.failed_ids(), vec![ids[failing]]);
        assert_eq!(results.success_count(), ids.len() - 1);
    }
}

#[tokio::test]
async fn outcomes_follow_source_order() {
    let dir = TempDir::new().unwrap();
    let sources: Vec<_> = ["zulu", "alpha", "mike"].iter().map(|id| source(id)).collect();
    let client = Arc::new(
        FakeClient::new(sources.iter().map(|s| (s.url.clone(), Behavior::Playlist)))
            .with_delay(Duration::from_millis(5)),
    );

    let results = coordinator(client, dir.path(), 3).run_all(&sources).await;

    let order: Vec<&str> = results.iter().map(|o| o.source_id.as_str()).collect();
    assert_eq!(order, vec!["zulu", "alpha", "mike"]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn worker_pool_is_bounded() {
    let dir = TempDir::new().unwrap();
    let sources: Vec<_> = (0..6).map(|i| source(&format!("s{}", i))).collect();
    let client = Arc::new(
        FakeClient::new(sources.iter().map(|s| (s.url.clone(), Behavior::Playlist)))
            .with_delay(Duration::from_millis(30)),
    );

    let results = coordinator(client.clone(), dir.path(), 2).run_all(&sources).await;

    assert!(results.all_succeeded());
    assert_eq!(client.calls(), 6);
    assert!(client.peak_concurrency() <= 2, "peak {}", client.peak_concurrency());
}

#[tokio::test]
async fn panicking_fetch_becomes_a_failed_outcome() {
    let dir = TempDir::new().unwrap();
    let sources = vec![source("good"), source("bad"), source("fine")];
    let client = Arc::new(FakeClient::new([
        (sources[0].url.clone(), Behavior::Playlist),
        (sources[1].url.clone(), Behavior::Panic),
        (sources[2].url.clone(), Behavior::Playlist),
    ]));

    let results = coordinator(client, dir.path(), 4).run_all(&sources).await;

    assert_eq!(results.len(), 3);
    let bad = results.get("bad").unwrap();
    assert!(!bad.success);
    assert!(bad.error.contains("panicked"), "{}", bad.error);
    assert!(results.get("good").unwrap().success);
    assert!(results.get("fine").unwrap().success);
}

#[tokio::test]
async fn always_failing_source_is_attempted_retry_count_times() {
    let dir = TempDir::new().unwrap();
    let sources = vec![source("down")];
    let client = Arc::new(FakeClient::new([(sources[0].url.clone(), Behavior::Status(502))]));

    let results = coordinator(client.clone(), dir.path(), 4).run_all(&sources).await;

    assert!(!results.all_succeeded());
    assert_eq!(client.calls(), 2);
}
