//! Tests for metrics integration.
//!
//! Uses `metrics_util::debugging::DebuggingRecorder` to capture and assert
//! on emitted metrics without needing a real exporter.

use std::time::Duration;

use metrics_util::MetricKind;
use metrics_util::debugging::{DebugValue, DebuggingRecorder};

use biblion::{EntryStatus, QueryCache, telemetry};

// ============================================================================
// Snapshot type alias for readability
// ============================================================================

type SnapshotVec = Vec<(
    metrics_util::CompositeKey,
    Option<metrics::Unit>,
    Option<metrics::SharedString>,
    DebugValue,
)>;

/// Sum all counter values matching a given metric name.
fn counter_total(snapshot: &SnapshotVec, name: &str) -> u64 {
    snapshot
        .iter()
        .filter(|(key, _, _, _)| key.kind() == MetricKind::Counter && key.key().name() == name)
        .map(|(_, _, _, value)| match value {
            DebugValue::Counter(v) => *v,
            _ => 0,
        })
        .sum()
}

/// Runs async code within a local recorder scope on the multi-thread runtime.
///
/// `block_in_place` ensures the sync `with_local_recorder` closure stays
/// on the current thread while `block_on` drives the inner async work.
#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
async fn cache_reads_record_hits_and_misses() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();

    tokio::task::block_in_place(|| {
        metrics::with_local_recorder(&recorder, || {
            tokio::runtime::Handle::current().block_on(async {
                let cache = QueryCache::new();
                let key = biblion::keys::books_list();
                let window = Duration::from_secs(60);

                // Miss, then hit.
                cache
                    .read(&key, window, || async { Ok(1u32) })
                    .await
                    .expect("first read");
                cache
                    .read(&key, window, || async { Ok(2u32) })
                    .await
                    .expect("second read");
            })
        })
    });

    let snapshot = snapshotter.snapshot().into_vec();
    assert_eq!(counter_total(&snapshot, telemetry::CACHE_MISSES_TOTAL), 1);
    assert_eq!(counter_total(&snapshot, telemetry::CACHE_HITS_TOTAL), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
async fn attached_reads_record_joins() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();

    tokio::task::block_in_place(|| {
        metrics::with_local_recorder(&recorder, || {
            tokio::runtime::Handle::current().block_on(async {
                let cache = QueryCache::new();
                let key = biblion::keys::books_list();
                let window = Duration::from_secs(60);

                let slow = {
                    let cache = cache.clone();
                    let key = key.clone();
                    tokio::spawn(async move {
                        cache
                            .read(&key, window, || async {
                                tokio::time::sleep(Duration::from_millis(30)).await;
                                Ok(1u32)
                            })
                            .await
                    })
                };
                // Wait until the slow fetch is registered before reading.
                while cache.status(&key, window) != Some(EntryStatus::Fetching) {
                    tokio::time::sleep(Duration::from_millis(1)).await;
                }

                cache
                    .read(&key, window, || async { Ok(2u32) })
                    .await
                    .expect("attached read");
                slow.await.expect("join").expect("slow read");
            })
        })
    });

    let snapshot = snapshotter.snapshot().into_vec();
    assert_eq!(counter_total(&snapshot, telemetry::CACHE_JOINS_TOTAL), 1);
}
