// Retention prune tests

mod common;

use common::{T0, proc_cpu, stats};
use psmon::maintenance::{MaintenanceConfig, prune_once};
use psmon::store::{MemoryStore, MetricsStore};
use std::sync::Arc;

const DAY_US: i64 = 86_400 * 1_000_000;

fn config(retention_days: u32) -> MaintenanceConfig {
    MaintenanceConfig {
        retention_days,
        prune_interval_secs: 3600,
        vacuum_schedule: None,
        vacuum_interval_secs: 86_400,
    }
}

#[tokio::test]
async fn prune_once_drops_rows_past_retention() {
    let store = MemoryStore::new();
    store.write_system_stats(T0, &stats(1.0, 1.0, 1.0)).await.unwrap();
    store
        .write_system_stats(T0 + 5 * DAY_US, &stats(2.0, 1.0, 1.0))
        .await
        .unwrap();
    store
        .write_process_samples(T0, &[proc_cpu(1, "old", 3.0)])
        .await
        .unwrap();

    let removed = prune_once(&store, &config(7), T0 + 8 * DAY_US).await.unwrap();
    assert_eq!(removed, 2);
    let left = store.system_stats_between(0, i64::MAX).await.unwrap();
    assert_eq!(left.len(), 1);
    assert_eq!(left[0].capture_time, T0 + 5 * DAY_US);
    assert!(store.process_samples_between(0, i64::MAX).await.unwrap().is_empty());
}

#[tokio::test]
async fn prune_once_keeps_everything_inside_retention() {
    let store = MemoryStore::new();
    store.write_system_stats(T0, &stats(1.0, 1.0, 1.0)).await.unwrap();
    let removed = prune_once(&store, &config(7), T0 + DAY_US).await.unwrap();
    assert_eq!(removed, 0);
}

#[tokio::test(start_paused = true)]
async fn maintenance_task_stops_on_shutdown() {
    let store: Arc<dyn MetricsStore> = Arc::new(MemoryStore::new());
    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
    let handle = psmon::maintenance::spawn(store, config(7), shutdown_rx);
    tokio::time::sleep(tokio::time::Duration::from_secs(1)).await;
    let _ = shutdown_tx.send(());
    handle.await.unwrap();
}

#[tokio::test]
async fn join_background_reports_panicked_task() {
    let clean = tokio::spawn(async {});
    assert!(psmon::error::join_background("clean", clean).await);

    let panicked = tokio::spawn(async { panic!("task blew up") });
    assert!(!psmon::error::join_background("panicked", panicked).await);
}
