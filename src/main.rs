use anyhow::Result;
use psmon::*;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::FormatTime;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(
            w,
            "{}",
            chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z")
        )
    }
}

const IN_MEMORY_PATH: &str = ":memory:";

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_timer(LocalTimer)
        .with_env_filter(filter)
        .init();

    let app_config = config::AppConfig::load()?;
    tracing::info!(package = version::NAME, version = version::VERSION, "starting");

    let (store, sqlite): (Arc<dyn store::MetricsStore>, Option<Arc<store::SqliteStore>>) =
        if app_config.database.path == IN_MEMORY_PATH {
            tracing::warn!("database.path is :memory:; samples are lost on exit");
            let memory: Arc<dyn store::MetricsStore> = Arc::new(store::MemoryStore::new());
            (memory, None)
        } else {
            let sqlite = Arc::new(
                store::SqliteStore::connect(
                    &app_config.database.path,
                    app_config.database.max_pool_size,
                )
                .await?,
            );
            sqlite.init().await?;
            let shared: Arc<dyn store::MetricsStore> = sqlite.clone();
            (shared, Some(sqlite))
        };

    let probe: Arc<dyn sysinfo_repo::HostProbe> = Arc::new(sysinfo_repo::SysinfoRepo::new());

    let (sampler_shutdown_tx, sampler_shutdown_rx) = tokio::sync::oneshot::channel();
    let sampler_handle = sampler::spawn(
        sampler::Sampler::new(
            probe.clone(),
            store.clone(),
            sampler::SamplerConfig {
                disk_usage_path: app_config.monitoring.disk_usage_path.clone(),
                max_processes_per_tick: app_config.monitoring.max_processes_per_tick,
            },
        ),
        sampler::ScheduleConfig {
            interval_secs: app_config.monitoring.metrics_interval_secs,
            stats_log_interval_secs: app_config.monitoring.stats_log_interval_secs,
        },
        sampler_shutdown_rx,
    );

    let (maintenance_shutdown_tx, maintenance_shutdown_rx) = tokio::sync::oneshot::channel();
    let maintenance_handle = maintenance::spawn(
        store.clone(),
        maintenance::MaintenanceConfig {
            retention_days: app_config.database.retention_days,
            prune_interval_secs: app_config.database.prune_interval_secs,
            vacuum_schedule: app_config.database.vacuum_schedule.clone(),
            vacuum_interval_secs: app_config.database.vacuum_interval_secs,
        },
        maintenance_shutdown_rx,
    );

    let app = routes::app(store, probe, app_config.clone());
    let addr = format!("{}:{}", app_config.server.host, app_config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on http://{}", addr);

    let served = tokio::select! {
        result = axum::serve(listener, app) => result,
        _ = shutdown_signal() => {
            tracing::info!("Received shutdown signal");
            Ok(())
        }
    };

    let _ = sampler_shutdown_tx.send(());
    let _ = maintenance_shutdown_tx.send(());
    error::join_background("sampler", sampler_handle).await;
    error::join_background("maintenance", maintenance_handle).await;
    if let Some(sqlite) = sqlite {
        sqlite.close().await;
    }
    tracing::info!("shutdown complete");

    served?;
    Ok(())
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        let mut sigterm =
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(s) => s,
                Err(_) => {
                    let _ = tokio::signal::ctrl_c().await;
                    return;
                }
            };
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {}
            _ = sigterm.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
