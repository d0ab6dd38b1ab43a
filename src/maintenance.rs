// Store upkeep: drop rows past retention every prune_interval_secs, then VACUUM
// on a configurable schedule (cron expression or fixed interval).

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use crate::store::MetricsStore;
use crate::time::{now_us, secs_to_us};
use tokio::sync::oneshot;
use tracing::{info, instrument, warn};

#[derive(Debug, Clone)]
pub struct MaintenanceConfig {
    pub retention_days: u32,
    pub prune_interval_secs: u64,
    /// Optional cron expression for VACUUM (e.g. "0 0 3 * * *" = 03:00 daily). Uses local time.
    pub vacuum_schedule: Option<String>,
    /// Run VACUUM every N seconds when vacuum_schedule is not set.
    pub vacuum_interval_secs: u64,
}

impl MaintenanceConfig {
    fn retention_us(&self) -> i64 {
        secs_to_us(self.retention_days as u64 * 24 * 3600)
    }
}

pub fn spawn(
    store: Arc<dyn MetricsStore>,
    config: MaintenanceConfig,
    shutdown_rx: oneshot::Receiver<()>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        run(store, config, shutdown_rx).await;
    })
}

#[instrument(skip(store, shutdown_rx), fields(prune_interval_secs = config.prune_interval_secs))]
async fn run(
    store: Arc<dyn MetricsStore>,
    config: MaintenanceConfig,
    mut shutdown_rx: oneshot::Receiver<()>,
) {
    let period = Duration::from_secs(config.prune_interval_secs);
    let mut prune_interval = tokio::time::interval(period);
    prune_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    let vacuum_every = Duration::from_secs(config.vacuum_interval_secs);
    let schedule = config
        .vacuum_schedule
        .as_deref()
        .and_then(|expr| match cron::Schedule::from_str(expr) {
            Ok(s) => Some(s),
            Err(e) => {
                warn!(cron = %expr, error = %e, "invalid vacuum_schedule; using vacuum_interval_secs");
                None
            }
        });
    let vacuum_sleep = tokio::time::sleep(until_next_vacuum(schedule.as_ref(), vacuum_every));
    tokio::pin!(vacuum_sleep);

    loop {
        tokio::select! {
            _ = prune_interval.tick() => {
                match prune_once(store.as_ref(), &config, now_us()).await {
                    Ok(removed) if removed > 0 => info!(rows_removed = removed, "retention prune"),
                    Ok(_) => {}
                    Err(e) => warn!(error = %e, "retention prune failed"),
                }
            }
            _ = &mut vacuum_sleep => {
                if let Err(e) = store.vacuum().await {
                    warn!(error = %e, "vacuum failed");
                } else {
                    info!("vacuum complete");
                }
                let wait = until_next_vacuum(schedule.as_ref(), vacuum_every);
                vacuum_sleep.as_mut().reset(tokio::time::Instant::now() + wait);
            }
            _ = &mut shutdown_rx => {
                tracing::debug!("Maintenance shutting down");
                break;
            }
        }
    }
}

/// Drops rows older than `now - retention_days`. Returns rows removed.
pub async fn prune_once(
    store: &dyn MetricsStore,
    config: &MaintenanceConfig,
    now: i64,
) -> crate::error::Result<u64> {
    store
        .prune_older_than(now.saturating_sub(config.retention_us()))
        .await
}

/// Time until the next VACUUM: the next cron occurrence in local time, else `every`.
fn until_next_vacuum(schedule: Option<&cron::Schedule>, every: Duration) -> Duration {
    let Some(schedule) = schedule else {
        return every;
    };
    let now = chrono::Local::now();
    schedule
        .after(&now)
        .next()
        .and_then(|next| (next - now).to_std().ok())
        .unwrap_or(every)
}
