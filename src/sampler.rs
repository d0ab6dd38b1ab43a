// Background sampler: one system-stats row plus one process batch per tick, same timestamp.
// The loop is an owned task; main signals shutdown and awaits it before closing the store.

use crate::error::Result;
use crate::models::{ProcessCpu, ProcessReading, SystemStatsFields};
use crate::store::MetricsStore;
use crate::sysinfo_repo::HostProbe;
use crate::time::now_us;
use std::sync::Arc;
use tokio::sync::oneshot;
use tokio::time::{Duration, Instant, interval_at};
use tracing::Instrument;

/// Per-tick capture settings.
#[derive(Debug, Clone)]
pub struct SamplerConfig {
    pub disk_usage_path: String,
    /// Keep only the highest-CPU processes when more than this many are running.
    pub max_processes_per_tick: Option<usize>,
}

/// Loop timing.
#[derive(Debug, Clone)]
pub struct ScheduleConfig {
    pub interval_secs: u64,
    /// How often to log tick counters (real seconds).
    pub stats_log_interval_secs: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The CPU baseline was just established; nothing was written.
    Primed,
    Recorded {
        time: i64,
        processes: usize,
        /// Processes that vanished between enumeration and read.
        skipped: usize,
    },
}

pub struct Sampler {
    probe: Arc<dyn HostProbe>,
    store: Arc<dyn MetricsStore>,
    config: SamplerConfig,
    primed: bool,
}

impl Sampler {
    pub fn new(
        probe: Arc<dyn HostProbe>,
        store: Arc<dyn MetricsStore>,
        config: SamplerConfig,
    ) -> Self {
        Self {
            probe,
            store,
            config,
            primed: false,
        }
    }

    pub fn is_primed(&self) -> bool {
        self.primed
    }

    /// Throwaway read so the first persisted CPU value is a real delta.
    pub async fn prime(&mut self) -> Result<()> {
        self.probe.prime().await?;
        self.primed = true;
        tracing::debug!(operation = "prime", "CPU baseline established");
        Ok(())
    }

    pub async fn tick(&mut self) -> Result<TickOutcome> {
        self.tick_at(now_us()).await
    }

    /// Captures host state and writes it stamped with `time` (µs).
    /// Any probe or store failure fails the whole tick; there is no retry here.
    pub async fn tick_at(&mut self, time: i64) -> Result<TickOutcome> {
        if !self.primed {
            self.prime().await?;
            return Ok(TickOutcome::Primed);
        }

        let cpu_percent = self.probe.cpu_percent().await?;
        let memory = self.probe.memory().await?;
        let disk = self.probe.disk_usage(&self.config.disk_usage_path).await?;
        let readings = self.probe.processes().await?;

        let enumerated = readings.len();
        let mut rows = readable_processes(readings);
        let skipped = enumerated - rows.len();
        if let Some(cap) = self.config.max_processes_per_tick {
            cap_processes(&mut rows, cap);
        }

        let fields = SystemStatsFields {
            cpu_percent,
            mem_available_bytes: memory.available_bytes as f64,
            disk_used_bytes: disk.used_bytes as f64,
        };
        self.store.write_system_stats(time, &fields).await?;
        self.store.write_process_samples(time, &rows).await?;

        Ok(TickOutcome::Recorded {
            time,
            processes: rows.len(),
            skipped,
        })
    }
}

/// Drops processes that vanished or became unreadable between enumeration and read.
/// Output is ordered by pid.
pub fn readable_processes(readings: Vec<ProcessReading>) -> Vec<ProcessCpu> {
    let mut rows: Vec<ProcessCpu> = readings
        .into_iter()
        .filter_map(|r| match (r.name, r.cpu_percent) {
            (Some(name), Some(cpu_percent)) if cpu_percent.is_finite() => Some(ProcessCpu {
                pid: r.pid,
                name,
                cpu_percent,
            }),
            _ => None,
        })
        .collect();
    rows.sort_by_key(|r| r.pid);
    rows
}

/// Keeps the `cap` highest-CPU processes (pid ascending on ties), still ordered by pid.
pub fn cap_processes(rows: &mut Vec<ProcessCpu>, cap: usize) {
    if rows.len() <= cap {
        return;
    }
    rows.sort_by(|a, b| {
        b.cpu_percent
            .total_cmp(&a.cpu_percent)
            .then(a.pid.cmp(&b.pid))
    });
    rows.truncate(cap);
    rows.sort_by_key(|r| r.pid);
}

/// Primes the sampler if needed, then ticks every `interval_secs` until `shutdown_rx` fires.
pub fn spawn(
    sampler: Sampler,
    config: ScheduleConfig,
    shutdown_rx: oneshot::Receiver<()>,
) -> tokio::task::JoinHandle<()> {
    let span = tracing::span!(
        tracing::Level::DEBUG,
        "sampler",
        interval_secs = config.interval_secs
    );
    tokio::spawn(run(sampler, config, shutdown_rx).instrument(span))
}

async fn run(mut sampler: Sampler, config: ScheduleConfig, mut shutdown_rx: oneshot::Receiver<()>) {
    if !sampler.is_primed()
        && let Err(e) = sampler.prime().await
    {
        tracing::warn!(error = %e, operation = "prime", "CPU baseline read failed");
    }

    // First tick one full period after priming so the CPU delta spans a real interval.
    let period = Duration::from_secs(config.interval_secs);
    let mut tick = interval_at(Instant::now() + period, period);
    tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    let stats_log_interval = Duration::from_secs(config.stats_log_interval_secs);
    let mut stats_log_tick = interval_at(Instant::now() + stats_log_interval, stats_log_interval);
    stats_log_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    let mut ticks_recorded: u64 = 0;
    let mut ticks_failed: u64 = 0;
    let mut processes_skipped: u64 = 0;

    loop {
        tokio::select! {
            _ = tick.tick() => {
                match sampler.tick().await {
                    Ok(TickOutcome::Recorded { time, processes, skipped }) => {
                        ticks_recorded += 1;
                        processes_skipped += skipped as u64;
                        tracing::debug!(
                            operation = "tick",
                            time,
                            processes,
                            skipped,
                            "Sample recorded"
                        );
                    }
                    Ok(TickOutcome::Primed) => {
                        tracing::debug!(operation = "tick", "Baseline primed; nothing recorded");
                    }
                    Err(e) => {
                        ticks_failed += 1;
                        tracing::warn!(
                            error = %e,
                            operation = "tick",
                            "Sampler tick failed; sample dropped"
                        );
                    }
                }
            }
            _ = &mut shutdown_rx => {
                tracing::debug!("Sampler shutting down");
                break;
            }
            _ = stats_log_tick.tick() => {
                tracing::info!(
                    ticks_recorded,
                    ticks_failed,
                    processes_skipped,
                    "sampler stats"
                );
            }
        }
    }
}
