// In-process series for tests and ":memory:" runs. Can be switched offline to simulate an outage.

use super::MetricsStore;
use crate::error::{MonitorError, Result};
use crate::models::{ProcessCpu, ProcessCpuSample, SystemStatsFields, SystemStatsSample};
use async_trait::async_trait;
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

#[derive(Default)]
pub struct MemoryStore {
    system: RwLock<Vec<SystemStatsSample>>,
    process: RwLock<Vec<ProcessCpuSample>>,
    offline: AtomicBool,
    process_writes_failing: AtomicBool,
    system_writes: AtomicUsize,
    process_writes: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// While offline every call fails with StoreUnavailable.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Fails only write_process_samples; reads and system-stats writes keep working.
    pub fn set_process_writes_failing(&self, failing: bool) {
        self.process_writes_failing.store(failing, Ordering::SeqCst);
    }

    /// Number of successful write_system_stats calls.
    pub fn system_write_calls(&self) -> usize {
        self.system_writes.load(Ordering::SeqCst)
    }

    /// Number of successful write_process_samples calls (empty batches included).
    pub fn process_write_calls(&self) -> usize {
        self.process_writes.load(Ordering::SeqCst)
    }

    fn check_online(&self) -> Result<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(MonitorError::StoreUnavailable("memory store offline".into()));
        }
        Ok(())
    }
}

fn poisoned<T>(e: std::sync::PoisonError<T>) -> MonitorError {
    MonitorError::StoreUnavailable(format!("memory store lock poisoned: {}", e))
}

#[async_trait]
impl MetricsStore for MemoryStore {
    async fn write_system_stats(&self, time: i64, stats: &SystemStatsFields) -> Result<()> {
        self.check_online()?;
        self.system
            .write()
            .map_err(poisoned)?
            .push(SystemStatsSample::new(time, *stats));
        self.system_writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn write_process_samples(&self, time: i64, rows: &[ProcessCpu]) -> Result<()> {
        self.check_online()?;
        if self.process_writes_failing.load(Ordering::SeqCst) {
            return Err(MonitorError::StoreUnavailable(
                "process series rejected write".into(),
            ));
        }
        let mut process = self.process.write().map_err(poisoned)?;
        process.extend(rows.iter().map(|r| ProcessCpuSample {
            capture_time: time,
            pid: r.pid,
            name: r.name.clone(),
            cpu_percent: r.cpu_percent,
        }));
        self.process_writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn system_stats_between(&self, from: i64, to: i64) -> Result<Vec<SystemStatsSample>> {
        self.check_online()?;
        let mut out: Vec<SystemStatsSample> = self
            .system
            .read()
            .map_err(poisoned)?
            .iter()
            .filter(|s| s.capture_time >= from && s.capture_time < to)
            .copied()
            .collect();
        out.sort_by_key(|s| s.capture_time);
        Ok(out)
    }

    async fn process_samples_between(
        &self,
        from: i64,
        to: i64,
    ) -> Result<Vec<ProcessCpuSample>> {
        self.check_online()?;
        let mut out: Vec<ProcessCpuSample> = self
            .process
            .read()
            .map_err(poisoned)?
            .iter()
            .filter(|s| s.capture_time >= from && s.capture_time <= to)
            .cloned()
            .collect();
        out.sort_by_key(|s| s.capture_time);
        Ok(out)
    }

    async fn prune_older_than(&self, cutoff: i64) -> Result<u64> {
        self.check_online()?;
        let mut removed = 0;
        {
            let mut system = self.system.write().map_err(poisoned)?;
            let before = system.len();
            system.retain(|s| s.capture_time >= cutoff);
            removed += before - system.len();
        }
        {
            let mut process = self.process.write().map_err(poisoned)?;
            let before = process.len();
            process.retain(|s| s.capture_time >= cutoff);
            removed += before - process.len();
        }
        Ok(removed as u64)
    }
}
