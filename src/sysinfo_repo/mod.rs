// Host probe via sysinfo

mod disk;

pub use disk::covering_mount;

use crate::error::{MonitorError, Result};
use crate::models::{DiskReading, MemoryReading, ProcessReading};
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use sysinfo::{Disks, ProcessStatus, ProcessesToUpdate, System};
use tracing::instrument;

/// OS facilities the sampler and query surface need. Object-safe so tests can script it.
#[async_trait]
pub trait HostProbe: Send + Sync {
    /// Throwaway CPU read that establishes the baseline for the next delta.
    async fn prime(&self) -> Result<()>;
    /// Global CPU utilization since the previous call, 0..=100.
    async fn cpu_percent(&self) -> Result<f64>;
    async fn memory(&self) -> Result<MemoryReading>;
    /// Usage of the filesystem whose mount point is the longest prefix of `path`.
    async fn disk_usage(&self, path: &str) -> Result<DiskReading>;
    /// Best-effort process table; vanished processes carry `None` readings.
    async fn processes(&self) -> Result<Vec<ProcessReading>>;
}

pub struct SysinfoRepo {
    sys: Arc<Mutex<System>>,
    disks: Arc<Mutex<Disks>>,
}

impl Default for SysinfoRepo {
    fn default() -> Self {
        Self::new()
    }
}

impl SysinfoRepo {
    pub fn new() -> Self {
        let sys = System::new();
        let disks = Disks::new_with_refreshed_list();
        Self {
            sys: Arc::new(Mutex::new(sys)),
            disks: Arc::new(Mutex::new(disks)),
        }
    }
}

fn poisoned<T>(what: &str, e: std::sync::PoisonError<T>) -> MonitorError {
    MonitorError::Probe(format!("sysinfo {} lock poisoned: {}", what, e))
}

#[async_trait]
impl HostProbe for SysinfoRepo {
    #[instrument(skip(self), fields(repo = "sysinfo", operation = "prime"))]
    async fn prime(&self) -> Result<()> {
        let sys = self.sys.clone();
        tokio::task::spawn_blocking(move || -> Result<()> {
            let mut sys = sys.lock().map_err(|e| poisoned("system", e))?;
            sys.refresh_cpu_usage();
            sys.refresh_processes(ProcessesToUpdate::All, true);
            Ok(())
        })
        .await?
    }

    #[instrument(skip(self), fields(repo = "sysinfo", operation = "cpu_percent"))]
    async fn cpu_percent(&self) -> Result<f64> {
        let sys = self.sys.clone();
        tokio::task::spawn_blocking(move || -> Result<f64> {
            let mut sys = sys.lock().map_err(|e| poisoned("system", e))?;
            sys.refresh_cpu_usage();
            Ok((sys.global_cpu_usage() as f64).clamp(0.0, 100.0))
        })
        .await?
    }

    #[instrument(skip(self), fields(repo = "sysinfo", operation = "memory"))]
    async fn memory(&self) -> Result<MemoryReading> {
        let sys = self.sys.clone();
        tokio::task::spawn_blocking(move || -> Result<MemoryReading> {
            let mut sys = sys.lock().map_err(|e| poisoned("system", e))?;
            sys.refresh_memory();
            Ok(MemoryReading {
                total_bytes: sys.total_memory(),
                available_bytes: sys.available_memory(),
            })
        })
        .await?
    }

    #[instrument(skip(self), fields(repo = "sysinfo", operation = "disk_usage"))]
    async fn disk_usage(&self, path: &str) -> Result<DiskReading> {
        let disks = self.disks.clone();
        let path = PathBuf::from(path);
        tokio::task::spawn_blocking(move || -> Result<DiskReading> {
            let mut disks = disks.lock().map_err(|e| poisoned("disks", e))?;
            disks.refresh(true);
            let list = disks.list();
            let mounts: Vec<&std::path::Path> = list.iter().map(|d| d.mount_point()).collect();
            let idx = covering_mount(&path, &mounts).ok_or_else(|| {
                MonitorError::Probe(format!("no mounted filesystem covers {}", path.display()))
            })?;
            let d = &list[idx];
            let total = d.total_space();
            Ok(DiskReading {
                total_bytes: total,
                used_bytes: total.saturating_sub(d.available_space()),
            })
        })
        .await?
    }

    #[instrument(skip(self), fields(repo = "sysinfo", operation = "processes"))]
    async fn processes(&self) -> Result<Vec<ProcessReading>> {
        let sys = self.sys.clone();
        tokio::task::spawn_blocking(move || -> Result<Vec<ProcessReading>> {
            let mut sys = sys.lock().map_err(|e| poisoned("system", e))?;
            sys.refresh_processes(ProcessesToUpdate::All, true);
            let out = sys
                .processes()
                .iter()
                .map(|(pid, p)| {
                    let gone = matches!(p.status(), ProcessStatus::Zombie | ProcessStatus::Dead);
                    let name = p.name().to_string_lossy().into_owned();
                    ProcessReading {
                        pid: pid.as_u32(),
                        name: (!gone && !name.is_empty()).then_some(name),
                        cpu_percent: (!gone).then(|| p.cpu_usage() as f64),
                    }
                })
                .collect();
            Ok(out)
        })
        .await?
    }
}
