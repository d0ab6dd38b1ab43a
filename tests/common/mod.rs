// Shared test helpers
#![allow(dead_code)]

use async_trait::async_trait;
use psmon::error::{MonitorError, Result};
use psmon::models::*;
use psmon::sysinfo_repo::HostProbe;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

pub const MINUTE_US: i64 = 60 * 1_000_000;
pub const SECOND_US: i64 = 1_000_000;

/// 2024-01-01T00:00:00Z in µs; a multiple of every default bucket width.
pub const T0: i64 = 1_704_067_200 * 1_000_000;

pub const TEST_CONFIG: &str = r#"
[server]
port = 8081
host = "127.0.0.1"

[database]
path = ":memory:"
max_pool_size = 2

[monitoring]
metrics_interval_secs = 6
disk_usage_path = "/"
process_rank_cap = 10
"#;

pub fn stats(cpu: f64, mem: f64, disk: f64) -> SystemStatsFields {
    SystemStatsFields {
        cpu_percent: cpu,
        mem_available_bytes: mem,
        disk_used_bytes: disk,
    }
}

pub fn proc_cpu(pid: u32, name: &str, cpu: f64) -> ProcessCpu {
    ProcessCpu {
        pid,
        name: name.to_string(),
        cpu_percent: cpu,
    }
}

pub fn proc_sample(time: i64, pid: u32, name: &str, cpu: f64) -> ProcessCpuSample {
    ProcessCpuSample {
        capture_time: time,
        pid,
        name: name.to_string(),
        cpu_percent: cpu,
    }
}

pub fn readable(pid: u32, name: &str, cpu: f64) -> ProcessReading {
    ProcessReading {
        pid,
        name: Some(name.to_string()),
        cpu_percent: Some(cpu),
    }
}

/// Process that exited between enumeration and the CPU read.
pub fn vanished(pid: u32) -> ProcessReading {
    ProcessReading {
        pid,
        name: None,
        cpu_percent: None,
    }
}

/// Scripted host probe: fixed readings, optional failure, call counters.
pub struct FakeProbe {
    pub cpu: Mutex<f64>,
    pub memory: MemoryReading,
    pub disk: DiskReading,
    pub processes: Mutex<Vec<ProcessReading>>,
    failing: AtomicBool,
    memory_stalled: AtomicBool,
    prime_calls: AtomicUsize,
}

impl FakeProbe {
    pub fn new(processes: Vec<ProcessReading>) -> Self {
        Self {
            cpu: Mutex::new(12.5),
            memory: MemoryReading {
                total_bytes: 16_000,
                available_bytes: 8_000,
            },
            disk: DiskReading {
                total_bytes: 500_000,
                used_bytes: 200_000,
            },
            processes: Mutex::new(processes),
            failing: AtomicBool::new(false),
            memory_stalled: AtomicBool::new(false),
            prime_calls: AtomicUsize::new(0),
        }
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// memory() blocks far longer than any query deadline, like a contended sysinfo lock.
    pub fn set_memory_stalled(&self, stalled: bool) {
        self.memory_stalled.store(stalled, Ordering::SeqCst);
    }

    pub fn prime_calls(&self) -> usize {
        self.prime_calls.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(MonitorError::Probe("fake probe failure".into()));
        }
        Ok(())
    }
}

impl Default for FakeProbe {
    fn default() -> Self {
        Self::new(vec![readable(1, "init", 0.5)])
    }
}

#[async_trait]
impl HostProbe for FakeProbe {
    async fn prime(&self) -> Result<()> {
        self.check()?;
        self.prime_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn cpu_percent(&self) -> Result<f64> {
        self.check()?;
        Ok(*self.cpu.lock().unwrap())
    }

    async fn memory(&self) -> Result<MemoryReading> {
        self.check()?;
        if self.memory_stalled.load(Ordering::SeqCst) {
            tokio::time::sleep(std::time::Duration::from_secs(60)).await;
        }
        Ok(self.memory)
    }

    async fn disk_usage(&self, _path: &str) -> Result<DiskReading> {
        self.check()?;
        Ok(self.disk)
    }

    async fn processes(&self) -> Result<Vec<ProcessReading>> {
        self.check()?;
        Ok(self.processes.lock().unwrap().clone())
    }
}
