// Raw samples (write-once) and the host readings they are built from.

use serde::{Deserialize, Serialize};

/// Values captured for the system-wide series at one tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SystemStatsFields {
    pub cpu_percent: f64,
    pub mem_available_bytes: f64,
    pub disk_used_bytes: f64,
}

/// One row of the system-stats series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SystemStatsSample {
    /// Microseconds since the Unix epoch.
    pub capture_time: i64,
    pub cpu_percent: f64,
    pub mem_available_bytes: f64,
    pub disk_used_bytes: f64,
}

impl SystemStatsSample {
    pub fn new(capture_time: i64, fields: SystemStatsFields) -> Self {
        Self {
            capture_time,
            cpu_percent: fields.cpu_percent,
            mem_available_bytes: fields.mem_available_bytes,
            disk_used_bytes: fields.disk_used_bytes,
        }
    }
}

/// One process as written in a tick's batch; the batch shares a single capture time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessCpu {
    pub pid: u32,
    pub name: String,
    pub cpu_percent: f64,
}

/// One row of the per-process series, tagged by (pid, name).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessCpuSample {
    pub capture_time: i64,
    pub pid: u32,
    pub name: String,
    pub cpu_percent: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryReading {
    pub total_bytes: u64,
    pub available_bytes: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiskReading {
    pub total_bytes: u64,
    pub used_bytes: u64,
}

/// Process table entry as enumerated. `None` in either field means the process
/// exited or became unreadable between enumeration and the CPU read.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessReading {
    pub pid: u32,
    pub name: Option<String>,
    pub cpu_percent: Option<f64>,
}
