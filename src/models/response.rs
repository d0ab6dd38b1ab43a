// HTTP payloads for /api/v1. Key names are part of the dashboard contract.

use serde::{Deserialize, Serialize};

use super::{AggregatedBucket, Field, ProcessRankEntry};
use crate::time::format_rfc3339;

/// Row-oriented bucket; `None` (JSON null) where the field had no samples.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitorRow {
    pub time: String,
    pub cpu_percent_max: Option<f64>,
    pub cpu_percent_mean: Option<f64>,
    pub mem_available_max: Option<f64>,
    pub mem_available_mean: Option<f64>,
    pub disk_used_max: Option<f64>,
    pub disk_used_mean: Option<f64>,
}

impl From<&AggregatedBucket> for MonitorRow {
    fn from(b: &AggregatedBucket) -> Self {
        let cpu = b.get(Field::CpuPercent);
        let mem = b.get(Field::MemAvailable);
        let disk = b.get(Field::DiskUsed);
        Self {
            time: format_rfc3339(b.bucket_start),
            cpu_percent_max: cpu.map(|a| a.max),
            cpu_percent_mean: cpu.map(|a| a.mean),
            mem_available_max: mem.map(|a| a.max),
            mem_available_mean: mem.map(|a| a.mean),
            disk_used_max: disk.map(|a| a.max),
            disk_used_mean: disk.map(|a| a.mean),
        }
    }
}

/// Column-oriented view of the same rows: every vector has one entry per bucket.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MonitorColumns {
    pub time: Vec<String>,
    pub cpu_percent_max: Vec<Option<f64>>,
    pub cpu_percent_mean: Vec<Option<f64>>,
    pub mem_available_max: Vec<Option<f64>>,
    pub mem_available_mean: Vec<Option<f64>>,
    pub disk_used_max: Vec<Option<f64>>,
    pub disk_used_mean: Vec<Option<f64>>,
}

impl From<Vec<MonitorRow>> for MonitorColumns {
    fn from(rows: Vec<MonitorRow>) -> Self {
        let mut cols = MonitorColumns::default();
        for r in rows {
            cols.time.push(r.time);
            cols.cpu_percent_max.push(r.cpu_percent_max);
            cols.cpu_percent_mean.push(r.cpu_percent_mean);
            cols.mem_available_max.push(r.mem_available_max);
            cols.mem_available_mean.push(r.mem_available_mean);
            cols.disk_used_max.push(r.disk_used_max);
            cols.disk_used_mean.push(r.disk_used_mean);
        }
        cols
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitorColumnsResponse {
    pub timestamp: String,
    pub mem_total: u64,
    pub disk_total: u64,
    pub records: MonitorColumns,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitorRowsResponse {
    pub timestamp: String,
    pub mem_total: u64,
    pub disk_total: u64,
    pub records: Vec<MonitorRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessCpuResponse {
    pub timestamp: String,
    pub records: Vec<ProcessRankEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionResponse {
    pub version: String,
}
