// Aggregated bucket: one row per closed time bucket, max/mean per tracked field.
// Derived on read from raw system-stats samples; never stored.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::SystemStatsSample;

/// Numeric fields of the system-stats series that can be rolled up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    CpuPercent,
    MemAvailable,
    DiskUsed,
}

impl Field {
    pub const ALL: [Field; 3] = [Field::CpuPercent, Field::MemAvailable, Field::DiskUsed];

    pub fn name(self) -> &'static str {
        match self {
            Field::CpuPercent => "cpu_percent",
            Field::MemAvailable => "mem_available",
            Field::DiskUsed => "disk_used",
        }
    }

    pub fn value(self, sample: &SystemStatsSample) -> f64 {
        match self {
            Field::CpuPercent => sample.cpu_percent,
            Field::MemAvailable => sample.mem_available_bytes,
            Field::DiskUsed => sample.disk_used_bytes,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldAggregate {
    pub max: f64,
    pub mean: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedBucket {
    /// Microseconds since the Unix epoch, a multiple of the bucket width.
    pub bucket_start: i64,
    /// Only fields that had at least one sample in the bucket.
    pub values: BTreeMap<Field, FieldAggregate>,
}

impl AggregatedBucket {
    pub fn get(&self, field: Field) -> Option<FieldAggregate> {
        self.values.get(&field).copied()
    }
}
