// Query granularities: named (lookback, bucket width) pairs from config.

use serde::{Deserialize, Serialize};

use crate::error::{MonitorError, Result};
use crate::time::compact_secs;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryDuration {
    pub name: String,
    pub lookback_secs: u64,
    /// Bucket width.
    pub every_secs: u64,
}

impl QueryDuration {
    pub fn new(name: impl Into<String>, lookback_secs: u64, every_secs: u64) -> Self {
        Self {
            name: name.into(),
            lookback_secs,
            every_secs,
        }
    }
}

/// 3h/1m, 6h/2m, 12h/4m, 1d/8m, 1w/1h.
pub fn default_catalog() -> Vec<QueryDuration> {
    vec![
        QueryDuration::new("3h", 3 * 3600, 60),
        QueryDuration::new("6h", 6 * 3600, 2 * 60),
        QueryDuration::new("12h", 12 * 3600, 4 * 60),
        QueryDuration::new("1d", 24 * 3600, 8 * 60),
        QueryDuration::new("1w", 7 * 24 * 3600, 3600),
    ]
}

/// Ordered, immutable catalog; indexes come straight from the `duration_index` query param.
#[derive(Debug, Clone)]
pub struct DurationCatalog(Vec<QueryDuration>);

impl DurationCatalog {
    pub fn new(durations: Vec<QueryDuration>) -> Self {
        Self(durations)
    }

    pub fn get(&self, index: usize) -> Result<&QueryDuration> {
        self.0.get(index).ok_or_else(|| {
            MonitorError::InvalidArgument(format!(
                "duration_index {} out of range (0..{})",
                index,
                self.0.len()
            ))
        })
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &QueryDuration> {
        self.0.iter()
    }
}

impl Default for DurationCatalog {
    fn default() -> Self {
        Self(default_catalog())
    }
}

/// Listing shape for GET /monitor/durations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DurationInfo {
    pub name: String,
    /// Negated lookback, e.g. "-3h".
    pub period_start: String,
    pub period_seconds: u64,
    /// Bucket width, e.g. "1m".
    pub every: String,
    pub every_seconds: u64,
}

impl From<&QueryDuration> for DurationInfo {
    fn from(d: &QueryDuration) -> Self {
        Self {
            name: d.name.clone(),
            period_start: format!("-{}", compact_secs(d.lookback_secs)),
            period_seconds: d.lookback_secs,
            every: compact_secs(d.every_secs),
            every_seconds: d.every_secs,
        }
    }
}
