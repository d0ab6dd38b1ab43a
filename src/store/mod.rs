// Time-series store: append-only system-stats and per-process CPU series.
// The handle is built once in main and shared as Arc<dyn MetricsStore>.

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use crate::error::Result;
use crate::models::{ProcessCpu, ProcessCpuSample, SystemStatsFields, SystemStatsSample};
use async_trait::async_trait;

#[async_trait]
pub trait MetricsStore: Send + Sync {
    /// Appends one row to the system-stats series. Returns once acknowledged.
    async fn write_system_stats(&self, time: i64, fields: &SystemStatsFields) -> Result<()>;

    /// Appends one row per process, all sharing `time`. Empty batch is a no-op.
    async fn write_process_samples(&self, time: i64, rows: &[ProcessCpu]) -> Result<()>;

    /// System-stats rows in [from, to), ascending by time.
    async fn system_stats_between(&self, from: i64, to: i64) -> Result<Vec<SystemStatsSample>>;

    /// Process rows in [from, to] (both ends inclusive), ascending by time.
    async fn process_samples_between(&self, from: i64, to: i64)
    -> Result<Vec<ProcessCpuSample>>;

    /// Retention: drops rows of both series older than `cutoff`. Returns rows removed.
    async fn prune_older_than(&self, cutoff: i64) -> Result<u64>;

    /// Reclaim space after pruning. Backends without on-disk state do nothing.
    async fn vacuum(&self) -> Result<()> {
        Ok(())
    }
}
