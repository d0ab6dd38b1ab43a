// Domain models: raw samples, query granularities, derived rollups, HTTP payloads.

mod aggregation;
mod duration;
mod ranking;
mod response;
mod sample;

pub use aggregation::{AggregatedBucket, Field, FieldAggregate};
pub use duration::{DurationCatalog, DurationInfo, QueryDuration, default_catalog};
pub use ranking::ProcessRankEntry;
pub use response::{
    MonitorColumns, MonitorColumnsResponse, MonitorRow, MonitorRowsResponse, ProcessCpuResponse,
    VersionResponse,
};
pub use sample::{
    DiskReading, MemoryReading, ProcessCpu, ProcessCpuSample, ProcessReading, SystemStatsFields,
    SystemStatsSample,
};
