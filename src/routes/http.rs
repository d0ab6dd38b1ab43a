// GET handlers: monitor rollups, process ranking, catalog, version

use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;

use super::AppState;
use crate::error::{MonitorError, Result};
use crate::models::{
    DurationInfo, Field, MonitorColumns, MonitorColumnsResponse, MonitorRow, MonitorRowsResponse,
    ProcessCpuResponse, VersionResponse,
};
use crate::query::with_deadline;
use crate::time::{format_rfc3339, now_us, parse_rfc3339};
use crate::version::VERSION;

#[derive(Debug, Deserialize)]
pub(super) struct MonitorParams {
    duration_index: Option<String>,
    /// Resume point: only buckets starting strictly after this instant.
    start_time: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ProcessCpuParams {
    time: Option<String>,
    duration_index: Option<String>,
}

/// Missing or empty means the first catalog entry.
fn parse_duration_index(raw: Option<&str>) -> Result<usize> {
    match raw.map(str::trim) {
        None | Some("") => Ok(0),
        Some(s) => s.parse().map_err(|_| {
            MonitorError::InvalidArgument(format!(
                "duration_index must be a non-negative integer, got {:?}",
                s
            ))
        }),
    }
}

struct MonitorSnapshot {
    timestamp: String,
    mem_total: u64,
    disk_total: u64,
    rows: Vec<MonitorRow>,
}

async fn monitor_snapshot(state: &AppState, params: MonitorParams) -> Result<MonitorSnapshot> {
    let duration = state
        .catalog
        .get(parse_duration_index(params.duration_index.as_deref())?)?;
    let resume_after = params
        .start_time
        .as_deref()
        .map(parse_rfc3339)
        .transpose()?;

    // Host totals wait on the same sysinfo lock as the sampler.
    with_deadline(state.deadline(), async {
        let result = state
            .engine
            .query(duration, &Field::ALL, resume_after)
            .await?;
        let memory = state.probe.memory().await?;
        let disk = state
            .probe
            .disk_usage(&state.config.monitoring.disk_usage_path)
            .await?;

        Ok(MonitorSnapshot {
            timestamp: format_rfc3339(result.served_at),
            mem_total: memory.total_bytes,
            disk_total: disk.total_bytes,
            rows: result.buckets.iter().map(MonitorRow::from).collect(),
        })
    })
    .await
}

/// GET /api/v1/monitor: closed buckets, column-oriented.
pub(super) async fn monitor_columns_handler(
    State(state): State<AppState>,
    Query(params): Query<MonitorParams>,
) -> Result<Json<MonitorColumnsResponse>> {
    let snap = monitor_snapshot(&state, params).await?;
    Ok(Json(MonitorColumnsResponse {
        timestamp: snap.timestamp,
        mem_total: snap.mem_total,
        disk_total: snap.disk_total,
        records: MonitorColumns::from(snap.rows),
    }))
}

/// GET /api/v1/monitor/json: same buckets, one object per bucket.
pub(super) async fn monitor_rows_handler(
    State(state): State<AppState>,
    Query(params): Query<MonitorParams>,
) -> Result<Json<MonitorRowsResponse>> {
    let snap = monitor_snapshot(&state, params).await?;
    Ok(Json(MonitorRowsResponse {
        timestamp: snap.timestamp,
        mem_total: snap.mem_total,
        disk_total: snap.disk_total,
        records: snap.rows,
    }))
}

/// GET /api/v1/monitor/process-cpu: top consumers over one bucket width ending at `time`.
pub(super) async fn process_cpu_handler(
    State(state): State<AppState>,
    Query(params): Query<ProcessCpuParams>,
) -> Result<Json<ProcessCpuResponse>> {
    let duration = state
        .catalog
        .get(parse_duration_index(params.duration_index.as_deref())?)?;
    let served_at = now_us();
    let at = match params.time.as_deref() {
        Some(t) => parse_rfc3339(t)?,
        None => served_at,
    };
    let records = state
        .reducer
        .rank_with_deadline(state.deadline(), at, duration.every_secs)
        .await?;
    Ok(Json(ProcessCpuResponse {
        timestamp: format_rfc3339(served_at),
        records,
    }))
}

pub(super) async fn durations_handler(State(state): State<AppState>) -> Json<Vec<DurationInfo>> {
    Json(state.catalog.iter().map(DurationInfo::from).collect())
}

pub(super) async fn metrics_interval_handler(State(state): State<AppState>) -> Json<u64> {
    Json(state.config.monitoring.metrics_interval_secs)
}

/// GET /api/v1/misc/version (from Cargo.toml at build time).
pub(super) async fn version_handler() -> Json<VersionResponse> {
    Json(VersionResponse {
        version: VERSION.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_index_defaults_and_rejects_garbage() {
        assert_eq!(parse_duration_index(None).unwrap(), 0);
        assert_eq!(parse_duration_index(Some("")).unwrap(), 0);
        assert_eq!(parse_duration_index(Some("3")).unwrap(), 3);
        assert!(matches!(
            parse_duration_index(Some("abc")),
            Err(MonitorError::InvalidArgument(_))
        ));
        assert!(matches!(
            parse_duration_index(Some("-1")),
            Err(MonitorError::InvalidArgument(_))
        ));
    }
}
