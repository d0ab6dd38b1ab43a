// Read path: windowed rollups and top-N process ranking over the store.

pub mod aggregation;
pub mod ranking;

use std::sync::Arc;
use std::time::Duration;

use crate::error::{MonitorError, Result};
use crate::models::{AggregatedBucket, Field, ProcessRankEntry, QueryDuration};
use crate::store::MetricsStore;
use crate::time::{now_us, secs_to_us};
use aggregation::{BucketWindow, aggregate_buckets};
use ranking::rank_processes;
use tracing::instrument;

#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult {
    /// Wall-clock instant the query ran (µs). For display only; resume from the last bucket start.
    pub served_at: i64,
    /// Closed buckets, ascending by start.
    pub buckets: Vec<AggregatedBucket>,
}

/// Aborts `fut` with `MonitorError::Timeout` once `deadline` elapses. Reads have no
/// side effects, so a timed-out query can simply be retried.
pub async fn with_deadline<T>(
    deadline: Duration,
    fut: impl std::future::Future<Output = Result<T>>,
) -> Result<T> {
    tokio::time::timeout(deadline, fut)
        .await
        .map_err(|_| MonitorError::Timeout)?
}

#[derive(Clone)]
pub struct QueryEngine {
    store: Arc<dyn MetricsStore>,
}

impl QueryEngine {
    pub fn new(store: Arc<dyn MetricsStore>) -> Self {
        Self { store }
    }

    pub async fn query(
        &self,
        duration: &QueryDuration,
        fields: &[Field],
        resume_after: Option<i64>,
    ) -> Result<QueryResult> {
        self.query_at(now_us(), duration, fields, resume_after).await
    }

    pub async fn query_with_deadline(
        &self,
        deadline: Duration,
        duration: &QueryDuration,
        fields: &[Field],
        resume_after: Option<i64>,
    ) -> Result<QueryResult> {
        with_deadline(deadline, self.query(duration, fields, resume_after)).await
    }

    /// Same as [`QueryEngine::query`] with an explicit `now` (µs).
    #[instrument(skip_all, fields(duration = %duration.name, resume_after = ?resume_after))]
    pub async fn query_at(
        &self,
        now: i64,
        duration: &QueryDuration,
        fields: &[Field],
        resume_after: Option<i64>,
    ) -> Result<QueryResult> {
        let window = BucketWindow::plan(now, duration, resume_after);
        if window.is_empty() || fields.is_empty() {
            return Ok(QueryResult {
                served_at: now,
                buckets: Vec::new(),
            });
        }
        let samples = self
            .store
            .system_stats_between(window.first_bucket, window.cutoff)
            .await?;
        let buckets = aggregate_buckets(&samples, fields, &window);
        tracing::debug!(
            samples = samples.len(),
            buckets = buckets.len(),
            "aggregation query"
        );
        Ok(QueryResult {
            served_at: now,
            buckets,
        })
    }
}

#[derive(Clone)]
pub struct RankingReducer {
    store: Arc<dyn MetricsStore>,
    cap: usize,
}

impl RankingReducer {
    pub fn new(store: Arc<dyn MetricsStore>, cap: usize) -> Self {
        Self { store, cap }
    }

    pub fn cap(&self) -> usize {
        self.cap
    }

    /// Top consumers over [at - window_secs, at], at most `cap` entries.
    #[instrument(skip(self))]
    pub async fn rank(&self, at: i64, window_secs: u64) -> Result<Vec<ProcessRankEntry>> {
        let from = at.saturating_sub(secs_to_us(window_secs));
        let samples = self.store.process_samples_between(from, at).await?;
        Ok(rank_processes(&samples, self.cap))
    }

    pub async fn rank_with_deadline(
        &self,
        deadline: Duration,
        at: i64,
        window_secs: u64,
    ) -> Result<Vec<ProcessRankEntry>> {
        with_deadline(deadline, self.rank(at, window_secs)).await
    }
}
