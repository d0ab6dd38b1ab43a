// SQLite-backed series (sqlx, WAL). One table per record kind, indexed by created_at (µs).

use super::MetricsStore;
use crate::error::{MonitorError, Result};
use crate::models::{ProcessCpu, ProcessCpuSample, SystemStatsFields, SystemStatsSample};
use async_trait::async_trait;
use sqlx::Row;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use std::path::Path;
use std::str::FromStr;
use tracing::instrument;

pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub async fn connect(path: &str, max_pool_size: u32) -> Result<Self> {
        if let Some(parent) = Path::new(path).parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| {
                MonitorError::StoreUnavailable(format!(
                    "creating {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }
        let opts = SqliteConnectOptions::from_str(&format!("sqlite:{}", path))?
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .busy_timeout(std::time::Duration::from_secs(5))
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal);
        let pool = SqlitePoolOptions::new()
            .max_connections(max_pool_size)
            .connect_with(opts)
            .await?;
        Ok(Self { pool })
    }

    pub async fn init(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS system_stats (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                created_at INTEGER NOT NULL,
                cpu_percent REAL NOT NULL,
                mem_available REAL NOT NULL,
                disk_used REAL NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_system_stats_created_at ON system_stats(created_at)",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS process_cpu (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                created_at INTEGER NOT NULL,
                pid INTEGER NOT NULL,
                name TEXT NOT NULL,
                cpu_percent REAL NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_process_cpu_created_at ON process_cpu(created_at)",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Waits for in-flight statements, then closes every pooled connection.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    fn parse_system_row(row: &SqliteRow) -> Result<SystemStatsSample> {
        Ok(SystemStatsSample {
            capture_time: row.try_get("created_at")?,
            cpu_percent: row.try_get("cpu_percent")?,
            mem_available_bytes: row.try_get("mem_available")?,
            disk_used_bytes: row.try_get("disk_used")?,
        })
    }

    fn parse_process_row(row: &SqliteRow) -> Result<ProcessCpuSample> {
        let pid: i64 = row.try_get("pid")?;
        Ok(ProcessCpuSample {
            capture_time: row.try_get("created_at")?,
            pid: pid as u32,
            name: row.try_get("name")?,
            cpu_percent: row.try_get("cpu_percent")?,
        })
    }
}

#[async_trait]
impl MetricsStore for SqliteStore {
    #[instrument(skip(self, stats), fields(repo = "sqlite", operation = "write_system_stats"))]
    async fn write_system_stats(&self, time: i64, stats: &SystemStatsFields) -> Result<()> {
        sqlx::query(
            "INSERT INTO system_stats (created_at, cpu_percent, mem_available, disk_used) VALUES ($1, $2, $3, $4)",
        )
        .bind(time)
        .bind(stats.cpu_percent)
        .bind(stats.mem_available_bytes)
        .bind(stats.disk_used_bytes)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    #[instrument(skip(self, rows), fields(repo = "sqlite", operation = "write_process_samples", rows_count = rows.len()))]
    async fn write_process_samples(&self, time: i64, rows: &[ProcessCpu]) -> Result<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let mut tx = self.pool.begin().await?;
        for r in rows {
            sqlx::query(
                "INSERT INTO process_cpu (created_at, pid, name, cpu_percent) VALUES ($1, $2, $3, $4)",
            )
            .bind(time)
            .bind(r.pid as i64)
            .bind(&r.name)
            .bind(r.cpu_percent)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    #[instrument(skip(self), fields(repo = "sqlite", operation = "system_stats_between"))]
    async fn system_stats_between(&self, from: i64, to: i64) -> Result<Vec<SystemStatsSample>> {
        let rows = sqlx::query(
            "SELECT created_at, cpu_percent, mem_available, disk_used
             FROM system_stats WHERE created_at >= $1 AND created_at < $2 ORDER BY created_at ASC, id ASC",
        )
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::parse_system_row).collect()
    }

    #[instrument(skip(self), fields(repo = "sqlite", operation = "process_samples_between"))]
    async fn process_samples_between(
        &self,
        from: i64,
        to: i64,
    ) -> Result<Vec<ProcessCpuSample>> {
        let rows = sqlx::query(
            "SELECT created_at, pid, name, cpu_percent
             FROM process_cpu WHERE created_at >= $1 AND created_at <= $2 ORDER BY created_at ASC, id ASC",
        )
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::parse_process_row).collect()
    }

    #[instrument(skip(self), fields(repo = "sqlite", operation = "prune_older_than"))]
    async fn prune_older_than(&self, cutoff: i64) -> Result<u64> {
        let system = sqlx::query("DELETE FROM system_stats WHERE created_at < $1")
            .bind(cutoff)
            .execute(&self.pool)
            .await?;
        let process = sqlx::query("DELETE FROM process_cpu WHERE created_at < $1")
            .bind(cutoff)
            .execute(&self.pool)
            .await?;
        Ok(system.rows_affected() + process.rows_affected())
    }

    #[instrument(skip(self), fields(repo = "sqlite", operation = "vacuum"))]
    async fn vacuum(&self) -> Result<()> {
        sqlx::query("VACUUM").execute(&self.pool).await?;
        Ok(())
    }
}
