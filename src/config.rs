use serde::Deserialize;
use std::collections::HashSet;
use std::str::FromStr;

use crate::models::{DurationCatalog, QueryDuration, default_catalog};

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub monitoring: MonitoringConfig,
    /// Query granularities in `duration_index` order.
    #[serde(default = "default_catalog")]
    pub durations: Vec<QueryDuration>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
    #[serde(default = "default_query_timeout_secs")]
    pub query_timeout_secs: u64,
    /// Dashboard origins allowed by CORS.
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,
}

fn default_query_timeout_secs() -> u64 {
    10
}

fn default_cors_origins() -> Vec<String> {
    vec!["http://localhost:5173".into()]
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite file path; ":memory:" keeps samples in process memory only.
    pub path: String,
    pub max_pool_size: u32,
    #[serde(default = "default_retention_days")]
    pub retention_days: u32,
    #[serde(default = "default_prune_interval_secs")]
    pub prune_interval_secs: u64,
    /// Optional cron expression for VACUUM (e.g. "0 0 3 * * *" = 03:00 daily). Uses local time.
    pub vacuum_schedule: Option<String>,
    /// Run VACUUM every N seconds when vacuum_schedule is not set.
    #[serde(default = "default_vacuum_interval_secs")]
    pub vacuum_interval_secs: u64,
}

fn default_retention_days() -> u32 {
    7
}

fn default_prune_interval_secs() -> u64 {
    3600
}

fn default_vacuum_interval_secs() -> u64 {
    86_400
}

#[derive(Debug, Clone, Deserialize)]
pub struct MonitoringConfig {
    #[serde(default = "default_metrics_interval_secs")]
    pub metrics_interval_secs: u64,
    /// Disk usage is measured for the filesystem containing this path.
    #[serde(default = "default_disk_usage_path")]
    pub disk_usage_path: String,
    #[serde(default = "default_process_rank_cap")]
    pub process_rank_cap: usize,
    /// Keep at most this many processes per tick (highest CPU first). Unset = all.
    pub max_processes_per_tick: Option<usize>,
    /// How often to log sampler stats at INFO level.
    #[serde(default = "default_stats_log_interval_secs")]
    pub stats_log_interval_secs: u64,
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            metrics_interval_secs: default_metrics_interval_secs(),
            disk_usage_path: default_disk_usage_path(),
            process_rank_cap: default_process_rank_cap(),
            max_processes_per_tick: None,
            stats_log_interval_secs: default_stats_log_interval_secs(),
        }
    }
}

fn default_metrics_interval_secs() -> u64 {
    6
}

fn default_disk_usage_path() -> String {
    "/".into()
}

fn default_process_rank_cap() -> usize {
    10
}

fn default_stats_log_interval_secs() -> u64 {
    300
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".into());
        let s = std::fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("reading config {}: {}", path, e))?;
        Self::load_from_str(&s)
    }

    /// Parse and validate config from a string (e.g. for tests).
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn catalog(&self) -> DurationCatalog {
        DurationCatalog::new(self.durations.clone())
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.server.port > 0,
            "server.port must be between 1 and 65535, got {}",
            self.server.port
        );
        anyhow::ensure!(
            self.server.query_timeout_secs > 0,
            "server.query_timeout_secs must be > 0, got {}",
            self.server.query_timeout_secs
        );
        anyhow::ensure!(
            !self.database.path.is_empty(),
            "database.path must be non-empty"
        );
        anyhow::ensure!(
            self.database.max_pool_size > 0,
            "database.max_pool_size must be > 0, got {}",
            self.database.max_pool_size
        );
        anyhow::ensure!(
            self.database.retention_days > 0,
            "database.retention_days must be > 0, got {}",
            self.database.retention_days
        );
        anyhow::ensure!(
            self.database.prune_interval_secs > 0,
            "database.prune_interval_secs must be > 0, got {}",
            self.database.prune_interval_secs
        );
        anyhow::ensure!(
            self.database.vacuum_interval_secs > 0,
            "database.vacuum_interval_secs must be > 0, got {}",
            self.database.vacuum_interval_secs
        );
        if let Some(expr) = &self.database.vacuum_schedule {
            cron::Schedule::from_str(expr).map_err(|e| {
                anyhow::anyhow!("database.vacuum_schedule {:?} is invalid: {}", expr, e)
            })?;
        }
        anyhow::ensure!(
            self.monitoring.metrics_interval_secs > 0,
            "monitoring.metrics_interval_secs must be > 0, got {}",
            self.monitoring.metrics_interval_secs
        );
        anyhow::ensure!(
            !self.monitoring.disk_usage_path.is_empty(),
            "monitoring.disk_usage_path must be non-empty"
        );
        anyhow::ensure!(
            self.monitoring.process_rank_cap > 0,
            "monitoring.process_rank_cap must be > 0, got {}",
            self.monitoring.process_rank_cap
        );
        if let Some(cap) = self.monitoring.max_processes_per_tick {
            anyhow::ensure!(
                cap > 0,
                "monitoring.max_processes_per_tick must be > 0 when set, got {}",
                cap
            );
        }
        anyhow::ensure!(
            self.monitoring.stats_log_interval_secs > 0,
            "monitoring.stats_log_interval_secs must be > 0, got {}",
            self.monitoring.stats_log_interval_secs
        );
        anyhow::ensure!(
            !self.durations.is_empty(),
            "durations must contain at least one entry"
        );
        let mut names = HashSet::new();
        for (i, d) in self.durations.iter().enumerate() {
            anyhow::ensure!(!d.name.is_empty(), "durations[{}].name must be non-empty", i);
            anyhow::ensure!(
                names.insert(d.name.as_str()),
                "durations[{}].name {:?} is duplicated",
                i,
                d.name
            );
            anyhow::ensure!(
                d.every_secs > 0,
                "durations[{}].every_secs must be > 0, got {}",
                i,
                d.every_secs
            );
            anyhow::ensure!(
                d.lookback_secs >= d.every_secs,
                "durations[{}].lookback_secs ({}) must be >= every_secs ({})",
                i,
                d.lookback_secs,
                d.every_secs
            );
        }
        Ok(())
    }
}
