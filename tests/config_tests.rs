// Config loading and validation tests

use psmon::config::AppConfig;

const VALID_CONFIG: &str = r#"
[server]
port = 8081
host = "0.0.0.0"
query_timeout_secs = 5
cors_origins = ["http://localhost:5173", "http://dash.local"]

[database]
path = "data/psmon.db"
max_pool_size = 10
retention_days = 3
vacuum_schedule = "0 0 3 * * *"

[monitoring]
metrics_interval_secs = 6
disk_usage_path = "/"
process_rank_cap = 5
max_processes_per_tick = 200
stats_log_interval_secs = 60

[[durations]]
name = "3h"
lookback_secs = 10800
every_secs = 60

[[durations]]
name = "1d"
lookback_secs = 86400
every_secs = 480
"#;

const MINIMAL_CONFIG: &str = r#"
[server]
port = 8081
host = "0.0.0.0"

[database]
path = "data/psmon.db"
max_pool_size = 4
"#;

#[test]
fn test_config_loads_from_str() {
    let config = AppConfig::load_from_str(VALID_CONFIG).expect("load_from_str");
    assert_eq!(config.server.port, 8081);
    assert_eq!(config.server.host, "0.0.0.0");
    assert_eq!(config.server.query_timeout_secs, 5);
    assert_eq!(config.server.cors_origins.len(), 2);
    assert_eq!(config.database.path, "data/psmon.db");
    assert_eq!(config.database.retention_days, 3);
    assert_eq!(
        config.database.vacuum_schedule.as_deref(),
        Some("0 0 3 * * *")
    );
    assert_eq!(config.monitoring.process_rank_cap, 5);
    assert_eq!(config.monitoring.max_processes_per_tick, Some(200));
    assert_eq!(config.durations.len(), 2);
    assert_eq!(config.durations[1].name, "1d");
    assert_eq!(config.durations[1].every_secs, 480);
}

#[test]
fn test_config_defaults_when_sections_omitted() {
    let config = AppConfig::load_from_str(MINIMAL_CONFIG).expect("load_from_str");
    assert_eq!(config.server.query_timeout_secs, 10);
    assert_eq!(config.server.cors_origins, vec!["http://localhost:5173"]);
    assert_eq!(config.database.retention_days, 7);
    assert_eq!(config.database.prune_interval_secs, 3600);
    assert!(config.database.vacuum_schedule.is_none());
    assert_eq!(config.monitoring.metrics_interval_secs, 6);
    assert_eq!(config.monitoring.disk_usage_path, "/");
    assert_eq!(config.monitoring.process_rank_cap, 10);
    assert!(config.monitoring.max_processes_per_tick.is_none());

    let catalog = config.catalog();
    assert_eq!(catalog.len(), 5);
    let names: Vec<&str> = catalog.iter().map(|d| d.name.as_str()).collect();
    assert_eq!(names, vec!["3h", "6h", "12h", "1d", "1w"]);
}

#[test]
fn test_config_validation_rejects_invalid_port() {
    let bad = VALID_CONFIG.replace("port = 8081", "port = 0");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("server.port"));
}

#[test]
fn test_config_validation_rejects_empty_db_path() {
    let bad = VALID_CONFIG.replace("path = \"data/psmon.db\"", "path = \"\"");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("database.path"));
}

#[test]
fn test_config_validation_rejects_max_pool_size_zero() {
    let bad = VALID_CONFIG.replace("max_pool_size = 10", "max_pool_size = 0");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("max_pool_size"));
}

#[test]
fn test_config_validation_rejects_retention_zero() {
    let bad = VALID_CONFIG.replace("retention_days = 3", "retention_days = 0");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("retention_days"));
}

#[test]
fn test_config_validation_rejects_bad_cron() {
    let bad = VALID_CONFIG.replace("\"0 0 3 * * *\"", "\"every night\"");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("vacuum_schedule"));
}

#[test]
fn test_config_validation_rejects_metrics_interval_zero() {
    let bad = VALID_CONFIG.replace("metrics_interval_secs = 6", "metrics_interval_secs = 0");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("metrics_interval_secs"));
}

#[test]
fn test_config_validation_rejects_rank_cap_zero() {
    let bad = VALID_CONFIG.replace("process_rank_cap = 5", "process_rank_cap = 0");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("process_rank_cap"));
}

#[test]
fn test_config_validation_rejects_zero_bucket_width() {
    let bad = VALID_CONFIG.replace("every_secs = 480", "every_secs = 0");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("durations[1].every_secs"));
}

#[test]
fn test_config_validation_rejects_lookback_shorter_than_bucket() {
    let bad = VALID_CONFIG.replace("lookback_secs = 10800", "lookback_secs = 30");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("durations[0].lookback_secs"));
}

#[test]
fn test_config_validation_rejects_duplicate_duration_names() {
    let bad = VALID_CONFIG.replace("name = \"1d\"", "name = \"3h\"");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("duplicated"));
}

#[test]
fn test_config_rejects_missing_server_section() {
    let bad = "[database]\npath = \"x.db\"\nmax_pool_size = 1\n";
    assert!(AppConfig::load_from_str(bad).is_err());
}
