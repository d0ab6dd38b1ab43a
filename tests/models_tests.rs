// Model serialization tests (dashboard key names, catalog listing)

mod common;

use common::T0;
use psmon::error::MonitorError;
use psmon::models::*;
use std::collections::BTreeMap;

fn bucket(start: i64, cpu: Option<(f64, f64)>) -> AggregatedBucket {
    let mut values = BTreeMap::new();
    if let Some((max, mean)) = cpu {
        values.insert(Field::CpuPercent, FieldAggregate { max, mean });
    }
    values.insert(
        Field::MemAvailable,
        FieldAggregate {
            max: 800.0,
            mean: 700.0,
        },
    );
    AggregatedBucket {
        bucket_start: start,
        values,
    }
}

#[test]
fn test_monitor_row_keys_and_nulls() {
    let row = MonitorRow::from(&bucket(T0, None));
    let json = serde_json::to_value(&row).unwrap();
    assert_eq!(json["time"], "2024-01-01T00:00:00.000000Z");
    assert!(json["cpu_percent_max"].is_null());
    assert!(json["cpu_percent_mean"].is_null());
    assert_eq!(json["mem_available_max"], 800.0);
    assert_eq!(json["mem_available_mean"], 700.0);
    assert!(json["disk_used_max"].is_null());
    assert!(json.get("disk_used_mean").is_some());
}

#[test]
fn test_monitor_columns_are_equally_long() {
    let rows = vec![
        MonitorRow::from(&bucket(T0, Some((30.0, 20.0)))),
        MonitorRow::from(&bucket(T0 + 60_000_000, None)),
    ];
    let cols = MonitorColumns::from(rows);
    assert_eq!(cols.time.len(), 2);
    assert_eq!(cols.cpu_percent_max, vec![Some(30.0), None]);
    assert_eq!(cols.cpu_percent_mean, vec![Some(20.0), None]);
    assert_eq!(cols.mem_available_max.len(), 2);
    assert_eq!(cols.disk_used_mean, vec![None, None]);

    let json = serde_json::to_value(&cols).unwrap();
    for key in [
        "time",
        "cpu_percent_max",
        "cpu_percent_mean",
        "mem_available_max",
        "mem_available_mean",
        "disk_used_max",
        "disk_used_mean",
    ] {
        assert_eq!(json[key].as_array().map(|a| a.len()), Some(2), "{}", key);
    }
}

#[test]
fn test_process_rank_entry_keys() {
    let entry = ProcessRankEntry {
        pid: 200,
        name: "postgres".into(),
        cpu_max: 50.0,
        cpu_min: 50.0,
        cpu_mean: 50.0,
    };
    let json = serde_json::to_string(&entry).unwrap();
    assert!(json.contains("\"cpu_max\""));
    assert!(json.contains("\"cpu_min\""));
    assert!(json.contains("\"cpu_mean\""));
    let back: ProcessRankEntry = serde_json::from_str(&json).unwrap();
    assert_eq!(back, entry);
}

#[test]
fn test_duration_info_listing_shape() {
    let infos: Vec<DurationInfo> = DurationCatalog::default()
        .iter()
        .map(DurationInfo::from)
        .collect();
    assert_eq!(infos[0].name, "3h");
    assert_eq!(infos[0].period_start, "-3h");
    assert_eq!(infos[0].period_seconds, 10_800);
    assert_eq!(infos[0].every, "1m");
    assert_eq!(infos[0].every_seconds, 60);
    assert_eq!(infos[3].every, "8m");
    assert_eq!(infos[4].period_start, "-1w");
    assert_eq!(infos[4].every, "1h");
}

#[test]
fn test_catalog_rejects_out_of_range_index() {
    let catalog = DurationCatalog::default();
    assert_eq!(catalog.get(0).unwrap().every_secs, 60);
    assert!(matches!(
        catalog.get(99),
        Err(MonitorError::InvalidArgument(_))
    ));
}
