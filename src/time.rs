// Microsecond instants and bucket alignment.
// Every stored and queried instant is i64 microseconds since the Unix epoch (UTC).

use chrono::{DateTime, SecondsFormat, Utc};

use crate::error::{MonitorError, Result};

pub const MICROS_PER_SEC: i64 = 1_000_000;

pub fn now_us() -> i64 {
    Utc::now().timestamp_micros()
}

pub fn secs_to_us(secs: u64) -> i64 {
    (secs as i64).saturating_mul(MICROS_PER_SEC)
}

/// Largest multiple of `width_us` (from the epoch) that is <= `ts_us`.
pub fn floor_to(ts_us: i64, width_us: i64) -> i64 {
    if width_us <= 0 {
        return ts_us;
    }
    ts_us.div_euclid(width_us) * width_us
}

/// RFC 3339 with microsecond precision and `Z`; round-trips through [`parse_rfc3339`].
pub fn format_rfc3339(ts_us: i64) -> String {
    DateTime::<Utc>::from_timestamp_micros(ts_us)
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
        .to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn parse_rfc3339(s: &str) -> Result<i64> {
    DateTime::parse_from_rfc3339(s.trim())
        .map(|dt| dt.with_timezone(&Utc).timestamp_micros())
        .map_err(|e| MonitorError::InvalidArgument(format!("malformed time {:?}: {}", s, e)))
}

/// Compact unit form used by the durations listing: 3600 -> "1h", 90 -> "90s", 604800 -> "1w".
pub fn compact_secs(secs: u64) -> String {
    const UNITS: [(u64, &str); 5] = [(604_800, "w"), (86_400, "d"), (3_600, "h"), (60, "m"), (1, "s")];
    if secs == 0 {
        return "0s".into();
    }
    for (size, suffix) in UNITS {
        if secs % size == 0 {
            return format!("{}{}", secs / size, suffix);
        }
    }
    format!("{}s", secs)
}
