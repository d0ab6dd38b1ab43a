// Bucketing: window planning and per-bucket max/mean over raw system-stats samples.
// Pure functions; the engine in query::mod feeds them rows fetched from the store.

use std::collections::BTreeMap;

use crate::models::{AggregatedBucket, Field, FieldAggregate, QueryDuration, SystemStatsSample};
use crate::time::{floor_to, secs_to_us};

/// Time bounds for one query, all in µs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BucketWindow {
    pub width: i64,
    /// First instant whose samples count: resume point + 1µs, or now - lookback.
    pub effective_start: i64,
    /// Start of the first bucket lying entirely at or after effective_start.
    pub first_bucket: i64,
    /// floor(now, width); buckets starting here or later are still filling.
    pub cutoff: i64,
}

impl BucketWindow {
    pub fn plan(now: i64, duration: &QueryDuration, resume_after: Option<i64>) -> Self {
        let width = secs_to_us(duration.every_secs).max(1);
        let effective_start = match resume_after {
            Some(t) => t.saturating_add(1),
            None => now.saturating_sub(secs_to_us(duration.lookback_secs)),
        };
        let floor = floor_to(effective_start, width);
        let first_bucket = if floor == effective_start {
            floor
        } else {
            floor.saturating_add(width)
        };
        Self {
            width,
            effective_start,
            first_bucket,
            cutoff: floor_to(now, width),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.first_bucket >= self.cutoff
    }
}

#[derive(Debug, Clone, Copy)]
struct Acc {
    max: f64,
    sum: f64,
    count: u32,
}

impl Acc {
    fn new(v: f64) -> Self {
        Self {
            max: v,
            sum: v,
            count: 1,
        }
    }

    fn push(&mut self, v: f64) {
        self.max = self.max.max(v);
        self.sum += v;
        self.count += 1;
    }

    fn finish(self) -> FieldAggregate {
        let mean = self.sum / self.count as f64;
        // Rounding in the sum can put the mean of equal values one ulp above them.
        FieldAggregate {
            max: self.max,
            mean: mean.min(self.max),
        }
    }
}

/// Groups samples into closed buckets of `window`, ascending by start.
/// Samples outside [first_bucket, cutoff) are ignored, as are non-finite values.
/// Buckets with no usable sample are not emitted; fields with none are omitted.
pub fn aggregate_buckets(
    samples: &[SystemStatsSample],
    fields: &[Field],
    window: &BucketWindow,
) -> Vec<AggregatedBucket> {
    let mut by_bucket: BTreeMap<i64, BTreeMap<Field, Acc>> = BTreeMap::new();
    for s in samples {
        if s.capture_time < window.first_bucket || s.capture_time >= window.cutoff {
            continue;
        }
        let start = floor_to(s.capture_time, window.width);
        for &field in fields {
            let v = field.value(s);
            if !v.is_finite() {
                continue;
            }
            by_bucket
                .entry(start)
                .or_default()
                .entry(field)
                .and_modify(|a| a.push(v))
                .or_insert_with(|| Acc::new(v));
        }
    }

    by_bucket
        .into_iter()
        .map(|(bucket_start, accs)| AggregatedBucket {
            bucket_start,
            values: accs.into_iter().map(|(f, a)| (f, a.finish())).collect(),
        })
        .collect()
}
