// Top CPU consumers: reduce raw process rows in a window to one summary per pid.

use std::collections::BTreeMap;

use crate::models::{ProcessCpuSample, ProcessRankEntry};

struct PidAcc<'a> {
    name: &'a str,
    max: f64,
    min: f64,
    sum: f64,
    count: u32,
}

fn round_tenth(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

/// Groups by pid (name from the pid's first row in `samples`), computes max/min/mean,
/// sorts by mean descending then pid ascending, and keeps the first `cap` entries.
/// `samples` must be ascending by capture time for "first" to mean "earliest".
pub fn rank_processes(samples: &[ProcessCpuSample], cap: usize) -> Vec<ProcessRankEntry> {
    let mut by_pid: BTreeMap<u32, PidAcc<'_>> = BTreeMap::new();
    for s in samples {
        let v = s.cpu_percent;
        if !v.is_finite() {
            continue;
        }
        by_pid
            .entry(s.pid)
            .and_modify(|a| {
                a.max = a.max.max(v);
                a.min = a.min.min(v);
                a.sum += v;
                a.count += 1;
            })
            .or_insert(PidAcc {
                name: &s.name,
                max: v,
                min: v,
                sum: v,
                count: 1,
            });
    }

    let mut out: Vec<ProcessRankEntry> = by_pid
        .into_iter()
        .map(|(pid, a)| {
            // Rounding must not push the mean outside [min, max].
            let mean = round_tenth(a.sum / a.count as f64).clamp(a.min, a.max);
            ProcessRankEntry {
                pid,
                name: a.name.to_string(),
                cpu_max: a.max,
                cpu_min: a.min,
                cpu_mean: mean,
            }
        })
        .collect();

    out.sort_by(|a, b| b.cpu_mean.total_cmp(&a.cpu_mean).then(a.pid.cmp(&b.pid)));
    out.truncate(cap);
    out
}
