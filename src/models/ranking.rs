use serde::{Deserialize, Serialize};

/// One process's CPU summary over a ranking window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessRankEntry {
    pub pid: u32,
    pub name: String,
    pub cpu_max: f64,
    pub cpu_min: f64,
    /// Mean rounded to one decimal place, then clamped into [cpu_min, cpu_max].
    /// The clamp wins when rounding would leave that range (a lone 5.04 stays 5.04).
    pub cpu_mean: f64,
}
