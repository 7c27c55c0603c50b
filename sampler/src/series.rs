//! Time-series data model shared by both sampling modes.
//!
//! A `Run` aggregates one `Series` per tracked metric. Series are built
//! incrementally while the sampling window is open and are immutable once
//! the window closes; post-processing and sinks only ever see completed
//! runs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The four quantities the sampler tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Cpu,
    Memory,
    Latency,
    Throughput,
}

/// What a sampling loop does when an acquisition fails.
///
/// Latency, CPU, memory and every remote-poll metric record a 0.0 sample so
/// index-aligned consumers never observe gaps. Local throughput instead
/// skips the append entirely; the asymmetry is deliberate and load-bearing
/// for downstream consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    ZeroFill,
    Skip,
}

impl Metric {
    pub const ALL: [Metric; 4] = [
        Metric::Cpu,
        Metric::Memory,
        Metric::Latency,
        Metric::Throughput,
    ];

    /// Name used in query strings and as the JSON dump key.
    pub fn wire_name(&self) -> &'static str {
        match self {
            Metric::Cpu => "cpu_usage",
            Metric::Memory => "memory_usage",
            Metric::Latency => "latency",
            Metric::Throughput => "throughput",
        }
    }

    /// Field the remote metrics API answers with for this metric.
    pub fn api_field(&self) -> &'static str {
        match self {
            Metric::Cpu => "cpu_usage_avg_percent",
            Metric::Memory => "memory_used_avg_percent",
            Metric::Latency => "latency_avg_ms",
            Metric::Throughput => "throughput_sent_avg_bytes_per_sec",
        }
    }

    /// Per-metric failure policy for the local-probe loops.
    pub fn failure_policy(&self) -> FailurePolicy {
        match self {
            Metric::Throughput => FailurePolicy::Skip,
            _ => FailurePolicy::ZeroFill,
        }
    }
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.wire_name())
    }
}

/// One timestamped measurement.
///
/// `valid` is false for zero-filled failure samples; the stored value is
/// always a finite number, never NaN.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub elapsed_secs: f64,
    pub metric: Metric,
    pub value: f64,
    pub valid: bool,
}

/// Insertion-ordered samples for one metric.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Series {
    pub metric: Metric,
    pub samples: Vec<Sample>,
}

impl Series {
    pub fn new(metric: Metric) -> Self {
        Self {
            metric,
            samples: Vec::new(),
        }
    }

    pub fn push(&mut self, elapsed_secs: f64, value: f64, valid: bool) {
        debug_assert!(value.is_finite(), "series values must be finite");
        self.samples.push(Sample {
            elapsed_secs,
            metric: self.metric,
            value,
            valid,
        });
    }

    /// Record a failed acquisition under the zero-fill policy.
    pub fn push_zero(&mut self, elapsed_secs: f64) {
        self.push(elapsed_secs, 0.0, false);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn values(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.value).collect()
    }

    pub fn timestamps(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.elapsed_secs).collect()
    }
}

/// A completed sampling window: one series per metric plus, in poll mode,
/// the shared timestamp sequence and the per-tick attack phase labels.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Run {
    pub started_at: DateTime<Utc>,
    pub cpu: Series,
    pub memory: Series,
    pub latency: Series,
    pub throughput: Series,
    pub timestamps: Vec<f64>,
    pub attack_phases: Vec<bool>,
}

impl Run {
    pub fn new() -> Self {
        Self {
            started_at: Utc::now(),
            cpu: Series::new(Metric::Cpu),
            memory: Series::new(Metric::Memory),
            latency: Series::new(Metric::Latency),
            throughput: Series::new(Metric::Throughput),
            timestamps: Vec::new(),
            attack_phases: Vec::new(),
        }
    }

    pub fn series(&self, metric: Metric) -> &Series {
        match metric {
            Metric::Cpu => &self.cpu,
            Metric::Memory => &self.memory,
            Metric::Latency => &self.latency,
            Metric::Throughput => &self.throughput,
        }
    }

    /// Append one aligned row (unified-loop discipline). Every series, the
    /// timestamp sequence and the phase sequence grow by exactly one.
    #[allow(clippy::too_many_arguments)]
    pub fn push_row(
        &mut self,
        elapsed_secs: f64,
        cpu: (f64, bool),
        memory: (f64, bool),
        latency: (f64, bool),
        throughput: (f64, bool),
        attack: bool,
    ) {
        self.timestamps.push(elapsed_secs);
        self.cpu.push(elapsed_secs, cpu.0, cpu.1);
        self.memory.push(elapsed_secs, memory.0, memory.1);
        self.latency.push(elapsed_secs, latency.0, latency.1);
        self.throughput.push(elapsed_secs, throughput.0, throughput.1);
        self.attack_phases.push(attack);
    }

    /// Number of aligned rows recorded by the unified loop.
    pub fn aligned_len(&self) -> usize {
        self.timestamps.len()
    }
}

impl Default for Run {
    fn default() -> Self {
        Self::new()
    }
}
