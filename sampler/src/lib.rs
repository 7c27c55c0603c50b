//! Netgauge sampling core
//!
//! This library provides the core functionality for the netgauge telemetry
//! sampler: metric acquirers for latency, throughput and local resource
//! usage, the two sampling-loop disciplines, post-hoc filtering and
//! smoothing, and the log/JSON sink adapters.

pub mod classify;
pub mod config;
pub mod error;
pub mod postprocess;
pub mod probe;
pub mod remote;
pub mod scheduler;
pub mod series;
pub mod sink;
pub mod target;

// Re-export commonly used types
pub use classify::classify;
pub use config::SamplerConfig;
pub use error::{Result, SamplerError};
pub use postprocess::{filter_outliers, moving_average, ProcessedRun};
pub use probe::{HttpDownloader, IcmpPinger, SystemProbe};
pub use remote::RemoteClient;
pub use scheduler::{run_poll, run_probe, PollOptions, PollRow, ProbeOptions};
pub use series::{FailurePolicy, Metric, Run, Sample, Series};
pub use sink::{write_json, LogSink};
pub use target::Target;
