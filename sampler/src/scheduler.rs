//! Sampling loop disciplines.
//!
//! Probe mode runs one concurrent loop per metric family against a shared
//! wall-clock deadline and joins them all before post-processing (a barrier
//! join, not a pipeline). Poll mode runs a single fixed-cadence loop that
//! appends one aligned row per tick. In both disciplines, per-sample
//! failures are logged and absorbed; once a run starts, nothing aborts it
//! before its deadline. Every loop owns its series exclusively until the
//! join, so no synchronization is needed.

use std::time::{Duration, Instant};

use tracing::{info, warn};

use crate::classify::classify;
use crate::error::Result;
use crate::probe::{PingProber, ResourceProbe, ThroughputSource};
use crate::remote::MetricsApi;
use crate::series::{Metric, Run, Series};

/// Timing for the independent-loop (probe) discipline.
#[derive(Debug, Clone, Copy)]
pub struct ProbeOptions {
    /// Shared wall-clock budget bounding every loop.
    pub duration: Duration,
    /// Sleep between latency and resource samples.
    pub cadence: Duration,
}

impl ProbeOptions {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            cadence: Duration::from_secs(1),
        }
    }
}

/// Timing and classification settings for the unified-loop (poll)
/// discipline.
#[derive(Debug, Clone, Copy)]
pub struct PollOptions {
    pub duration: Duration,
    /// Target tick spacing; slow API calls stretch it rather than causing
    /// burst catch-up.
    pub cadence: Duration,
    /// Per-metric averaging window requested from the remote API.
    pub api_window_secs: u64,
    /// Throughput above this (bytes/sec, strict) marks an attack phase.
    pub attack_threshold: f64,
}

impl PollOptions {
    pub fn new(duration: Duration, attack_threshold: f64) -> Self {
        Self {
            duration,
            cadence: Duration::from_millis(500),
            api_window_secs: 1,
            attack_threshold,
        }
    }
}

/// One aligned poll-mode tick, as handed to the per-iteration sink.
#[derive(Debug, Clone, Copy)]
pub struct PollRow {
    pub elapsed_secs: f64,
    pub cpu: f64,
    pub memory: f64,
    pub latency_secs: f64,
    pub throughput: f64,
    pub attack: bool,
}

/// Run the independent-loop discipline: latency, throughput and resource
/// loops sampled concurrently, each terminating on its own once the shared
/// deadline passes, then joined.
pub async fn run_probe<P, R, T>(
    opts: ProbeOptions,
    ping: &mut P,
    resources: &mut R,
    download: &mut T,
) -> Run
where
    P: PingProber,
    R: ResourceProbe,
    T: ThroughputSource,
{
    let started_at = chrono::Utc::now();
    let start = Instant::now();
    let deadline = start + opts.duration;
    info!(duration_secs = opts.duration.as_secs_f64(), "starting probe run");

    let (latency, (cpu, memory), throughput) = futures::join!(
        latency_loop(ping, start, deadline, opts.cadence),
        resource_loop(resources, start, deadline, opts.cadence),
        throughput_loop(download, start, deadline),
    );

    // Probe-mode timestamps track the throughput series, whose cadence is
    // self-paced by download duration.
    let timestamps = throughput.timestamps();
    let mut run = Run::new();
    run.started_at = started_at;
    run.cpu = cpu;
    run.memory = memory;
    run.latency = latency;
    run.throughput = throughput;
    run.timestamps = timestamps;
    run
}

/// Sleep one cadence tick, clipped to the remaining window so the sleep
/// never pushes a loop past its deadline.
async fn pace(cadence: Duration, deadline: Instant) {
    let remaining = deadline.saturating_duration_since(Instant::now());
    if !remaining.is_zero() {
        tokio::time::sleep(cadence.min(remaining)).await;
    }
}

async fn latency_loop<P: PingProber>(
    ping: &mut P,
    start: Instant,
    deadline: Instant,
    cadence: Duration,
) -> Series {
    let mut series = Series::new(Metric::Latency);
    while Instant::now() < deadline {
        match ping.ping_once().await {
            Ok(rtt_ms) => series.push(start.elapsed().as_secs_f64(), rtt_ms, true),
            Err(err) => {
                warn!(%err, "latency acquisition failed, recording zero");
                series.push_zero(start.elapsed().as_secs_f64());
            }
        }
        pace(cadence, deadline).await;
    }
    series
}

async fn resource_loop<R: ResourceProbe>(
    resources: &mut R,
    start: Instant,
    deadline: Instant,
    cadence: Duration,
) -> (Series, Series) {
    let mut cpu = Series::new(Metric::Cpu);
    let mut memory = Series::new(Metric::Memory);
    while Instant::now() < deadline {
        match resources.cpu_percent().await {
            Ok(value) => cpu.push(start.elapsed().as_secs_f64(), value, true),
            Err(err) => {
                warn!(%err, "cpu acquisition failed, recording zero");
                cpu.push_zero(start.elapsed().as_secs_f64());
            }
        }
        match resources.memory_percent() {
            Ok(value) => memory.push(start.elapsed().as_secs_f64(), value, true),
            Err(err) => {
                warn!(%err, "memory acquisition failed, recording zero");
                memory.push_zero(start.elapsed().as_secs_f64());
            }
        }
        pace(cadence, deadline).await;
    }
    (cpu, memory)
}

async fn throughput_loop<T: ThroughputSource>(
    download: &mut T,
    start: Instant,
    deadline: Instant,
) -> Series {
    let mut series = Series::new(Metric::Throughput);
    while Instant::now() < deadline {
        match download.download_once(deadline).await {
            Ok(bits_per_sec) => series.push(start.elapsed().as_secs_f64(), bits_per_sec, true),
            // Skip policy: a failed download appends nothing, unlike the
            // zero-fill loops above.
            Err(err) => warn!(%err, "throughput acquisition failed, skipping sample"),
        }
    }
    series
}

/// Run the unified-loop discipline: every tick fetches all four metrics
/// sequentially with per-call error isolation, classifies the tick, appends
/// one aligned row and reports it to `on_row`.
pub async fn run_poll<A, F>(api: &A, opts: PollOptions, mut on_row: F) -> Run
where
    A: MetricsApi,
    F: FnMut(&PollRow),
{
    let start = Instant::now();
    let deadline = start + opts.duration;
    info!(
        duration_secs = opts.duration.as_secs_f64(),
        attack_threshold = opts.attack_threshold,
        "starting poll run"
    );

    let mut run = Run::new();
    while Instant::now() < deadline {
        let elapsed = start.elapsed().as_secs_f64();

        let cpu = fetch_or_zero(api, Metric::Cpu, opts.api_window_secs).await;
        let memory = fetch_or_zero(api, Metric::Memory, opts.api_window_secs).await;
        let latency_ms = fetch_or_zero(api, Metric::Latency, opts.api_window_secs).await;
        let throughput = fetch_or_zero(api, Metric::Throughput, opts.api_window_secs).await;

        // Latency is reported by the API in milliseconds; series and log
        // both carry seconds.
        let latency = (latency_ms.0 / 1000.0, latency_ms.1);
        let attack = classify(throughput.0, opts.attack_threshold);

        run.push_row(elapsed, cpu, memory, latency, throughput, attack);
        on_row(&PollRow {
            elapsed_secs: elapsed,
            cpu: cpu.0,
            memory: memory.0,
            latency_secs: latency.0,
            throughput: throughput.0,
            attack,
        });

        pace(opts.cadence, deadline).await;
    }
    run
}

/// Isolate one acquirer call: any failure becomes a zero-filled, invalid
/// value and the tick goes on.
async fn fetch_or_zero<A: MetricsApi>(api: &A, metric: Metric, window_secs: u64) -> (f64, bool) {
    match checked_fetch(api, metric, window_secs).await {
        Ok(value) => (value, true),
        Err(err) => {
            warn!(%metric, %err, "remote acquisition failed, substituting zero");
            (0.0, false)
        }
    }
}

async fn checked_fetch<A: MetricsApi>(api: &A, metric: Metric, window_secs: u64) -> Result<f64> {
    let value = api.fetch(metric, window_secs).await?;
    if !value.is_finite() {
        return Err(crate::error::SamplerError::RemoteApi(format!(
            "non-finite value for '{}'",
            metric
        )));
    }
    Ok(value)
}
