//! Local metric acquirers for probe mode.
//!
//! Each acquirer produces one value for one metric family and never lets a
//! failure escape past its boundary with anything other than a per-sample
//! error. The traits exist so the schedulers can be driven by stub
//! implementations in tests.

use std::net::IpAddr;
use std::sync::OnceLock;
use std::time::{Duration, Instant};

use regex::Regex;
use sysinfo::System;
use tokio::process::Command;
use tracing::debug;

use crate::error::{Result, SamplerError};
use crate::series::Metric;

pub const DEFAULT_PING_TIMEOUT: Duration = Duration::from_secs(2);

/// One ICMP echo, yielding the round-trip time in milliseconds.
#[allow(async_fn_in_trait)]
pub trait PingProber {
    async fn ping_once(&mut self) -> Result<f64>;
}

/// Instantaneous CPU and memory utilization percentages.
#[allow(async_fn_in_trait)]
pub trait ResourceProbe {
    /// May block up to the OS sampling interval needed for an averaged
    /// percentage; that time counts against the remaining window budget.
    async fn cpu_percent(&mut self) -> Result<f64>;
    fn memory_percent(&mut self) -> Result<f64>;
}

/// One bulk download, yielding throughput in bits per second.
#[allow(async_fn_in_trait)]
pub trait ThroughputSource {
    async fn download_once(&mut self, deadline: Instant) -> Result<f64>;
}

/// Latency prober shelling out to the system `ping` binary, one echo per
/// call.
pub struct IcmpPinger {
    addr: IpAddr,
    timeout: Duration,
}

impl IcmpPinger {
    pub fn new(addr: IpAddr, timeout: Duration) -> Self {
        Self { addr, timeout }
    }
}

impl PingProber for IcmpPinger {
    async fn ping_once(&mut self) -> Result<f64> {
        let output = tokio::time::timeout(
            self.timeout,
            ping_command(self.addr, self.timeout).output(),
        )
        .await
        .map_err(|_| SamplerError::Timeout)??;

        if !output.status.success() {
            return Err(SamplerError::Acquisition {
                metric: Metric::Latency,
                reason: format!("ping exited with {}", output.status),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        parse_rtt_ms(&stdout)
            .ok_or_else(|| SamplerError::MalformedPing("no time= field in output".to_string()))
    }
}

/// One-echo ping invocation. `-W` caps the binary's own wait (whole
/// seconds, minimum 1); the caller still wraps the spawn in a tokio timeout
/// so a wedged binary cannot stall the loop.
fn ping_command(addr: IpAddr, timeout: Duration) -> Command {
    let mut cmd = Command::new("ping");
    cmd.arg("-c")
        .arg("1")
        .arg("-W")
        .arg(timeout.as_secs().max(1).to_string())
        .arg(addr.to_string());
    cmd
}

fn rtt_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"time[=<]([0-9.]+)\s*ms").expect("static pattern compiles"))
}

/// Extract the round-trip time from `ping` output.
pub fn parse_rtt_ms(output: &str) -> Option<f64> {
    rtt_regex()
        .captures(output)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<f64>().ok())
}

/// CPU/memory probe over `sysinfo`.
pub struct SystemProbe {
    sys: System,
}

impl SystemProbe {
    pub fn new() -> Self {
        Self { sys: System::new() }
    }
}

impl Default for SystemProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourceProbe for SystemProbe {
    async fn cpu_percent(&mut self) -> Result<f64> {
        // Two refreshes separated by the crate's minimum interval are
        // required for a meaningful averaged percentage.
        self.sys.refresh_cpu();
        tokio::time::sleep(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL).await;
        self.sys.refresh_cpu();
        Ok(self.sys.global_cpu_info().cpu_usage() as f64)
    }

    fn memory_percent(&mut self) -> Result<f64> {
        self.sys.refresh_memory();
        let total = self.sys.total_memory();
        if total == 0 {
            return Err(SamplerError::Acquisition {
                metric: Metric::Memory,
                reason: "total memory reported as zero".to_string(),
            });
        }
        Ok(self.sys.used_memory() as f64 / total as f64 * 100.0)
    }
}

/// Streaming bulk downloader measuring achieved throughput.
pub struct HttpDownloader {
    client: reqwest::Client,
    url: String,
}

impl HttpDownloader {
    pub fn new(url: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .build()?;
        Ok(Self { client, url })
    }
}

impl ThroughputSource for HttpDownloader {
    async fn download_once(&mut self, deadline: Instant) -> Result<f64> {
        let download_start = Instant::now();
        let mut response = self.client.get(&self.url).send().await?;

        let mut total_bytes: u64 = 0;
        while let Some(chunk) = response.chunk().await? {
            total_bytes += chunk.len() as u64;
            if Instant::now() >= deadline {
                debug!(total_bytes, "window deadline reached mid-download");
                break;
            }
        }

        let elapsed = download_start.elapsed().as_secs_f64();
        if elapsed <= 0.0 {
            return Err(SamplerError::Acquisition {
                metric: Metric::Throughput,
                reason: "download completed in zero time".to_string(),
            });
        }
        Ok((total_bytes * 8) as f64 / elapsed)
    }
}
