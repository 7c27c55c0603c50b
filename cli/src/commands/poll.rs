use clap::Args;
use std::path::PathBuf;
use std::time::Duration;
use tracing::warn;

use netgauge_sampler::scheduler::PollOptions;
use netgauge_sampler::{run_poll, sink, LogSink, RemoteClient, Result, SamplerConfig, SamplerError};

use crate::output::OutputManager;
use crate::prompt;

#[derive(Args, Debug)]
pub struct PollArgs {
    /// Metrics API base URL (e.g. http://127.0.0.1:5000/api); prompted for
    /// when omitted
    pub url: Option<String>,

    /// Monitoring duration in seconds
    #[arg(long)]
    pub duration: Option<u64>,

    /// Throughput threshold for attack detection (bytes/sec)
    #[arg(long)]
    pub threshold: Option<f64>,

    /// Where to write the per-iteration CSV log
    #[arg(long)]
    pub log: Option<PathBuf>,

    /// Where to write the JSON dump
    #[arg(long)]
    pub json: Option<PathBuf>,
}

pub async fn run(
    args: PollArgs,
    config: &SamplerConfig,
    output: &OutputManager,
    interactive: bool,
) -> Result<()> {
    let url = prompt::required(
        args.url,
        interactive,
        "Enter the API endpoint URL (e.g., http://127.0.0.1:5000/api): ",
        |s| {
            if s.is_empty() {
                Err(SamplerError::Parse("URL must not be empty".to_string()))
            } else {
                Ok(s.to_string())
            }
        },
    )?;

    let duration_secs = match args.duration {
        Some(secs) => secs,
        None if !interactive => config.sampling.default_duration_secs,
        None => prompt::required(None, true, "Enter the monitoring duration (seconds): ", |s| {
            s.parse::<u64>()
                .map_err(|_| SamplerError::Parse(format!("invalid duration: '{}'", s)))
        })?,
    };

    let threshold = match args.threshold {
        Some(threshold) => threshold,
        None if !interactive => config.analysis.throughput_threshold,
        None => prompt::required(
            None,
            true,
            "Enter throughput threshold for attack detection (Bytes/sec): ",
            |s| {
                s.parse::<u64>()
                    .map(|v| v as f64)
                    .map_err(|_| SamplerError::Parse(format!("invalid threshold: '{}'", s)))
            },
        )?,
    };

    let client = RemoteClient::new(url.clone())?
        .with_timeout(Duration::from_secs(config.timeouts.api_timeout_secs));

    let log_path = args.log.unwrap_or_else(|| config.output.log_path.clone());
    let json_path = args.json.unwrap_or_else(|| config.output.json_path.clone());
    let mut log = LogSink::create(&log_path)?;

    output.print_info("Monitoring system metrics via server API...");

    let opts = PollOptions {
        duration: Duration::from_secs(duration_secs),
        cadence: Duration::from_millis(config.sampling.poll_cadence_ms),
        api_window_secs: 1,
        attack_threshold: threshold,
    };
    let run = run_poll(&client, opts, |row| {
        if let Err(err) = log.append(row) {
            warn!(%err, "failed to append log row");
        }
    })
    .await;

    sink::write_json(&json_path, &run)?;

    let attack_ticks = run.attack_phases.iter().filter(|&&attack| attack).count();
    output.print_success("Poll run completed");
    output.print_key_value("Samples", &run.aligned_len().to_string());
    output.print_key_value(
        "Attack ticks",
        &format!("{} of {}", attack_ticks, run.aligned_len()),
    );
    output.print_key_value("Log saved to", &log_path.display().to_string());
    output.print_key_value("Results saved to", &json_path.display().to_string());

    Ok(())
}
