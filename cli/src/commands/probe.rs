use clap::Args;
use std::path::PathBuf;
use std::time::Duration;

use netgauge_sampler::postprocess::process_probe_run;
use netgauge_sampler::scheduler::ProbeOptions;
use netgauge_sampler::target::{self, Target};
use netgauge_sampler::{
    run_probe, sink, HttpDownloader, IcmpPinger, Result, SamplerConfig, SamplerError, SystemProbe,
};

use crate::output::{mean, OutputManager};
use crate::prompt;

#[derive(Args, Debug)]
pub struct ProbeArgs {
    /// Target base URL or IP (e.g. google.com, https://google.com,
    /// 192.168.1.2); prompted for when omitted
    pub target: Option<String>,

    /// URL endpoint appended to the target (e.g. api/v1/resource)
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Target TCP port; scanned for when omitted
    #[arg(long)]
    pub port: Option<u16>,

    /// Test duration (e.g. 60s, 2m, or bare seconds)
    #[arg(long)]
    pub duration: Option<String>,

    /// Where to write the JSON dump (defaults to the configured path)
    #[arg(long)]
    pub json: Option<PathBuf>,
}

pub async fn run(
    args: ProbeArgs,
    config: &SamplerConfig,
    output: &OutputManager,
    interactive: bool,
) -> Result<()> {
    let target_input = match args.target {
        Some(input) => input,
        None if !interactive => {
            return Err(SamplerError::Parse(
                "missing target and prompting is disabled".to_string(),
            ))
        }
        None => loop {
            let input = prompt::prompt_line(
                "Enter the base URL or IP to test (e.g., google.com, https://google.com, 192.168.1.2): ",
            )?;
            if target::validate_target(&input).await {
                break input;
            }
            output.print_warning(&format!(
                "Invalid URL format: '{}'. Please enter a valid URL or IP address.",
                input
            ));
        },
    };

    let endpoint = prompt::optional(
        args.endpoint,
        interactive,
        "Enter the URL endpoint (optional, e.g., api/v1/resource): ",
        |s| Some(s.to_string()),
    )?
    .unwrap_or_default();

    let port = prompt::optional(
        args.port,
        interactive,
        "Enter the target port (optional): ",
        prompt::parse_port,
    )?;

    let duration_secs = match args.duration {
        Some(input) => target::parse_duration(&input)?,
        None if !interactive => config.sampling.default_duration_secs,
        None => prompt::required(None, true, "Enter the duration of the test (e.g., 60s or 2m): ", |s| {
            target::parse_duration(s)
        })?,
    };

    let mut probe_target = Target::resolve(
        &target_input,
        &endpoint,
        port,
        Duration::from_secs(duration_secs),
    )
    .await?;
    let port = probe_target
        .ensure_port(Duration::from_millis(config.timeouts.port_scan_timeout_ms))
        .await?;

    output.print_info(&format!(
        "Starting metrics for {} (IP: {}) on port {}...",
        probe_target.host, probe_target.resolved_addr, port
    ));
    output.print_info(&format!(
        "Measuring latency, throughput and resource usage for {} seconds...",
        duration_secs
    ));

    let mut pinger = IcmpPinger::new(
        probe_target.resolved_addr,
        Duration::from_secs(config.timeouts.ping_timeout_secs),
    );
    let mut resources = SystemProbe::new();
    let mut downloader = HttpDownloader::new(probe_target.normalize_url())?;

    let opts = ProbeOptions {
        duration: probe_target.duration,
        cadence: Duration::from_secs(config.sampling.probe_cadence_secs),
    };
    let run = run_probe(opts, &mut pinger, &mut resources, &mut downloader).await;

    let processed = process_probe_run(
        &run,
        config.analysis.zscore_threshold,
        config.analysis.smoothing_window,
    );

    let json_path = args.json.unwrap_or_else(|| config.output.json_path.clone());
    sink::write_json(&json_path, &run)?;

    output.print_success("Probe run completed");
    output.print_key_value("Latency samples", &run.latency.len().to_string());
    output.print_key_value("Throughput samples", &run.throughput.len().to_string());
    output.print_key_value(
        "Mean latency (filtered)",
        &format!("{:.2} ms", mean(&processed.latency)),
    );
    output.print_key_value(
        "Mean throughput (filtered)",
        &format!("{:.2} Mbps", mean(&processed.throughput) / 1e6),
    );
    output.print_key_value(
        "Mean CPU (smoothed)",
        &format!("{:.1} %", mean(&processed.cpu)),
    );
    output.print_key_value(
        "Mean memory (smoothed)",
        &format!("{:.1} %", mean(&processed.memory)),
    );
    output.print_key_value("Results saved to", &json_path.display().to_string());

    Ok(())
}
