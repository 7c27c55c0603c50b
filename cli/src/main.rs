use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod error;
mod output;
mod prompt;

use commands::{PollArgs, ProbeArgs};
use netgauge_sampler::{config, Result, SamplerConfig};
use output::OutputManager;

#[derive(Parser)]
#[command(name = "netgauge")]
#[command(about = "Netgauge - client-side network and system telemetry sampler")]
#[command(version)]
#[command(long_about = "
Netgauge samples latency, throughput and local resource usage over a fixed
window and writes the collected time series to a CSV-style log and a JSON
dump.

Examples:
  netgauge probe example.com --duration 2m        # local ICMP/HTTP probing
  netgauge probe                                  # prompt for every input
  netgauge poll http://127.0.0.1:5000/api \\
      --duration 30 --threshold 1000000           # poll a remote metrics API
")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// Quiet mode (minimal output)
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Configuration file path
    #[arg(long, global = true, env = "NETGAUGE_CONFIG")]
    config: Option<PathBuf>,

    /// Never prompt; fail when a required value is missing
    #[arg(long, global = true)]
    no_input: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Probe a target directly: ICMP latency, bulk-download throughput and
    /// local CPU/memory on concurrent loops
    Probe(ProbeArgs),

    /// Poll a remote metrics API on a fixed cadence and classify attack
    /// phases
    Poll(PollArgs),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_logging(&cli);

    if let Err(e) = run_command(cli).await {
        eprintln!("{}", error::format_error(&e));
        process::exit(e.exit_code());
    }
}

async fn run_command(cli: Cli) -> Result<()> {
    let config_path = cli.config.clone().or_else(config::default_config_path);
    let config = SamplerConfig::load(config_path.as_deref())?;
    info!("configuration loaded");

    let colored = !cli.quiet && console::Term::stdout().features().colors_supported();
    let output = OutputManager::new(colored, cli.quiet);
    let interactive = !cli.no_input;

    match cli.command {
        Commands::Probe(args) => commands::probe::run(args, &config, &output, interactive).await,
        Commands::Poll(args) => commands::poll::run(args, &config, &output, interactive).await,
    }
}

fn init_logging(cli: &Cli) {
    let log_level = if cli.debug {
        tracing::Level::DEBUG
    } else if cli.verbose {
        tracing::Level::INFO
    } else if cli.quiet {
        tracing::Level::ERROR
    } else {
        tracing::Level::WARN
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("netgauge={0},netgauge_sampler={0}", log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert()
    }

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::try_parse_from(["netgauge", "probe", "example.com"]).unwrap();
        assert!(matches!(cli.command, Commands::Probe(_)));

        let cli = Cli::try_parse_from([
            "netgauge",
            "--verbose",
            "poll",
            "http://127.0.0.1:5000/api",
            "--duration",
            "30",
        ])
        .unwrap();
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Poll(_)));
    }
}
