//! Configuration for the sampler.
//!
//! Loaded with the usual fallback order: built-in defaults, then an
//! optional TOML file, then `NETGAUGE_` environment variables. CLI flags
//! override everything at the call site.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, SamplerError};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SamplerConfig {
    pub sampling: SamplingConfig,
    pub timeouts: TimeoutConfig,
    pub analysis: AnalysisConfig,
    pub output: OutputConfig,
}

/// Cadences and default window length.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingConfig {
    /// Default window when the user gives no duration.
    pub default_duration_secs: u64,
    /// Sleep between latency/resource samples in probe mode.
    pub probe_cadence_secs: u64,
    /// Target tick spacing in poll mode.
    pub poll_cadence_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    pub ping_timeout_secs: u64,
    pub api_timeout_secs: u64,
    pub port_scan_timeout_ms: u64,
}

/// Classifier and post-processor settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Bytes/sec; strictly above this marks an attack phase.
    pub throughput_threshold: f64,
    pub zscore_threshold: f64,
    pub smoothing_window: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub log_path: PathBuf,
    pub json_path: PathBuf,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            default_duration_secs: 60,
            probe_cadence_secs: 1,
            poll_cadence_ms: 500,
        }
    }
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            ping_timeout_secs: 2,
            api_timeout_secs: 5,
            port_scan_timeout_ms: 100,
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            throughput_threshold: 1e6,
            zscore_threshold: 2.0,
            smoothing_window: 3,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            log_path: PathBuf::from("netgauge_metrics.log"),
            json_path: PathBuf::from("netgauge_metrics.json"),
        }
    }
}

impl SamplerConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|_| {
            SamplerError::Config(config::ConfigError::Message(format!(
                "config file not found: {}",
                path.display()
            )))
        })?;

        let cfg: SamplerConfig = toml::from_str(&content).map_err(|e| {
            SamplerError::Config(config::ConfigError::Message(format!(
                "invalid config file: {}",
                e
            )))
        })?;

        cfg.validate()?;
        Ok(cfg)
    }

    /// Apply `NETGAUGE_` environment overrides on top of `self`.
    pub fn apply_env(mut self) -> Result<Self> {
        if let Ok(duration) = std::env::var("NETGAUGE_DURATION_SECS") {
            self.sampling.default_duration_secs =
                parse_env("NETGAUGE_DURATION_SECS", &duration)?;
        }
        if let Ok(threshold) = std::env::var("NETGAUGE_THROUGHPUT_THRESHOLD") {
            self.analysis.throughput_threshold =
                parse_env("NETGAUGE_THROUGHPUT_THRESHOLD", &threshold)?;
        }
        if let Ok(log_path) = std::env::var("NETGAUGE_LOG_PATH") {
            self.output.log_path = PathBuf::from(log_path);
        }
        if let Ok(json_path) = std::env::var("NETGAUGE_JSON_PATH") {
            self.output.json_path = PathBuf::from(json_path);
        }
        self.validate()?;
        Ok(self)
    }

    /// Fallback order: defaults, then file (if present), then environment.
    pub fn load<P: AsRef<Path>>(config_path: Option<P>) -> Result<Self> {
        let mut cfg = SamplerConfig::default();
        if let Some(path) = config_path {
            if path.as_ref().exists() {
                cfg = SamplerConfig::from_file(path)?;
            }
        }
        cfg.apply_env()
    }

    pub fn validate(&self) -> Result<()> {
        if self.sampling.default_duration_secs == 0 {
            return Err(invalid("sampling.default_duration_secs", "0"));
        }
        if self.sampling.probe_cadence_secs == 0 {
            return Err(invalid("sampling.probe_cadence_secs", "0"));
        }
        if self.sampling.poll_cadence_ms == 0 {
            return Err(invalid("sampling.poll_cadence_ms", "0"));
        }
        if self.analysis.smoothing_window == 0 {
            return Err(invalid("analysis.smoothing_window", "0"));
        }
        if !(self.analysis.zscore_threshold > 0.0) {
            return Err(invalid(
                "analysis.zscore_threshold",
                &self.analysis.zscore_threshold.to_string(),
            ));
        }
        if !(self.analysis.throughput_threshold >= 0.0) {
            return Err(invalid(
                "analysis.throughput_threshold",
                &self.analysis.throughput_threshold.to_string(),
            ));
        }
        Ok(())
    }
}

fn invalid(field: &str, value: &str) -> SamplerError {
    SamplerError::Config(config::ConfigError::Message(format!(
        "invalid value for {}: {}",
        field, value
    )))
}

fn parse_env<T: std::str::FromStr>(name: &str, value: &str) -> Result<T> {
    value.parse().map_err(|_| {
        SamplerError::Config(config::ConfigError::Message(format!(
            "invalid value for {}: {}",
            name, value
        )))
    })
}

/// Default config file location: `~/.netgauge/config.toml`, overridable via
/// `NETGAUGE_CONFIG_DIR`.
pub fn default_config_path() -> Option<PathBuf> {
    if let Ok(dir) = std::env::var("NETGAUGE_CONFIG_DIR") {
        return Some(PathBuf::from(dir).join("config.toml"));
    }
    dirs::home_dir().map(|home| home.join(".netgauge").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        let cfg = SamplerConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.sampling.poll_cadence_ms, 500);
        assert_eq!(cfg.timeouts.api_timeout_secs, 5);
        assert_eq!(cfg.analysis.smoothing_window, 3);
    }

    #[test]
    fn partial_file_overrides_only_named_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[analysis]\nthroughput_threshold = 2000000.0\n\n[sampling]\ndefault_duration_secs = 10\n",
        )
        .unwrap();

        let cfg = SamplerConfig::from_file(&path).unwrap();
        assert_eq!(cfg.analysis.throughput_threshold, 2e6);
        assert_eq!(cfg.sampling.default_duration_secs, 10);
        // Untouched sections keep their defaults.
        assert_eq!(cfg.timeouts.ping_timeout_secs, 2);
    }

    #[test]
    fn zero_duration_is_rejected() {
        let mut cfg = SamplerConfig::default();
        cfg.sampling.default_duration_secs = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn missing_file_is_an_error_but_load_without_file_succeeds() {
        assert!(SamplerConfig::from_file("/definitely/missing.toml").is_err());
        let cfg = SamplerConfig::load(None::<&Path>).unwrap();
        assert!(cfg.validate().is_ok());
    }
}
