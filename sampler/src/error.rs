use thiserror::Error;

use crate::series::Metric;

#[derive(Error, Debug)]
pub enum SamplerError {
    #[error("Unable to resolve address for '{host}'")]
    AddressResolution { host: String },

    #[error("No open port found on {addr}")]
    PortUnavailable { addr: std::net::IpAddr },

    #[error("Acquisition failed for {metric}: {reason}")]
    Acquisition { metric: Metric, reason: String },

    #[error("Remote metrics API error: {0}")]
    RemoteApi(String),

    #[error("Malformed ping output: {0}")]
    MalformedPing(String),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Operation timed out")]
    Timeout,
}

impl SamplerError {
    /// Fatal errors abort the run before any sampling starts. Everything
    /// else is resolved per-sample inside the scheduling loops.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            SamplerError::AddressResolution { .. }
                | SamplerError::PortUnavailable { .. }
                | SamplerError::Config(_)
        )
    }

    pub fn exit_code(&self) -> i32 {
        match self {
            SamplerError::Config(_) => 1,
            SamplerError::Io(_) => 2,
            SamplerError::AddressResolution { .. } => 3,
            SamplerError::PortUnavailable { .. } => 4,
            SamplerError::Parse(_) => 5,
            SamplerError::RemoteApi(_) => 8,
            SamplerError::Http(_) => 9,
            SamplerError::Timeout => 124,
            _ => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, SamplerError>;
