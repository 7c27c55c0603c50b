//! Remote metrics API client for poll mode.
//!
//! The endpoint answers `GET <base>?metric=<name>&duration=<n>` with a JSON
//! object carrying one documented field per metric. Failures never abort a
//! run; the unified loop substitutes 0.0 and keeps its cadence.

use std::time::Duration;

use serde_json::Value;
use tracing::debug;

use crate::error::{Result, SamplerError};
use crate::series::Metric;

pub const DEFAULT_API_TIMEOUT: Duration = Duration::from_secs(5);

/// One remote fetch per metric per tick. Stubbed out in scheduler tests.
#[allow(async_fn_in_trait)]
pub trait MetricsApi {
    async fn fetch(&self, metric: Metric, duration_secs: u64) -> Result<f64>;
}

#[derive(Clone)]
pub struct RemoteClient {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl RemoteClient {
    pub fn new(base_url: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(DEFAULT_API_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            base_url,
            timeout: DEFAULT_API_TIMEOUT,
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl MetricsApi for RemoteClient {
    async fn fetch(&self, metric: Metric, duration_secs: u64) -> Result<f64> {
        let request = self
            .client
            .get(&self.base_url)
            .query(&[
                ("metric", metric.wire_name().to_string()),
                ("duration", duration_secs.to_string()),
            ])
            .timeout(self.timeout);

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SamplerError::RemoteApi(format!(
                "HTTP {} for metric '{}'",
                status, metric
            )));
        }

        let body: Value = response.json().await?;
        debug!(%metric, ?body, "remote metrics response");

        body.get(metric.api_field())
            .and_then(Value::as_f64)
            .ok_or_else(|| {
                SamplerError::RemoteApi(format!(
                    "response missing field '{}'",
                    metric.api_field()
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_builds_with_default_timeout() {
        let client = RemoteClient::new("http://127.0.0.1:1/api".to_string()).unwrap();
        assert_eq!(client.timeout, DEFAULT_API_TIMEOUT);
        let client = client.with_timeout(Duration::from_secs(1));
        assert_eq!(client.timeout, Duration::from_secs(1));
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_a_remote_failure_not_a_panic() {
        // Port 1 on localhost refuses connections immediately.
        let client = RemoteClient::new("http://127.0.0.1:1/api".to_string()).unwrap();
        let err = client.fetch(Metric::Cpu, 1).await.unwrap_err();
        assert!(!err.is_fatal());
    }
}
