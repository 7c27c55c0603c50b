//! Netgauge integration test support.
//!
//! Provides an in-process mock of the remote metrics API plus stub
//! acquirers for driving the schedulers without touching the network or
//! the ping binary.

use std::collections::HashMap;
use std::sync::Once;

use axum::{extract::Query, routing::get, Json, Router};
use serde_json::{json, Value};

use netgauge_sampler::error::Result as SamplerResult;
use netgauge_sampler::probe::{PingProber, ResourceProbe};
use netgauge_sampler::series::Metric;

pub const MOCK_CPU_PERCENT: f64 = 25.0;
pub const MOCK_MEMORY_PERCENT: f64 = 60.0;
pub const MOCK_LATENCY_MS: f64 = 20.0;
pub const MOCK_THROUGHPUT_BPS: f64 = 2_000_000.0;

/// Bytes served by the bulk download route.
pub const BULK_BODY_LEN: usize = 256 * 1024;

static INIT: Once = Once::new();

/// Install a tracing subscriber once for the whole test binary.
pub fn init_test_logging() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "warn".into()),
            )
            .with_test_writer()
            .try_init();
    });
}

/// Answer like the real metrics API: one documented field for the metric
/// named in the query string.
async fn metrics_handler(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
    let requested = params.get("metric").map(String::as_str);
    let field_value = |metric: Metric| -> (String, f64) {
        let value = match metric {
            Metric::Cpu => MOCK_CPU_PERCENT,
            Metric::Memory => MOCK_MEMORY_PERCENT,
            Metric::Latency => MOCK_LATENCY_MS,
            Metric::Throughput => MOCK_THROUGHPUT_BPS,
        };
        (metric.api_field().to_string(), value)
    };

    let mut body = serde_json::Map::new();
    for metric in Metric::ALL {
        if requested.is_none() || requested == Some(metric.wire_name()) {
            let (field, value) = field_value(metric);
            body.insert(field, json!(value));
        }
    }
    Json(Value::Object(body))
}

async fn bulk_handler() -> Vec<u8> {
    vec![0u8; BULK_BODY_LEN]
}

/// Start the mock server on an ephemeral port; returns its base URL.
pub async fn spawn_mock_server() -> anyhow::Result<String> {
    let app = Router::new()
        .route("/api", get(metrics_handler))
        .route("/bulk", get(bulk_handler));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        if let Err(err) = axum::serve(listener, app).await {
            tracing::error!(%err, "mock server exited");
        }
    });

    Ok(format!("http://{}", addr))
}

/// Pinger answering a constant round-trip time.
pub struct StubPinger {
    pub rtt_ms: f64,
}

impl PingProber for StubPinger {
    async fn ping_once(&mut self) -> SamplerResult<f64> {
        Ok(self.rtt_ms)
    }
}

/// Resource probe answering constant utilization percentages.
pub struct StubResources;

impl ResourceProbe for StubResources {
    async fn cpu_percent(&mut self) -> SamplerResult<f64> {
        Ok(MOCK_CPU_PERCENT)
    }

    fn memory_percent(&mut self) -> SamplerResult<f64> {
        Ok(MOCK_MEMORY_PERCENT)
    }
}
