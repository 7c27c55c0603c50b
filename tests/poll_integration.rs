//! End-to-end poll-mode runs against the in-process metrics endpoint.

use std::time::{Duration, Instant};

use netgauge_sampler::scheduler::PollOptions;
use netgauge_sampler::series::Metric;
use netgauge_sampler::{run_poll, sink, LogSink, RemoteClient};

use netgauge_tests::{
    init_test_logging, spawn_mock_server, MOCK_CPU_PERCENT, MOCK_LATENCY_MS, MOCK_THROUGHPUT_BPS,
};

fn fast_opts(duration_ms: u64, threshold: f64) -> PollOptions {
    PollOptions {
        duration: Duration::from_millis(duration_ms),
        cadence: Duration::from_millis(100),
        api_window_secs: 1,
        attack_threshold: threshold,
    }
}

#[tokio::test]
async fn poll_collects_aligned_classified_series() {
    init_test_logging();
    let base_url = spawn_mock_server().await.unwrap();
    let client = RemoteClient::new(format!("{}/api", base_url)).unwrap();

    let run = run_poll(&client, fast_opts(600, 1e6), |_| {}).await;

    let rows = run.aligned_len();
    assert!(rows >= 3, "expected several ticks, got {}", rows);
    for metric in Metric::ALL {
        assert_eq!(run.series(metric).len(), rows);
    }

    assert!((run.cpu.samples[0].value - MOCK_CPU_PERCENT).abs() < 1e-9);
    // Latency arrives in milliseconds and is stored in seconds.
    assert!((run.latency.samples[0].value - MOCK_LATENCY_MS / 1000.0).abs() < 1e-9);
    // 2e6 bytes/sec strictly exceeds the 1e6 threshold on every tick.
    assert!(run.attack_phases.iter().all(|&attack| attack));

    // Raising the threshold to the exact throughput flips every label:
    // the boundary is excluded.
    let run = run_poll(&client, fast_opts(400, MOCK_THROUGHPUT_BPS), |_| {}).await;
    assert!(run.attack_phases.iter().all(|&attack| !attack));
}

#[tokio::test]
async fn poll_zero_fills_when_the_endpoint_is_down() {
    init_test_logging();
    // Nothing listens on port 1; every fetch fails fast.
    let client = RemoteClient::new("http://127.0.0.1:1/api".to_string())
        .unwrap()
        .with_timeout(Duration::from_millis(200));

    let run = run_poll(&client, fast_opts(500, 1e6), |_| {}).await;

    let rows = run.aligned_len();
    assert!(rows >= 2, "run must complete to its deadline");
    for metric in Metric::ALL {
        let series = run.series(metric);
        assert_eq!(series.len(), rows);
        assert!(series.samples.iter().all(|s| s.value == 0.0 && !s.valid));
    }
    assert!(run.attack_phases.iter().all(|&attack| !attack));
}

#[tokio::test]
async fn poll_run_elapsed_time_is_bounded() {
    init_test_logging();
    let base_url = spawn_mock_server().await.unwrap();
    let client = RemoteClient::new(format!("{}/api", base_url)).unwrap();

    let opts = fast_opts(500, 1e6);
    let begun = Instant::now();
    let _ = run_poll(&client, opts, |_| {}).await;
    let elapsed = begun.elapsed();

    assert!(elapsed >= opts.duration);
    // Overrun is bounded by one tick's calls; the cadence sleep is clipped
    // to the remaining window.
    assert!(elapsed < opts.duration + Duration::from_secs(1));
}

#[tokio::test]
async fn poll_writes_both_sinks() {
    init_test_logging();
    let base_url = spawn_mock_server().await.unwrap();
    let client = RemoteClient::new(format!("{}/api", base_url)).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let log_path = dir.path().join("metrics.log");
    let json_path = dir.path().join("metrics.json");

    let mut log = LogSink::create(&log_path).unwrap();
    let run = run_poll(&client, fast_opts(400, 1e6), |row| {
        log.append(row).unwrap();
    })
    .await;
    drop(log);
    sink::write_json(&json_path, &run).unwrap();

    let log_content = std::fs::read_to_string(&log_path).unwrap();
    let mut lines = log_content.lines();
    assert_eq!(
        lines.next().unwrap(),
        "Timestamp,CPU_Usage(%),Memory_Usage(%),Latency(s),Throughput(Bytes/sec)"
    );
    assert_eq!(log_content.lines().count(), run.aligned_len() + 1);

    let dump: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&json_path).unwrap()).unwrap();
    assert_eq!(
        dump["timestamps"].as_array().unwrap().len(),
        run.aligned_len()
    );
    assert_eq!(
        dump["attack_phases"].as_array().unwrap().len(),
        run.aligned_len()
    );
    assert!((dump["cpu_usage"][0].as_f64().unwrap() - MOCK_CPU_PERCENT).abs() < 1e-9);
}
