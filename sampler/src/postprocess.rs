//! Post-hoc filtering and smoothing over completed series.
//!
//! Both operations are pure and run only after a sampling window closes.
//! They are never composed on the same series: local-probe runs filter
//! latency/throughput and smooth cpu/memory.

use crate::series::Run;

pub const DEFAULT_ZSCORE_THRESHOLD: f64 = 2.0;
pub const DEFAULT_SMOOTHING_WINDOW: usize = 3;

/// Drop values whose absolute z-score against the population mean exceeds
/// `threshold`. A zero-variance series is returned unchanged rather than
/// dividing by zero.
pub fn filter_outliers(values: &[f64], threshold: f64) -> Vec<f64> {
    if values.is_empty() {
        return Vec::new();
    }

    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    let stddev = variance.sqrt();

    if stddev < 1e-10 {
        return values.to_vec();
    }

    values
        .iter()
        .copied()
        .filter(|v| ((v - mean) / stddev).abs() <= threshold)
        .collect()
}

/// Simple moving average with valid-convolution semantics: the output has
/// `len - window + 1` points. Inputs shorter than the window are returned
/// unchanged. Callers pairing the result with a timestamp sequence must
/// re-derive that sequence to match the shorter output.
pub fn moving_average(values: &[f64], window: usize) -> Vec<f64> {
    if window == 0 || values.len() < window {
        return values.to_vec();
    }

    values
        .windows(window)
        .map(|w| w.iter().sum::<f64>() / window as f64)
        .collect()
}

/// Post-processed view of a local-probe run.
#[derive(Debug, Clone)]
pub struct ProcessedRun {
    pub latency: Vec<f64>,
    pub throughput: Vec<f64>,
    pub cpu: Vec<f64>,
    pub memory: Vec<f64>,
}

/// Apply the local-probe policy: outlier-filter the network series, smooth
/// the resource series.
pub fn process_probe_run(run: &Run, zscore_threshold: f64, window: usize) -> ProcessedRun {
    ProcessedRun {
        latency: filter_outliers(&run.latency.values(), zscore_threshold),
        throughput: filter_outliers(&run.throughput.values(), zscore_threshold),
        cpu: moving_average(&run.cpu.values(), window),
        memory: moving_average(&run.memory.values(), window),
    }
}
