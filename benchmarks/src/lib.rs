//! Synthetic series generators for the post-processing benchmarks.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Deterministic noisy series around `base` with occasional large spikes,
/// shaped like a latency trace with outliers.
pub fn spiky_series(len: usize, base: f64, seed: u64) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..len)
        .map(|_| {
            let noise: f64 = rng.gen_range(-1.0..1.0);
            if rng.gen_ratio(1, 50) {
                base * 10.0
            } else {
                base + noise
            }
        })
        .collect()
}
