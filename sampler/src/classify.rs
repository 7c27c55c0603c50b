//! Per-sample attack phase labelling.

/// Label a sample as attack traffic when its throughput strictly exceeds
/// the configured threshold. The boundary value itself is "normal"; there
/// is no hysteresis and no smoothing, each tick is classified on its own.
pub fn classify(throughput: f64, threshold: f64) -> bool {
    throughput > threshold
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn above_threshold_is_attack() {
        assert!(classify(1.5e6, 1e6));
    }

    #[test]
    fn boundary_is_excluded() {
        assert!(!classify(1e6, 1e6));
        assert!(!classify(0.0, 1e6));
    }
}
