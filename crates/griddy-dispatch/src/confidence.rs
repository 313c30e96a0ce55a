//! C6: score a solved cycle and decide whether to gate to escalation.

/// Below this many trailing demand records, the variance term defaults to
/// a neutral 0.5 instead of being computed (spec.md §4.6).
const VARIANCE_MIN_SAMPLE: usize = 10;
/// Trailing window over which the variance term is computed.
const VARIANCE_WINDOW: usize = 50;

/// Weighted combination of the three confidence terms, per spec.md §4.6.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConfidenceWeights {
    pub time: f64,
    pub supply: f64,
    pub variance: f64,
}

impl Default for ConfidenceWeights {
    fn default() -> Self {
        Self {
            time: 0.3,
            supply: 0.5,
            variance: 0.2,
        }
    }
}

/// `T = max(0, 1 - opt_time_ms/100)`.
pub fn time_term(opt_time_ms: f64) -> f64 {
    (1.0 - opt_time_ms / 100.0).max(0.0)
}

/// `S = min(1, sum(supply) / max(sum(demand), 0.1))`.
pub fn supply_term(total_supply: f64, total_demand: f64) -> f64 {
    (total_supply / total_demand.max(0.1)).min(1.0)
}

/// `V = max(0, 1 - var(recent)/max(mean(recent), 0.1))`, or 0.5 when fewer
/// than [`VARIANCE_MIN_SAMPLE`] trailing records exist. `recent_demands`
/// should already be truncated to the records the caller wants considered;
/// this function further restricts to the trailing [`VARIANCE_WINDOW`].
pub fn variance_term(recent_demands: &[f64]) -> f64 {
    let window_start = recent_demands.len().saturating_sub(VARIANCE_WINDOW);
    let window = &recent_demands[window_start..];
    if window.len() < VARIANCE_MIN_SAMPLE {
        return 0.5;
    }
    let mean = window.iter().sum::<f64>() / window.len() as f64;
    let variance = window.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / window.len() as f64;
    (1.0 - variance / mean.max(0.1)).max(0.0)
}

/// Combine the three terms into the final, clipped confidence score.
pub fn confidence(
    weights: ConfidenceWeights,
    opt_time_ms: f64,
    total_supply: f64,
    total_demand: f64,
    recent_demands: &[f64],
) -> f64 {
    let t = time_term(opt_time_ms);
    let s = supply_term(total_supply, total_demand);
    let v = variance_term(recent_demands);
    (weights.time * t + weights.supply * s + weights.variance * v).clamp(0.0, 1.0)
}

/// Whether `confidence` should trigger the escalation gate.
pub fn should_escalate(confidence: f64, threshold: f64) -> bool {
    confidence < threshold
}
