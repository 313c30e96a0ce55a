//! C10: rolling, bounded metrics windows. No persistence; everything
//! resets on restart (spec.md §4.10).

use std::collections::VecDeque;

/// A fixed-capacity FIFO window, oldest entries evicted first.
#[derive(Debug, Clone)]
struct Window<T> {
    capacity: usize,
    values: VecDeque<T>,
}

impl<T> Window<T> {
    fn new(capacity: usize) -> Self {
        Self {
            capacity,
            values: VecDeque::with_capacity(capacity),
        }
    }

    fn push(&mut self, value: T) {
        if self.values.len() >= self.capacity {
            self.values.pop_front();
        }
        self.values.push_back(value);
    }
}

impl Window<f64> {
    fn mean(&self) -> Option<f64> {
        if self.values.is_empty() {
            return None;
        }
        Some(self.values.iter().sum::<f64>() / self.values.len() as f64)
    }

    /// `1 / mean(adjacent deltas)`, i.e. an events-per-second rate
    /// inferred from a window of timestamps (spec.md §4.10).
    fn rate(&self) -> Option<f64> {
        if self.values.len() < 2 {
            return None;
        }
        let deltas: Vec<f64> = self
            .values
            .iter()
            .zip(self.values.iter().skip(1))
            .map(|(a, b)| b - a)
            .collect();
        let mean_delta = deltas.iter().sum::<f64>() / deltas.len() as f64;
        if mean_delta <= 0.0 {
            None
        } else {
            Some(1.0 / mean_delta)
        }
    }
}

const SHORT_WINDOW: usize = 50;
const LONG_WINDOW: usize = 100;

/// All rolling metrics for the controller, guarded by the same mutex as
/// the ring buffer in the production wiring.
#[derive(Debug, Clone)]
pub struct Metrics {
    opt_time_ms: Window<f64>,
    dispatch_counts: Window<f64>,
    inbound_timestamps: Window<f64>,
    outbound_timestamps: Window<f64>,
    confidence: Window<f64>,
    escalation_times_ms: Window<f64>,
    decode_failures: u64,
    cycles_failed: u64,
}

impl Default for Metrics {
    fn default() -> Self {
        Self {
            opt_time_ms: Window::new(SHORT_WINDOW),
            dispatch_counts: Window::new(SHORT_WINDOW),
            inbound_timestamps: Window::new(LONG_WINDOW),
            outbound_timestamps: Window::new(LONG_WINDOW),
            confidence: Window::new(LONG_WINDOW),
            escalation_times_ms: Window::new(SHORT_WINDOW),
            decode_failures: 0,
            cycles_failed: 0,
        }
    }
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_inbound(&mut self, timestamp: f64) {
        self.inbound_timestamps.push(timestamp);
    }

    pub fn record_outbound(&mut self, timestamp: f64) {
        self.outbound_timestamps.push(timestamp);
    }

    pub fn record_opt_time_ms(&mut self, value: f64) {
        self.opt_time_ms.push(value);
    }

    pub fn record_dispatch_count(&mut self, count: usize) {
        self.dispatch_counts.push(count as f64);
    }

    pub fn record_confidence(&mut self, value: f64) {
        self.confidence.push(value);
    }

    pub fn record_escalation_time_ms(&mut self, value: f64) {
        self.escalation_times_ms.push(value);
    }

    pub fn record_decode_failure(&mut self) {
        self.decode_failures += 1;
    }

    pub fn record_cycle_failed(&mut self) {
        self.cycles_failed += 1;
    }

    pub fn mean_opt_time_ms(&self) -> Option<f64> {
        self.opt_time_ms.mean()
    }

    pub fn mean_confidence(&self) -> Option<f64> {
        self.confidence.mean()
    }

    pub fn mean_dispatch_count(&self) -> Option<f64> {
        self.dispatch_counts.mean()
    }

    /// Inbound telemetry frame rate, frames/second, derived from the
    /// trailing timestamp window.
    pub fn inbound_rate_hz(&self) -> Option<f64> {
        self.inbound_timestamps.rate()
    }

    /// Outbound dispatch frame rate, frames/second.
    pub fn outbound_rate_hz(&self) -> Option<f64> {
        self.outbound_timestamps.rate()
    }

    pub fn decode_failures(&self) -> u64 {
        self.decode_failures
    }

    pub fn cycles_failed(&self) -> u64 {
        self.cycles_failed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_is_inverse_of_mean_adjacent_delta() {
        let mut metrics = Metrics::new();
        for t in [0.0, 1.0, 2.0, 3.0] {
            metrics.record_inbound(t);
        }
        assert_eq!(metrics.inbound_rate_hz(), Some(1.0));
    }

    #[test]
    fn rate_is_none_with_fewer_than_two_samples() {
        let mut metrics = Metrics::new();
        metrics.record_inbound(1.0);
        assert_eq!(metrics.inbound_rate_hz(), None);
    }

    #[test]
    fn windows_evict_oldest_beyond_capacity() {
        let mut metrics = Metrics::new();
        for i in 0..150 {
            metrics.record_confidence(i as f64);
        }
        // Only the last 100 should remain, so the mean should reflect
        // that trailing window, not the full 150-sample history.
        let mean = metrics.mean_confidence().unwrap();
        assert!(mean > 50.0 + 49.0 / 2.0 - 1.0);
    }
}
