//! Domain data model shared across the scheduling pipeline.
//!
//! These types are deliberately plain: no behavior beyond constructors and
//! the invariants the scheduler relies on. Stages (C2-C6) pass them by
//! value or by shared snapshot rather than mutating in place.

use serde::{Deserialize, Serialize};

/// A single demand reading from a node, immutable once enqueued into the
/// ring buffer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DemandRecord {
    pub timestamp: f64,
    pub node_id: u8,
    pub demand_amps: f64,
    pub fulfillment: f64,
}

/// Static configuration for an energy source; constant for the process
/// lifetime unless a reload occurs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnergySource {
    pub id: String,
    pub max_supply_amps: f64,
    pub cost_per_amp: f64,
    /// `None` means unbounded (no ramp constraint applied).
    pub ramp_limit_amps: Option<f64>,
}

/// Per-node state derived at the start of a cycle from the ring buffer.
/// Created fresh each cycle; discarded at cycle end.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeState {
    pub node_id: u8,
    /// Ordered by timestamp, oldest first.
    pub history: Vec<(f64, f64)>,
    pub latest_demand: f64,
    pub latest_fulfillment: f64,
}

/// A forecast of non-negative demand projections for one node, indexed
/// `0..horizon`, over epochs of `epoch_len` seconds each.
#[derive(Debug, Clone, PartialEq)]
pub struct Forecast {
    pub node_id: u8,
    pub values: Vec<f64>,
}

/// A single dispatch instruction for the next epoch: at most one per
/// `(node_id, source_id)` pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispatchInstruction {
    pub node_id: u8,
    pub supply_amps: f64,
    pub source_id: String,
}

/// Summary of one scheduling cycle, used for metrics and tests.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CycleReport {
    pub cycle_id: u64,
    pub opt_time_ms: f64,
    pub confidence: f64,
    pub dispatch_count: usize,
    pub unmet_total_amps: f64,
    pub escalated: bool,
}

impl CycleReport {
    /// Clamp confidence into `[0, 1]`, as required by the data model
    /// invariant.
    pub fn clamped(mut self) -> Self {
        self.confidence = self.confidence.clamp(0.0, 1.0);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycle_report_confidence_is_clamped() {
        let report = CycleReport {
            cycle_id: 1,
            opt_time_ms: 10.0,
            confidence: 1.5,
            dispatch_count: 0,
            unmet_total_amps: 0.0,
            escalated: false,
        }
        .clamped();
        assert_eq!(report.confidence, 1.0);

        let report = CycleReport {
            confidence: -0.3,
            ..report
        }
        .clamped();
        assert_eq!(report.confidence, 0.0);
    }
}
