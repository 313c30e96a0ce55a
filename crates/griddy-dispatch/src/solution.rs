//! Solution representation returned by a MILP backend.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Status of a solver's attempt on a [`crate::problem::DispatchProblem`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolutionStatus {
    /// Optimal solution found within the deadline.
    Optimal,
    /// Problem is infeasible; never retried within the same cycle.
    Infeasible,
    /// Problem is unbounded (should not occur with bounded supply, but
    /// guarded against).
    Unbounded,
    /// Solver hit its wall-clock deadline before proving optimality. The
    /// best incumbent, if any, is still usable.
    Timeout,
    /// Backend-specific failure unrelated to feasibility.
    Error,
}

impl SolutionStatus {
    /// Whether a dispatch extracted from this solution should be trusted
    /// as-is (optimal or a timed-out-but-feasible incumbent).
    pub fn is_usable(&self) -> bool {
        matches!(self, SolutionStatus::Optimal | SolutionStatus::Timeout)
    }
}

/// Key identifying one `x[s, n, t]` decision variable value.
pub type FlowKey = (String, u8, usize);

/// The result of one solve attempt.
#[derive(Debug, Clone)]
pub struct DispatchSolution {
    pub status: SolutionStatus,
    pub objective: f64,
    pub solve_time_ms: f64,
    /// `x[source_id, node_id, epoch]` for every epoch, 1-indexed to match
    /// spec.md §4.4 (`t in 1..=horizon`). Empty when `status` is not
    /// usable and there was no incumbent.
    pub flows: HashMap<FlowKey, f64>,
}

impl DispatchSolution {
    pub fn empty(status: SolutionStatus, solve_time_ms: f64) -> Self {
        Self {
            status,
            objective: f64::NAN,
            solve_time_ms,
            flows: HashMap::new(),
        }
    }

    pub fn flow(&self, source_id: &str, node_id: u8, epoch: usize) -> f64 {
        self.flows
            .get(&(source_id.to_string(), node_id, epoch))
            .copied()
            .unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_with_incumbent_is_usable() {
        assert!(SolutionStatus::Timeout.is_usable());
        assert!(SolutionStatus::Optimal.is_usable());
        assert!(!SolutionStatus::Infeasible.is_usable());
        assert!(!SolutionStatus::Error.is_usable());
    }

    #[test]
    fn missing_flow_defaults_to_zero() {
        let solution = DispatchSolution::empty(SolutionStatus::Infeasible, 5.0);
        assert_eq!(solution.flow("s1", 1, 1), 0.0);
    }
}
