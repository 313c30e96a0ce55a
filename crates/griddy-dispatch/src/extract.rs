//! C5: turn a solved MILP into the `DispatchInstruction` list the link
//! layer actually sends out for the next epoch.

use griddy_core::{DispatchInstruction, EnergySource};

use crate::solution::DispatchSolution;

/// Flows below this are floating-point noise, not real routing (spec.md
/// §4.5).
const FLOW_EPSILON: f64 = 1e-6;

/// Extract instructions for epoch 1 (the next epoch to dispatch) from a
/// solved problem. Flows at or below [`FLOW_EPSILON`] are dropped rather
/// than sent as a dispatch of effectively zero amps, and surviving values
/// are rounded to 3 decimal places to match the wire codec's precision.
pub fn extract_dispatch(
    solution: &DispatchSolution,
    node_ids: &[u8],
    sources: &[EnergySource],
) -> Vec<DispatchInstruction> {
    if !solution.status.is_usable() {
        return Vec::new();
    }

    let mut instructions = Vec::new();
    for &node_id in node_ids {
        for source in sources {
            let flow = solution.flow(&source.id, node_id, 1);
            if flow > FLOW_EPSILON {
                instructions.push(DispatchInstruction {
                    node_id,
                    supply_amps: round3(flow),
                    source_id: source.id.clone(),
                });
            }
        }
    }
    instructions
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solution::SolutionStatus;
    use std::collections::HashMap;

    fn source(id: &str) -> EnergySource {
        EnergySource {
            id: id.to_string(),
            max_supply_amps: 10.0,
            cost_per_amp: 0.1,
            ramp_limit_amps: None,
        }
    }

    #[test]
    fn drops_flows_at_or_below_epsilon() {
        let mut flows = HashMap::new();
        flows.insert(("s1".to_string(), 1u8, 1usize), 1e-9);
        flows.insert(("s1".to_string(), 2u8, 1usize), 2.5001234);
        let solution = DispatchSolution {
            status: SolutionStatus::Optimal,
            objective: 0.0,
            solve_time_ms: 1.0,
            flows,
        };

        let instructions = extract_dispatch(&solution, &[1, 2], &[source("s1")]);
        assert_eq!(instructions.len(), 1);
        assert_eq!(instructions[0].node_id, 2);
        assert_eq!(instructions[0].supply_amps, 2.5);
    }

    #[test]
    fn unusable_status_yields_no_instructions() {
        let solution = DispatchSolution::empty(SolutionStatus::Infeasible, 1.0);
        let instructions = extract_dispatch(&solution, &[1], &[source("s1")]);
        assert!(instructions.is_empty());
    }
}
