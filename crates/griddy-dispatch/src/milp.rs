//! C4 driver: ties problem assembly and the solver backend together under a
//! single deadline, and is the only public entry point most callers need.

use std::time::Duration;

use griddy_core::EnergySource;
use std::collections::HashMap;

use crate::problem::{build_problem, DispatchConfig};
use crate::solution::DispatchSolution;
use crate::solver::MilpBackend;

/// Wall-clock budget for a single solve attempt, per spec.md §6.
pub const DEFAULT_SOLVER_DEADLINE: Duration = Duration::from_millis(500);

/// Build the dispatch problem and hand it to `backend` with the standard
/// deadline. Callers that need a custom deadline (e.g. the scheduler
/// shrinking it to whatever is left of the cycle budget) should call
/// [`build_problem`] and `backend.solve` directly instead.
pub fn solve_dispatch(
    backend: &dyn MilpBackend,
    forecasts: &HashMap<u8, Vec<f64>>,
    sources: &[EnergySource],
    horizon: usize,
    config: DispatchConfig,
) -> DispatchSolution {
    solve_dispatch_with_deadline(
        backend,
        forecasts,
        sources,
        horizon,
        config,
        DEFAULT_SOLVER_DEADLINE,
    )
}

pub fn solve_dispatch_with_deadline(
    backend: &dyn MilpBackend,
    forecasts: &HashMap<u8, Vec<f64>>,
    sources: &[EnergySource],
    horizon: usize,
    config: DispatchConfig,
    deadline: Duration,
) -> DispatchSolution {
    let problem = build_problem(forecasts, sources, horizon, config);
    backend.solve(&problem, deadline)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solution::SolutionStatus;
    use crate::solver::StubBackend;

    fn source(id: &str, max: f64, cost: f64) -> EnergySource {
        EnergySource {
            id: id.to_string(),
            max_supply_amps: max,
            cost_per_amp: cost,
            ramp_limit_amps: None,
        }
    }

    #[test]
    fn solve_dispatch_uses_default_deadline_and_returns_usable_status() {
        let mut forecasts = HashMap::new();
        forecasts.insert(1u8, vec![1.0, 1.0]);
        let solution = solve_dispatch(
            &StubBackend,
            &forecasts,
            &[source("s1", 5.0, 0.2)],
            2,
            DispatchConfig::default(),
        );
        assert_eq!(solution.status, SolutionStatus::Optimal);
        assert!(solution.status.is_usable());
    }
}
