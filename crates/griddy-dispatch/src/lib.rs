//! # griddy-dispatch: MILP dispatch optimizer (C4), extractor (C5), and
//! confidence estimator (C6).

mod confidence;
mod extract;
mod milp;
mod problem;
mod solution;
mod solver;

pub use confidence::{
    confidence, should_escalate, supply_term, time_term, variance_term, ConfidenceWeights,
};
pub use extract::extract_dispatch;
pub use milp::{solve_dispatch, solve_dispatch_with_deadline, DEFAULT_SOLVER_DEADLINE};
pub use problem::{build_problem, DispatchConfig, DispatchProblem};
pub use solution::{DispatchSolution, FlowKey, SolutionStatus};
pub use solver::{CbcBackend, MilpBackend, StubBackend};
