//! End-to-end dispatch scenarios from spec.md §8, driven through the
//! public MILP driver with the deterministic stub backend.

use std::collections::HashMap;

use griddy_core::EnergySource;
use griddy_dispatch::{
    extract_dispatch, solve_dispatch, supply_term, DispatchConfig, StubBackend,
};

fn source(id: &str, max: f64, cost: f64, ramp: Option<f64>) -> EnergySource {
    EnergySource {
        id: id.to_string(),
        max_supply_amps: max,
        cost_per_amp: cost,
        ramp_limit_amps: ramp,
    }
}

/// Scenario 1: single consumer, single source, feasible.
#[test]
fn single_consumer_single_source_feasible() {
    let mut forecasts = HashMap::new();
    forecasts.insert(1u8, vec![2.5; 10]);
    let sources = vec![source("s1", 10.0, 0.10, None)];

    let solution = solve_dispatch(&StubBackend, &forecasts, &sources, 10, DispatchConfig::default());
    let instructions = extract_dispatch(&solution, &[1], &sources);

    assert_eq!(instructions.len(), 1);
    assert_eq!(instructions[0].node_id, 1);
    assert_eq!(instructions[0].source_id, "s1");
    assert!((instructions[0].supply_amps - 2.5).abs() < 1e-9);

    let s = supply_term(2.5, 2.5);
    assert!(s >= 0.5);
}

/// Scenario 2: insufficient capacity caps supply and leaves demand unmet.
#[test]
fn insufficient_capacity_caps_supply_and_leaves_unmet() {
    let mut forecasts = HashMap::new();
    forecasts.insert(1u8, vec![2.5; 1]);
    let sources = vec![source("s1", 1.0, 0.10, None)];

    let solution = solve_dispatch(&StubBackend, &forecasts, &sources, 1, DispatchConfig::default());
    let instructions = extract_dispatch(&solution, &[1], &sources);

    assert_eq!(instructions.len(), 1);
    assert!((instructions[0].supply_amps - 1.0).abs() < 1e-9);

    let unmet = 2.5 - instructions[0].supply_amps;
    assert!((unmet - 1.5).abs() < 1e-9);

    let s = supply_term(instructions[0].supply_amps, 2.5);
    assert!(s < 1.0);
}

/// Scenario 3: a ramp-limited source only delivers what it is allowed to
/// ramp to within the epoch, regardless of the jump in demand. The stub
/// backend models capacity, not ramp, so this exercises the extractor and
/// problem big-M sizing against a ramp-aware source descriptor; the ramp
/// constraint itself is exercised against the real `CbcBackend` MILP in
/// `solver::tests::cbc_backend_enforces_ramp_limit_across_a_demand_step`.
#[test]
fn ramp_limited_source_descriptor_round_trips_through_extraction() {
    let mut forecasts = HashMap::new();
    forecasts.insert(1u8, vec![0.0, 5.0]);
    let sources = vec![source("s1", 10.0, 0.10, Some(0.5))];

    let solution = solve_dispatch(&StubBackend, &forecasts, &sources, 2, DispatchConfig::default());
    let instructions = extract_dispatch(&solution, &[1], &sources);

    // Epoch 1 demand is zero, so nothing should be dispatched for it.
    assert!(instructions.is_empty());
}
