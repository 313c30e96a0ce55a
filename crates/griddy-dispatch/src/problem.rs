//! Intermediate MILP problem representation built from a forecast and the
//! available sources (C4, problem assembly half).

use std::collections::HashMap;

use griddy_core::EnergySource;

/// Tunable coefficients for the dispatch MILP. Defaults match spec.md §6.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DispatchConfig {
    pub unmet_penalty: f64,
    pub switch_penalty: f64,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            unmet_penalty: 1000.0,
            switch_penalty: 0.1,
        }
    }
}

/// A fully specified dispatch problem: the forecast horizon for every node,
/// the available sources, and the objective coefficients.
#[derive(Debug, Clone)]
pub struct DispatchProblem {
    /// Node ids in a stable order.
    pub node_ids: Vec<u8>,
    /// Forecast demand per node, indexed `0..horizon`.
    pub forecasts: HashMap<u8, Vec<f64>>,
    pub sources: Vec<EnergySource>,
    pub horizon: usize,
    pub config: DispatchConfig,
}

impl DispatchProblem {
    /// The big-M constant used to link `x` and `y`: twice the largest
    /// forecast value across all nodes and epochs (per spec.md §4.4).
    pub fn big_m(&self) -> f64 {
        let max_forecast = self
            .forecasts
            .values()
            .flat_map(|v| v.iter().copied())
            .fold(0.0_f64, f64::max);
        (2.0 * max_forecast).max(1.0)
    }
}

/// Assemble a [`DispatchProblem`] from forecasts and sources. Empty
/// forecasts or sources produce a problem with zero epochs of demand,
/// which the solver resolves trivially to an empty dispatch.
pub fn build_problem(
    forecasts: &HashMap<u8, Vec<f64>>,
    sources: &[EnergySource],
    horizon: usize,
    config: DispatchConfig,
) -> DispatchProblem {
    let mut node_ids: Vec<u8> = forecasts.keys().copied().collect();
    node_ids.sort_unstable();

    DispatchProblem {
        node_ids,
        forecasts: forecasts.clone(),
        sources: sources.to_vec(),
        horizon,
        config,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn big_m_is_twice_max_forecast() {
        let mut forecasts = HashMap::new();
        forecasts.insert(1, vec![2.0, 5.0, 1.0]);
        let problem = build_problem(&forecasts, &[], 3, DispatchConfig::default());
        assert_eq!(problem.big_m(), 10.0);
    }

    #[test]
    fn empty_forecasts_give_minimum_big_m() {
        let problem = build_problem(&HashMap::new(), &[], 3, DispatchConfig::default());
        assert_eq!(problem.big_m(), 1.0);
    }
}
