//! C9: the scheduling loop. One cycle runs per arrived telemetry frame;
//! at most one cycle is ever in flight (spec.md §5).

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use tracing::{info, warn};

use griddy_core::{
    aggregate_records, encode_dispatch, CycleReport, DispatchNode, DispatchPacket, EnergySource,
    GriddyConfig, Metrics, RingBuffer,
};
use griddy_dispatch::{
    build_problem, confidence, extract_dispatch, solve_dispatch_with_deadline, ConfidenceWeights,
    DispatchConfig, MilpBackend,
};
use griddy_forecast::{forecast, ForecastConfig};
use griddy_link::InLinkHandle;
use griddy_llm::EscalationClient;

/// Everything a cycle needs, shared across the lifetime of the process.
/// Mirrors the single-mutex-around-shared-state concurrency model in
/// spec.md §5: the ring and metrics are each guarded by their own mutex,
/// never held across an await point.
pub struct SchedulerContext {
    pub ring: Arc<Mutex<RingBuffer>>,
    pub metrics: Arc<Mutex<Metrics>>,
    pub in_link: InLinkHandle,
    pub sources: Vec<EnergySource>,
    pub config: GriddyConfig,
    pub solver: Arc<dyn MilpBackend>,
    pub llm: Option<Arc<EscalationClient>>,
}

/// Drive the scheduling loop forever: block on the next telemetry-arrival
/// signal, then run exactly one cycle to completion (or to its deadline).
pub async fn run_scheduler(ctx: Arc<SchedulerContext>, mut frame_rx: mpsc::Receiver<()>) {
    let mut cycle_id: u64 = 0;
    while frame_rx.recv().await.is_some() {
        cycle_id += 1;
        let deadline = ctx.config.cycle_deadline();
        match tokio::time::timeout(deadline, run_cycle(Arc::clone(&ctx), cycle_id)).await {
            Ok(Some(report)) => {
                info!(
                    cycle_id = report.cycle_id,
                    confidence = report.confidence,
                    dispatch_count = report.dispatch_count,
                    escalated = report.escalated,
                    "cycle complete"
                );
            }
            Ok(None) => {
                // Fewer than 3 ring records: not yet an error, just nothing to do.
            }
            Err(_) => {
                warn!(cycle_id, "cycle deadline exceeded, dispatch abandoned");
                if let Ok(mut metrics) = ctx.metrics.lock() {
                    metrics.record_cycle_failed();
                }
            }
        }
    }
}

/// Run a single cycle. Returns `None` when there isn't enough history yet
/// to forecast (spec.md §4.9 step 2); otherwise returns the cycle's
/// report. Cancelled from the outside by dropping this future at the
/// caller's `tokio::time::timeout`.
async fn run_cycle(ctx: Arc<SchedulerContext>, cycle_id: u64) -> Option<CycleReport> {
    let snapshot_len = ctx.ring.lock().ok()?.len();
    if snapshot_len < 3 {
        return None;
    }

    let (records, node_ids) = {
        let ring = ctx.ring.lock().ok()?;
        let records = ring.snapshot();
        let mut node_ids: Vec<u8> = records.iter().map(|r| r.node_id).collect();
        node_ids.sort_unstable();
        node_ids.dedup();
        (records, node_ids)
    };

    let aggregated = aggregate_records(&records);
    let forecast_config = ForecastConfig {
        horizon: ctx.config.horizon,
        min_history: ctx.config.min_history,
        spectral_components: ctx.config.spectral_components,
        blend_decay: ctx.config.blend_decay,
    };

    let mut forecasts = HashMap::new();
    for &node_id in &node_ids {
        if let Some(state) = aggregated.get(&node_id) {
            let history: Vec<f64> = state.history.iter().map(|(_, demand)| *demand).collect();
            forecasts.insert(node_id, forecast(&forecast_config, &history, state.latest_demand));
        }
    }

    let dispatch_config = DispatchConfig {
        unmet_penalty: ctx.config.unmet_penalty,
        switch_penalty: ctx.config.switch_penalty,
    };

    let solve_started = std::time::Instant::now();
    let solution = {
        let forecasts = forecasts.clone();
        let sources = ctx.sources.clone();
        let horizon = ctx.config.horizon;
        let solver = Arc::clone(&ctx.solver);
        let deadline = ctx.config.solver_deadline();
        tokio::task::spawn_blocking(move || {
            let problem = build_problem(&forecasts, &sources, horizon, dispatch_config);
            solver.solve(&problem, deadline)
        })
        .await
        .ok()?
    };
    let opt_time_ms = solve_started.elapsed().as_secs_f64() * 1000.0;

    let mut instructions = extract_dispatch(&solution, &node_ids, &ctx.sources);

    let total_supply: f64 = instructions.iter().map(|i| i.supply_amps).sum();
    let total_demand: f64 = forecasts.values().filter_map(|v| v.first()).sum();
    let recent_demands: Vec<f64> = records.iter().map(|r| r.demand_amps).collect();

    let mut reported_confidence = confidence(
        ConfidenceWeights::default(),
        opt_time_ms,
        total_supply,
        total_demand,
        &recent_demands,
    );

    let mut escalated = false;
    let mut escalation_time_ms = None;
    if reported_confidence < ctx.config.confidence_threshold {
        if let Some(llm) = &ctx.llm {
            let escalation_started = std::time::Instant::now();
            let result = llm
                .escalate(&records, &ctx.sources, opt_time_ms, reported_confidence)
                .await;
            escalation_time_ms = Some(escalation_started.elapsed().as_secs_f64() * 1000.0);
            match result {
                Ok(response) => {
                    instructions = response
                        .decisions
                        .into_iter()
                        .map(|d| griddy_core::DispatchInstruction {
                            node_id: d.id,
                            supply_amps: d.supply_amps,
                            source_id: d.source_id,
                        })
                        .collect();
                    reported_confidence = response.confidence;
                    escalated = true;
                }
                Err(err) => {
                    warn!(error = %err, "escalation abandoned, deterministic result stands");
                }
            }
        }
    }

    let unmet_total_amps = (total_demand - total_supply).max(0.0);

    let packet = DispatchPacket {
        nodes: instructions
            .iter()
            .map(|instr| DispatchNode {
                id: instr.node_id,
                supply: normalize_supply(instr.supply_amps, ctx.config.supply_ref_amps) as f32,
                source_id: source_byte(&ctx.sources, &instr.source_id),
            })
            .collect(),
    };
    let bytes = encode_dispatch(&packet);

    let now = records.last().map(|r| r.timestamp).unwrap_or(0.0);
    if ctx.in_link.try_send(bytes) {
        if let Ok(mut metrics) = ctx.metrics.lock() {
            metrics.record_outbound(now);
        }
    }

    if let Ok(mut metrics) = ctx.metrics.lock() {
        metrics.record_opt_time_ms(opt_time_ms);
        metrics.record_dispatch_count(instructions.len());
        metrics.record_confidence(reported_confidence);
        if let Some(escalation_time_ms) = escalation_time_ms {
            metrics.record_escalation_time_ms(escalation_time_ms);
        }
        if !solution.status.is_usable() {
            metrics.record_cycle_failed();
        }
    }

    Some(
        CycleReport {
            cycle_id,
            opt_time_ms,
            confidence: reported_confidence,
            dispatch_count: instructions.len(),
            unmet_total_amps,
            escalated,
        }
        .clamped(),
    )
}

/// Divide solver amps by the per-source reference and clamp to `[0, 1]`
/// (spec.md §6, dispatch normalization).
fn normalize_supply(amps: f64, supply_ref_amps: f64) -> f64 {
    (amps / supply_ref_amps).clamp(0.0, 1.0)
}

/// Map a source id string to its single-byte wire identifier: 1-indexed
/// position in the configured source list, or `1` if unknown (spec.md
/// §6).
fn source_byte(sources: &[EnergySource], source_id: &str) -> u8 {
    sources
        .iter()
        .position(|s| s.id == source_id)
        .map(|idx| (idx + 1) as u8)
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(id: &str) -> EnergySource {
        EnergySource {
            id: id.to_string(),
            max_supply_amps: 10.0,
            cost_per_amp: 0.1,
            ramp_limit_amps: None,
        }
    }

    #[test]
    fn normalize_supply_clamps_to_unit_interval() {
        assert_eq!(normalize_supply(2.5, 5.0), 0.5);
        assert_eq!(normalize_supply(100.0, 5.0), 1.0);
        assert_eq!(normalize_supply(-1.0, 5.0), 0.0);
    }

    #[test]
    fn source_byte_falls_back_to_one_for_unknown_source() {
        let sources = vec![source("s1"), source("s2")];
        assert_eq!(source_byte(&sources, "s1"), 1);
        assert_eq!(source_byte(&sources, "s2"), 2);
        assert_eq!(source_byte(&sources, "unknown"), 1);
    }
}
