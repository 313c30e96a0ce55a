//! Wire schema for the escalation RPC. Field names are the contract; they
//! are not renamed to match internal naming conventions.

use serde::{Deserialize, Serialize};

use griddy_core::{DemandRecord, EnergySource};

use crate::error::EscalationError;

/// Outbound request body: current readings, source descriptors, and the
/// deterministic optimizer's own telemetry for this cycle.
#[derive(Debug, Clone, Serialize)]
pub struct EscalationRequest<'a> {
    pub readings: &'a [DemandRecord],
    pub sources: &'a [EnergySource],
    pub opt_time_ms: f64,
    pub deterministic_confidence: f64,
}

/// One decision in the LLM's response, same shape as a dispatch extractor
/// instruction (spec.md §4.7 references §4.5's shape).
#[derive(Debug, Clone, Deserialize)]
pub struct EscalationDecision {
    pub id: u8,
    pub supply_amps: f64,
    pub source_id: String,
}

/// Raw response body before validation.
#[derive(Debug, Clone, Deserialize)]
pub struct EscalationResponse {
    pub decisions: Vec<EscalationDecision>,
    pub reasoning: String,
    pub confidence: f64,
}

impl EscalationResponse {
    /// Validate the contract in spec.md §4.7: every decision's
    /// `supply_amps` is non-negative and `confidence` is within `[0, 1]`.
    /// Node and source ids are trusted verbatim; no cross-check against
    /// known sets is performed.
    pub fn validate(self) -> Result<Self, EscalationError> {
        if !(0.0..=1.0).contains(&self.confidence) {
            return Err(EscalationError::SchemaInvalid(format!(
                "confidence {} out of [0, 1]",
                self.confidence
            )));
        }
        if let Some(bad) = self.decisions.iter().find(|d| d.supply_amps < 0.0) {
            return Err(EscalationError::SchemaInvalid(format!(
                "decision for node {} has negative supply_amps {}",
                bad.id, bad.supply_amps
            )));
        }
        Ok(self)
    }
}
