use std::time::Duration;

use griddy_core::{DemandRecord, EnergySource};
use tracing::{debug, info, warn};

use crate::error::EscalationError;
use crate::schema::{EscalationRequest, EscalationResponse};

/// Configuration for the escalation client. `api_key` is sent as a bearer
/// token; `timeout` bounds the single round-trip the scheduler allows per
/// cycle.
#[derive(Debug, Clone)]
pub struct EscalationConfig {
    pub endpoint: String,
    pub api_key: String,
    pub timeout: Duration,
}

/// Thin typed RPC client for the LLM escalation path. One HTTP call per
/// cycle at most; never retried within a cycle (spec.md §4.4's
/// "infeasibility is never retried" note applies equally here: a failed
/// escalation just means the deterministic result stands).
pub struct EscalationClient {
    http: reqwest::Client,
    config: EscalationConfig,
}

impl EscalationClient {
    pub fn new(config: EscalationConfig) -> Result<Self, EscalationError> {
        let http = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self { http, config })
    }

    /// Call the LLM with the current cycle's readings and sources. Returns
    /// a validated response, or an error that the caller should treat as
    /// "escalation abandoned, deterministic result stands" per spec.md
    /// §4.7.
    pub async fn escalate(
        &self,
        readings: &[DemandRecord],
        sources: &[EnergySource],
        opt_time_ms: f64,
        deterministic_confidence: f64,
    ) -> Result<EscalationResponse, EscalationError> {
        let request = EscalationRequest {
            readings,
            sources,
            opt_time_ms,
            deterministic_confidence,
        };

        debug!(endpoint = %self.config.endpoint, "sending escalation request");
        let response = self
            .http
            .post(&self.config.endpoint)
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    EscalationError::Timeout
                } else {
                    EscalationError::Request(e)
                }
            })?;

        let body: EscalationResponse = response.json().await?;
        let validated = body.validate();
        match &validated {
            Ok(response) => info!(confidence = response.confidence, "escalation accepted"),
            Err(err) => warn!(error = %err, "escalation response rejected"),
        }
        validated
    }

    /// Lightweight reachability probe, independent of the escalation
    /// contract: used at startup and by the metrics ticker to report
    /// whether the LLM endpoint is usable at all.
    pub async fn health_check(&self) -> bool {
        self.http
            .get(&self.config.endpoint)
            .timeout(Duration::from_millis(500))
            .send()
            .await
            .map(|resp| resp.status().is_success())
            .unwrap_or(false)
    }
}
