//! Unified runtime configuration, loaded from TOML with environment
//! overrides applied on top (spec.md §6's "Configuration" list).

use serde::{Deserialize, Serialize};

use crate::model::EnergySource;

/// All recognized configuration options, with defaults matching spec.md
/// §6. Every field is `#[serde(default)]`-backed so a partial config file
/// (or none at all) still produces a usable controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GriddyConfig {
    pub epoch_len_seconds: f64,
    pub horizon: usize,
    pub ring_capacity: usize,
    pub min_history: usize,
    pub spectral_components: usize,
    pub blend_decay: f64,
    pub unmet_penalty: f64,
    pub switch_penalty: f64,
    pub solver_deadline_ms: u64,
    pub cycle_deadline_ms: u64,
    pub confidence_threshold: f64,
    pub supply_ref_amps: f64,
    pub llm_endpoint: Option<String>,
    pub llm_api_key: Option<String>,
    pub kv_url: Option<String>,
    pub fallback_ip: String,
    /// Energy source descriptors, constant for the process lifetime
    /// unless a reload occurs (spec.md §3).
    pub sources: Vec<EnergySource>,
}

impl Default for GriddyConfig {
    fn default() -> Self {
        Self {
            epoch_len_seconds: 1.0 / 24.0,
            horizon: 10,
            ring_capacity: 1000,
            min_history: 5,
            spectral_components: 2,
            blend_decay: 0.1,
            unmet_penalty: 1000.0,
            switch_penalty: 0.1,
            solver_deadline_ms: 500,
            cycle_deadline_ms: 83,
            confidence_threshold: 0.5,
            supply_ref_amps: 5.0,
            llm_endpoint: None,
            llm_api_key: None,
            kv_url: None,
            fallback_ip: "192.168.1.1".to_string(),
            sources: Vec::new(),
        }
    }
}

impl GriddyConfig {
    /// Parse from a TOML document, falling back to defaults for any
    /// missing field.
    pub fn from_toml_str(raw: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(raw)
    }

    /// The cycle deadline as a [`std::time::Duration`], for use with
    /// `tokio::time::timeout`.
    pub fn cycle_deadline(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.cycle_deadline_ms)
    }

    /// The solver deadline as a [`std::time::Duration`].
    pub fn solver_deadline(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.solver_deadline_ms)
    }
}
