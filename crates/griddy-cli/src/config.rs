//! Config loading: a TOML file on disk, overridden field-by-field by
//! `GRIDDY_*` environment variables. Missing file and missing env vars are
//! both fine; only a malformed file, or an `llm_endpoint` with no
//! `llm_api_key`, is a fatal `ConfigError`.

use std::path::Path;

use griddy_core::GriddyConfig;

/// Load configuration from `path` (if present) and apply any `GRIDDY_*`
/// environment overrides on top. Returns an error if the file exists but
/// fails to parse as TOML, or if `llm_endpoint` is set without
/// `llm_api_key`.
pub fn load_config(path: &Path) -> anyhow::Result<GriddyConfig> {
    let mut config = match std::fs::read_to_string(path) {
        Ok(raw) => GriddyConfig::from_toml_str(&raw)?,
        Err(_) => GriddyConfig::default(),
    };
    apply_env_overrides(&mut config);

    if config.llm_endpoint.is_some() && config.llm_api_key.as_deref().unwrap_or("").is_empty() {
        anyhow::bail!("llm_endpoint is set but llm_api_key is missing");
    }

    Ok(config)
}

fn apply_env_overrides(config: &mut GriddyConfig) {
    if let Ok(value) = std::env::var("GRIDDY_LLM_ENDPOINT") {
        config.llm_endpoint = Some(value);
    }
    if let Ok(value) = std::env::var("GRIDDY_LLM_API_KEY") {
        config.llm_api_key = Some(value);
    }
    if let Ok(value) = std::env::var("GRIDDY_KV_URL") {
        config.kv_url = Some(value);
    }
    if let Ok(value) = std::env::var("GRIDDY_FALLBACK_IP") {
        config.fallback_ip = value;
    }
    if let Ok(value) = std::env::var("GRIDDY_CONFIDENCE_THRESHOLD") {
        if let Ok(parsed) = value.parse() {
            config.confidence_threshold = parsed;
        }
    }
    if let Ok(value) = std::env::var("GRIDDY_CYCLE_DEADLINE_MS") {
        if let Ok(parsed) = value.parse() {
            config.cycle_deadline_ms = parsed;
        }
    }
}
