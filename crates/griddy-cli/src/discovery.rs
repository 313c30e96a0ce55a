//! Device discovery (spec.md §6): a GET to a configured key-value URL
//! returns the device's IP as plain text. Runs once at startup; failures
//! fall back to a fixed IP rather than retrying.

use tracing::{info, warn};

/// Resolve the device IP: try `kv_url` once, fall back to `fallback_ip`
/// on any failure (missing config, network error, non-success status).
pub async fn discover_device_ip(kv_url: Option<&str>, fallback_ip: &str) -> String {
    let Some(kv_url) = kv_url else {
        info!(ip = fallback_ip, "no kv_url configured, using fallback IP");
        return fallback_ip.to_string();
    };

    match reqwest::get(kv_url).await {
        Ok(response) if response.status().is_success() => match response.text().await {
            Ok(text) => {
                let ip = text.trim().to_string();
                info!(ip, "discovered device IP");
                ip
            }
            Err(err) => {
                warn!(error = %err, "failed to read device discovery body, using fallback");
                fallback_ip.to_string()
            }
        },
        Ok(response) => {
            warn!(status = %response.status(), "device discovery returned non-success, using fallback");
            fallback_ip.to_string()
        }
        Err(err) => {
            warn!(error = %err, "device discovery request failed, using fallback");
            fallback_ip.to_string()
        }
    }
}
