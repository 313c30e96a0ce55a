use thiserror::Error;

/// Failure modes for a single escalation round-trip. Every variant means
/// the deterministic dispatch stands; the caller never propagates these as
/// a hard cycle failure (spec.md §4.7).
#[derive(Debug, Error)]
pub enum EscalationError {
    #[error("escalation request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("escalation response failed schema validation: {0}")]
    SchemaInvalid(String),
    #[error("escalation round-trip exceeded its deadline")]
    Timeout,
}
