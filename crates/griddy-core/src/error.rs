//! Unified error type for the griddy scheduling engine.
//!
//! Mirrors the taxonomy in the dispatch controller's error handling design:
//! one variant per recoverable failure class, plus `Config` for the only
//! fatal startup condition. Domain crates define their own narrower errors
//! where useful and convert into [`GriddyError`] at crate boundaries.

use thiserror::Error;

/// Unified error type for griddy operations.
#[derive(Error, Debug)]
pub enum GriddyError {
    /// Malformed telemetry or dispatch frame.
    #[error("decode error: {0}")]
    Decode(#[from] crate::codec::DecodeError),

    /// Transient WebSocket connect/read/write failure. Recovered by the
    /// link manager via backoff and reconnect.
    #[error("link error: {0}")]
    Link(String),

    /// MILP solver returned a non-optimal status or exceeded its deadline.
    #[error("solver error: {0}")]
    Solver(String),

    /// LLM escalation RPC failed or its response did not match the schema.
    #[error("escalation error: {0}")]
    Escalation(String),

    /// Cycle deadline elapsed before a dispatch could be produced.
    #[error("cycle deadline exceeded")]
    DeadlineExceeded,

    /// Missing or invalid configuration at startup. Fatal.
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O errors (file access, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias for `Result<T, GriddyError>`.
pub type GriddyResult<T> = Result<T, GriddyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = GriddyError::Solver("infeasible".into());
        assert!(err.to_string().contains("solver error"));
        assert!(err.to_string().contains("infeasible"));
    }

    #[test]
    fn test_deadline_exceeded_has_no_payload() {
        let err = GriddyError::DeadlineExceeded;
        assert_eq!(err.to_string(), "cycle deadline exceeded");
    }
}
