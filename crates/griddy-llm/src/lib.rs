//! # griddy-llm: typed escalation client (C7)
//!
//! A single HTTP round-trip per cycle to an external reasoning service,
//! used only when the deterministic confidence estimator (C6) falls below
//! threshold. The response is validated before it is trusted; a failure at
//! any stage leaves the deterministic dispatch standing.

mod client;
mod error;
mod schema;

pub use client::{EscalationClient, EscalationConfig};
pub use error::EscalationError;
pub use schema::{EscalationDecision, EscalationRequest, EscalationResponse};
