//! # griddy-core: wire codec, ring buffer, and data model
//!
//! Provides the fundamental types shared by every stage of the microgrid
//! dispatch scheduling pipeline: the bit-exact binary codec for the field
//! device link (C1), the bounded per-node demand history (C2), and the
//! plain data model (`DemandRecord`, `EnergySource`, `NodeState`,
//! `Forecast`, `DispatchInstruction`, `CycleReport`) that later stages
//! build on.
//!
//! ## Modules
//!
//! - [`codec`] - Telemetry/dispatch frame encode and decode
//! - [`ring`] - Bounded demand history and per-node aggregation
//! - [`model`] - Shared data types
//! - [`config`] - Runtime configuration
//! - [`error`] - Unified error type
//! - [`metrics`] - Rolling metrics windows (C10)

pub mod codec;
pub mod config;
pub mod error;
pub mod metrics;
pub mod model;
pub mod ring;

pub use codec::{
    decode_dispatch, decode_telemetry, encode_dispatch, encode_telemetry, DecodeError,
    DispatchNode, DispatchPacket, NodeKind, TelemetryNode, TelemetryPacket, DISPATCH_MAGIC,
    TELEMETRY_MAGIC,
};
pub use config::GriddyConfig;
pub use error::{GriddyError, GriddyResult};
pub use metrics::Metrics;
pub use model::{CycleReport, DemandRecord, DispatchInstruction, EnergySource, Forecast, NodeState};
pub use ring::{aggregate_records, RingBuffer, DEFAULT_RING_CAPACITY};
