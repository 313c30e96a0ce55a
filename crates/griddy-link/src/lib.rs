//! # griddy-link: endpoint link manager (C8)
//!
//! Two independent long-lived WebSocket links to the field device: `/out`
//! streams telemetry in, `/in` carries dispatch frames out. `/in` never
//! opens until `/out` has decoded at least one frame successfully.

mod error;
mod in_link;
mod out_link;
mod readiness;
mod state;

pub use error::LinkError;
pub use in_link::{run_in_link, InLinkHandle};
pub use out_link::{run_out_link, OutLinkHandle};
pub use readiness::{out_ready_channel, OutReadyReceiver, OutReadySender};
pub use state::LinkState;

/// Messages above this size are rejected outright (spec.md §4.8).
pub const MAX_MESSAGE_BYTES: usize = 1024 * 1024;

/// Fixed reconnect backoff for both links (spec.md §4.8).
pub const RECONNECT_BACKOFF: std::time::Duration = std::time::Duration::from_secs(5);
