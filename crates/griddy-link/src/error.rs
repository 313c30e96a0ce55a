use thiserror::Error;

/// Recoverable link failures. Every variant is handled by reconnecting
/// after backoff; none of them terminate the process (spec.md §7,
/// TransientLinkError).
#[derive(Debug, Error)]
pub enum LinkError {
    #[error("websocket transport error: {0}")]
    Transport(#[from] tokio_tungstenite::tungstenite::Error),
    #[error("message of {size} bytes exceeds the {limit} byte cap")]
    MessageTooLarge { size: usize, limit: usize },
}
