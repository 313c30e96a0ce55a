//! `/out` link: device telemetry -> backend. Owns the shared ring and the
//! out-ready signal.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures_util::StreamExt;
use tokio::sync::{mpsc, watch};
use tokio_tungstenite::tungstenite::Message;

use griddy_core::{decode_telemetry, DemandRecord, Metrics, NodeKind, RingBuffer};
use tracing::{debug, info, warn};

use crate::readiness::OutReadySender;
use crate::state::LinkState;
use crate::MAX_MESSAGE_BYTES;

/// Handle for observing `/out`'s connection state from other tasks.
#[derive(Clone)]
pub struct OutLinkHandle {
    pub state: watch::Receiver<LinkState>,
}

/// Run the `/out` link forever: connect, decode frames into the ring,
/// reconnect with backoff on any terminal transition. Returns only if the
/// ring mutex is poisoned, which should never happen in practice.
pub async fn run_out_link(
    url: String,
    ring: Arc<Mutex<RingBuffer>>,
    metrics: Arc<Mutex<Metrics>>,
    ready: OutReadySender,
    frame_tx: mpsc::Sender<()>,
    backoff: Duration,
) -> OutLinkHandle {
    let (state_tx, state_rx) = watch::channel(LinkState::Disconnected);
    let handle = OutLinkHandle { state: state_rx };

    tokio::spawn(async move {
        loop {
            let _ = state_tx.send(LinkState::Resolving);
            let _ = state_tx.send(LinkState::Connecting);

            match tokio_tungstenite::connect_async(&url).await {
                Ok((stream, _response)) => {
                    let _ = state_tx.send(LinkState::Open);
                    info!(url = %url, "/out link open");
                    let (_write, mut read) = stream.split();

                    while let Some(message) = read.next().await {
                        match message {
                            Ok(Message::Binary(bytes)) => {
                                if bytes.len() > MAX_MESSAGE_BYTES {
                                    warn!(
                                        size = bytes.len(),
                                        limit = MAX_MESSAGE_BYTES,
                                        "dropping oversized telemetry frame"
                                    );
                                    continue;
                                }
                                match decode_telemetry(&bytes) {
                                    Ok(packet) => {
                                        let timestamp = packet.timestamp_ms as f64 / 1000.0;
                                        let records: Vec<DemandRecord> = packet
                                            .nodes
                                            .iter()
                                            .filter(|n| n.kind == NodeKind::Consumer)
                                            .map(|n| DemandRecord {
                                                timestamp,
                                                node_id: n.id,
                                                demand_amps: n.demand_amps as f64,
                                                fulfillment: n.fulfillment as f64,
                                            })
                                            .collect();
                                        if let Ok(mut ring) = ring.lock() {
                                            ring.push_all(records);
                                        }
                                        if let Ok(mut metrics) = metrics.lock() {
                                            metrics.record_inbound(timestamp);
                                        }
                                        ready.mark_ready();
                                        let _ = frame_tx.send(()).await;
                                    }
                                    Err(err) => {
                                        if let Ok(mut metrics) = metrics.lock() {
                                            metrics.record_decode_failure();
                                        }
                                        debug!(error = %err, "dropping malformed telemetry frame");
                                    }
                                }
                            }
                            Ok(Message::Text(text)) => {
                                warn!(len = text.len(), "discarding unexpected text frame on /out");
                            }
                            Ok(Message::Close(_)) => break,
                            Ok(_) => {}
                            Err(err) => {
                                warn!(error = %err, "/out transport error");
                                break;
                            }
                        }
                    }
                }
                Err(err) => {
                    warn!(error = %err, url = %url, "/out connect failed");
                }
            }

            let _ = state_tx.send(LinkState::Closing);
            let _ = state_tx.send(LinkState::Disconnected);
            tokio::time::sleep(backoff).await;
        }
    });

    handle
}
