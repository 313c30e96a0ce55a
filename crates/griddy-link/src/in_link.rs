//! `/in` link: backend dispatch -> device. Gated on the `/out` readiness
//! signal and exclusively owns the outbound socket while Open.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::sync::{mpsc, watch};
use tokio_tungstenite::tungstenite::Message;
use tracing::{info, warn};

use crate::readiness::OutReadyReceiver;
use crate::state::LinkState;

/// Bound on in-flight dispatch frames: at most one cycle is ever in
/// flight (spec.md §5), so a depth of 1 is enough; a dispatch that cannot
/// be accepted immediately is dropped by the caller, not queued.
const DISPATCH_QUEUE_DEPTH: usize = 1;

#[derive(Clone)]
pub struct InLinkHandle {
    pub state: watch::Receiver<LinkState>,
    tx: mpsc::Sender<Vec<u8>>,
}

impl InLinkHandle {
    /// Attempt to hand a dispatch frame to the link. Returns `false`
    /// without blocking if the link is not Open or the single send slot
    /// is already occupied (spec.md §4.9 step 5: "if `/in` is Open, send;
    /// otherwise drop").
    pub fn try_send(&self, bytes: Vec<u8>) -> bool {
        if !self.state.borrow().is_open() {
            return false;
        }
        self.tx.try_send(bytes).is_ok()
    }
}

/// Run the `/in` link forever. Does not attempt to connect until `ready`
/// has fired at least once.
pub async fn run_in_link(
    url: String,
    mut ready: OutReadyReceiver,
    backoff: Duration,
) -> InLinkHandle {
    let (state_tx, state_rx) = watch::channel(LinkState::Disconnected);
    let (tx, mut rx) = mpsc::channel::<Vec<u8>>(DISPATCH_QUEUE_DEPTH);
    let handle = InLinkHandle {
        state: state_rx,
        tx,
    };

    tokio::spawn(async move {
        ready.wait_ready().await;

        loop {
            let _ = state_tx.send(LinkState::Resolving);
            let _ = state_tx.send(LinkState::Connecting);

            match tokio_tungstenite::connect_async(&url).await {
                Ok((stream, _response)) => {
                    let _ = state_tx.send(LinkState::Open);
                    info!(url = %url, "/in link open");
                    let (mut write, mut read) = stream.split();

                    loop {
                        tokio::select! {
                            frame = rx.recv() => {
                                match frame {
                                    Some(bytes) => {
                                        if let Err(err) = write.send(Message::Binary(bytes)).await {
                                            warn!(error = %err, "/in send failed");
                                            break;
                                        }
                                    }
                                    None => break,
                                }
                            }
                            message = read.next() => {
                                match message {
                                    Some(Ok(Message::Close(_))) | None => break,
                                    Some(Err(err)) => {
                                        warn!(error = %err, "/in transport error");
                                        break;
                                    }
                                    _ => {}
                                }
                            }
                        }
                    }
                }
                Err(err) => {
                    warn!(error = %err, url = %url, "/in connect failed");
                }
            }

            let _ = state_tx.send(LinkState::Closing);
            let _ = state_tx.send(LinkState::Disconnected);
            tokio::time::sleep(backoff).await;
        }
    });

    handle
}
