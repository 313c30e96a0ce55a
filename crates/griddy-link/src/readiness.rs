//! One-shot readiness signal from the `/out` link to the `/in` link.
//!
//! Unlike a `tokio::sync::oneshot`, this needs to be observed by a task
//! that starts after the signal may already have fired, and the signal
//! must stay set for the rest of the process once raised. A
//! `watch::channel<bool>` gives both: `changed()` wakes waiters on the
//! first `true`, and any later subscriber sees `true` immediately from
//! `borrow()`.

use tokio::sync::watch;

#[derive(Clone)]
pub struct OutReadySender(watch::Sender<bool>);

#[derive(Clone)]
pub struct OutReadyReceiver(watch::Receiver<bool>);

/// Create a fresh, unset readiness signal.
pub fn out_ready_channel() -> (OutReadySender, OutReadyReceiver) {
    let (tx, rx) = watch::channel(false);
    (OutReadySender(tx), OutReadyReceiver(rx))
}

impl OutReadySender {
    /// Set the signal. Idempotent: later calls are no-ops since the
    /// signal never needs to be cleared once raised.
    pub fn mark_ready(&self) {
        let _ = self.0.send_if_modified(|ready| {
            if *ready {
                false
            } else {
                *ready = true;
                true
            }
        });
    }
}

impl OutReadyReceiver {
    pub fn is_ready(&self) -> bool {
        *self.0.borrow()
    }

    /// Resolve as soon as the signal is set. Returns immediately if it is
    /// already set.
    pub async fn wait_ready(&mut self) {
        if self.is_ready() {
            return;
        }
        while self.0.changed().await.is_ok() {
            if self.is_ready() {
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn wait_ready_resolves_after_mark_ready() {
        let (tx, mut rx) = out_ready_channel();
        assert!(!rx.is_ready());

        tokio::spawn(async move {
            tx.mark_ready();
        });

        rx.wait_ready().await;
        assert!(rx.is_ready());
    }

    #[tokio::test]
    async fn wait_ready_resolves_immediately_if_already_set() {
        let (tx, mut rx) = out_ready_channel();
        tx.mark_ready();
        rx.wait_ready().await;
        assert!(rx.is_ready());
    }
}
