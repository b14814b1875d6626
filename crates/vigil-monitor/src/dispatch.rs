//! Deferred event delivery
//!
//! Events are never handed to consumer code from inside the monitor's
//! own state-mutation path; doing so would invite reentrancy into the
//! debounce table and let a slow consumer stall the scheduler. Instead
//! every delivery is pushed onto an unbounded FIFO channel the consumer
//! drains at its own pace. `queue` never blocks.

use tokio::sync::mpsc;
use tracing::warn;
use vigil_core::domain::MonitorEvent;

/// Sender half of the deferred delivery queue
#[derive(Debug, Clone)]
pub struct Dispatcher {
    event_tx: mpsc::UnboundedSender<MonitorEvent>,
}

impl Dispatcher {
    /// Creates the delivery queue, returning the dispatcher and the
    /// consumer's receiving end
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<MonitorEvent>) {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        (Self { event_tx }, event_rx)
    }

    /// Queues an event for delivery to the consumer
    ///
    /// Deliveries already queued before the consumer goes away are
    /// simply dropped; that is not an error at this layer.
    pub fn queue(&self, event: MonitorEvent) {
        if self.event_tx.send(event).is_err() {
            warn!("Dropping monitor event (consumer receiver dropped)");
        }
    }
}
