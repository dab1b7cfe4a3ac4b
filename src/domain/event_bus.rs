//! Fan-out of committed ledger changes.
//!
//! The service publishes one [`LedgerEvent`] per commit; each WebSocket
//! connection holds its own receiver and filters by team.

use tokio::sync::broadcast;

use super::LedgerEvent;

/// Broadcast bus for [`LedgerEvent`]s.
///
/// Capacity comes from `EVENT_BUS_CAPACITY`. A receiver that falls more than
/// that many events behind loses the oldest ones and sees
/// [`broadcast::error::RecvError::Lagged`]. Commits never wait on delivery.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<LedgerEvent>,
}

impl EventBus {
    /// Creates a bus holding up to `capacity` undelivered events (at least 1).
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publishes a committed change and returns how many live receivers got
    /// it. Zero when no client is connected.
    pub fn publish(&self, event: LedgerEvent) -> usize {
        let event_type = event.event_type_str();
        let delivered = self.sender.send(event).unwrap_or(0);
        tracing::trace!(event_type, delivered, "ledger event published");
        delivered
    }

    /// Opens a receiver for events published from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<LedgerEvent> {
        self.sender.subscribe()
    }

    /// Number of open receivers, reported by `/health` as `ws_subscribers`.
    #[must_use]
    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}
