//! Event bus backed by a Tokio broadcast channel.

use crate::agent::{domain::RegistryEvent, ports::EventBus};
use tokio::sync::broadcast;
use tracing::trace;

const DEFAULT_CAPACITY: usize = 256;

/// Fan-out event bus for push-notification consumers.
///
/// Each subscriber receives every event published after it subscribed.
/// Slow subscribers skip the oldest events instead of blocking publishers.
#[derive(Debug, Clone)]
pub struct BroadcastEventBus {
    sender: broadcast::Sender<RegistryEvent>,
}

impl BroadcastEventBus {
    /// Creates a bus retaining up to `capacity` undelivered events per
    /// subscriber.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _receiver) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Subscribes to events published from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<RegistryEvent> {
        self.sender.subscribe()
    }
}

impl Default for BroadcastEventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl EventBus for BroadcastEventBus {
    fn publish(&self, event: RegistryEvent) {
        let kind = event.kind();
        let agent_id = event.agent_id().clone();
        if self.sender.send(event).is_err() {
            trace!(event = %kind, agent_id = %agent_id, "event dropped, no subscribers");
        }
    }
}
