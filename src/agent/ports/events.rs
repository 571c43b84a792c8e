//! Event bus port for change notifications.

use crate::agent::domain::RegistryEvent;

/// Fire-and-forget sink for registry notifications.
///
/// Publishing never fails from the caller's point of view; a bus with no
/// listeners drops the event.
pub trait EventBus: Send + Sync {
    /// Publishes one event.
    fn publish(&self, event: RegistryEvent);
}
