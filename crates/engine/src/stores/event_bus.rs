//! Event bus for layout change notifications.
//!
//! Subscribers register callbacks that are invoked whenever a layout is
//! loaded, changed or unloaded. Each subscription returns a handle that can
//! later be passed to [`EventBus::unsubscribe`].

use std::sync::Arc;

use quickslot_domain::{OwnerId, SubscriptionId};
use tokio::sync::Mutex;

/// Something happened to a layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayoutEvent {
    /// A layout became the active one
    Loaded { owner: OwnerId },
    /// A layout was mutated (locally, by reconciliation or remotely)
    Changed { owner: OwnerId },
    /// The active layout went away (deselect, cleanup)
    Unloaded { owner: OwnerId },
    /// Storage rejected a write; memory is ahead of storage
    PersistFailed { owner: OwnerId, message: String },
}

impl LayoutEvent {
    pub fn owner(&self) -> &OwnerId {
        match self {
            Self::Loaded { owner }
            | Self::Changed { owner }
            | Self::Unloaded { owner }
            | Self::PersistFailed { owner, .. } => owner,
        }
    }
}

type Subscriber = (SubscriptionId, Box<dyn FnMut(LayoutEvent) + Send + 'static>);

/// Push-based layout event bus.
///
/// The bus holds strong references to subscribers, so they persist until
/// unsubscribed, cleared, or the bus is dropped.
#[derive(Clone)]
pub struct EventBus {
    subscribers: Arc<Mutex<Vec<Subscriber>>>,
}

impl EventBus {
    /// Create a new EventBus with no subscribers.
    pub fn new() -> Self {
        Self {
            subscribers: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Subscribe to all layout events.
    pub async fn subscribe(
        &self,
        callback: impl FnMut(LayoutEvent) + Send + 'static,
    ) -> SubscriptionId {
        let id = SubscriptionId::new();
        self.subscribers.lock().await.push((id, Box::new(callback)));
        id
    }

    /// Remove one subscriber. Returns false for an unknown handle.
    pub async fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscribers = self.subscribers.lock().await;
        let before = subscribers.len();
        subscribers.retain(|(sub_id, _)| *sub_id != id);
        subscribers.len() != before
    }

    /// Dispatch an event to all subscribers in subscription order.
    pub async fn dispatch(&self, event: LayoutEvent) {
        let mut subscribers = self.subscribers.lock().await;
        for (_, subscriber) in subscribers.iter_mut() {
            subscriber(event.clone());
        }
    }

    /// Get the number of subscribers.
    pub async fn subscriber_count(&self) -> usize {
        self.subscribers.lock().await.len()
    }

    /// Clear all subscribers.
    pub async fn clear(&self) {
        self.subscribers.lock().await.clear();
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
