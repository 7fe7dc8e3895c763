//! Per-table publish/subscribe bus.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::RwLock;

use super::EventKind;
use super::TableEvent;

/// A subscribed handler.
type Handler = Arc<dyn Fn(&TableEvent) + Send + Sync>;

/// Token returned by [`EventBus::subscribe`], used to unsubscribe.
///
/// Closures have no identity in Rust, so removal is by token rather than
/// by handler reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

struct Subscriber {
    id: SubscriptionId,
    handler: Handler,
}

#[derive(Default)]
struct BusInner {
    subscribers: HashMap<EventKind, Vec<Subscriber>>,
    next_id: u64,
}

/// Synchronous publish/subscribe register, one per table instance.
///
/// `publish` invokes handlers in subscription order, passing the same
/// payload to each by shared reference. Handlers must not block; workers
/// that perform I/O hand the payload off to their own async task.
#[derive(Default)]
pub struct EventBus {
    inner: RwLock<BusInner>,
}

impl EventBus {
    /// Create an empty bus.
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe a handler to one event kind.
    pub fn subscribe<F>(&self, kind: EventKind, handler: F) -> SubscriptionId
    where
        F: Fn(&TableEvent) + Send + Sync + 'static,
    {
        self.subscribe_arc(kind, Arc::new(handler))
    }

    /// Subscribe one handler to every event kind. Returns one token per
    /// kind, in [`EventKind::ALL`] order.
    pub fn subscribe_all<F>(&self, handler: F) -> Vec<SubscriptionId>
    where
        F: Fn(&TableEvent) + Send + Sync + 'static,
    {
        let handler: Handler = Arc::new(handler);
        EventKind::ALL
            .iter()
            .map(|kind| self.subscribe_arc(*kind, handler.clone()))
            .collect()
    }

    fn subscribe_arc(&self, kind: EventKind, handler: Handler) -> SubscriptionId {
        let mut inner = self.inner.write().unwrap_or_else(|e| e.into_inner());
        inner.next_id += 1;
        let id = SubscriptionId(inner.next_id);
        inner
            .subscribers
            .entry(kind)
            .or_default()
            .push(Subscriber { id, handler });
        id
    }

    /// Remove a subscription. Returns `true` if it was present. The order
    /// of remaining handlers is preserved.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut inner = self.inner.write().unwrap_or_else(|e| e.into_inner());
        for subscribers in inner.subscribers.values_mut() {
            if let Some(pos) = subscribers.iter().position(|s| s.id == id) {
                subscribers.remove(pos);
                return true;
            }
        }
        false
    }

    /// Publish an event to all current subscribers of its kind, in
    /// subscription order.
    ///
    /// The subscriber list is snapshotted before dispatch, so handlers may
    /// subscribe or unsubscribe reentrantly; such changes take effect for
    /// subsequent publishes only.
    pub fn publish(&self, event: &TableEvent) {
        let handlers: Vec<Handler> = {
            let inner = self.inner.read().unwrap_or_else(|e| e.into_inner());
            inner
                .subscribers
                .get(&event.kind())
                .map(|subs| subs.iter().map(|s| s.handler.clone()).collect())
                .unwrap_or_default()
        };

        for handler in handlers {
            handler(event);
        }
    }

    /// Number of handlers currently subscribed to a kind.
    pub fn subscriber_count(&self, kind: EventKind) -> usize {
        let inner = self.inner.read().unwrap_or_else(|e| e.into_inner());
        inner.subscribers.get(&kind).map_or(0, Vec::len)
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.read().unwrap_or_else(|e| e.into_inner());
        let total: usize = inner.subscribers.values().map(Vec::len).sum();
        f.debug_struct("EventBus")
            .field("subscribers", &total)
            .finish()
    }
}
