//! Subscriber registry dispatching events to handlers.

use super::topic::{Event, Topic};
use parking_lot::RwLock;
use std::any::Any;
use std::collections::HashMap;
use std::sync::{Arc, Weak};
use tracing::{debug, trace};

type Handler = Arc<dyn Fn(&Event) + Send + Sync>;

/// Internal registry state.
struct RegistryInner {
    handlers: HashMap<&'static str, Vec<(u64, Handler)>>,
    next_id: u64,
}

impl RegistryInner {
    fn remove(&mut self, topic: &'static str, id: u64) -> bool {
        let Some(handlers) = self.handlers.get_mut(topic) else {
            return false;
        };
        let before = handlers.len();
        handlers.retain(|(sub_id, _)| *sub_id != id);
        let removed = handlers.len() != before;
        if handlers.is_empty() {
            self.handlers.remove(topic);
        }
        removed
    }
}

/// Handle for a subscription that can be dropped to unsubscribe.
///
/// Removal is immediate: once the handle is dropped (or [`cancel`](Self::cancel)
/// returns), later publications no longer reach the handler.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    id: u64,
    topic: &'static str,
    registry: Weak<RwLock<RegistryInner>>,
}

impl Subscription {
    /// Name of the subscribed topic.
    pub fn topic(&self) -> &'static str {
        self.topic
    }

    /// Unsubscribe now. Equivalent to dropping the handle.
    pub fn cancel(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        // The bus may already be gone; nothing left to detach from then.
        if let Some(registry) = self.registry.upgrade() {
            if registry.write().remove(self.topic, self.id) {
                debug!(topic = self.topic, id = self.id, "unsubscribed");
            }
        }
    }
}

/// In-process publish/subscribe bus with typed topics.
///
/// Handlers run synchronously on the publishing thread, one at a time, in
/// the order they subscribed. The registry lock is released before handlers
/// run, so a handler may itself subscribe or unsubscribe.
///
/// # Examples
///
/// ```rust
/// use nowplaying_notify::bus::{EventBus, PLAYBACK_CHANGED};
/// use nowplaying_notify::playback::PlayingItem;
///
/// let bus = EventBus::new();
///
/// let handle = bus.subscribe(&PLAYBACK_CHANGED, |event| {
///     if let Some(item) = event.decode(&PLAYBACK_CHANGED) {
///         println!("now playing: {:?}", item.name);
///     }
/// });
///
/// assert_eq!(bus.publish(&PLAYBACK_CHANGED, PlayingItem::new().with_name("Song")), 1);
///
/// // Unsubscribe by dropping the handle
/// drop(handle);
/// assert_eq!(bus.publish(&PLAYBACK_CHANGED, PlayingItem::new()), 0);
/// ```
pub struct EventBus {
    inner: Arc<RwLock<RegistryInner>>,
}

impl EventBus {
    /// Create an empty bus.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(RegistryInner {
                handlers: HashMap::new(),
                next_id: 0,
            })),
        }
    }

    /// Register `handler` for events on `topic`.
    ///
    /// The handler receives the raw [`Event`] and decodes it itself, since
    /// untyped publishers may put anything on the topic.
    pub fn subscribe<T, F>(&self, topic: &Topic<T>, handler: F) -> Subscription
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        let mut inner = self.inner.write();
        let id = inner.next_id;
        inner.next_id += 1;
        inner
            .handlers
            .entry(topic.name())
            .or_default()
            .push((id, Arc::new(handler)));
        debug!(topic = topic.name(), id, "subscribed");

        Subscription {
            id,
            topic: topic.name(),
            registry: Arc::downgrade(&self.inner),
        }
    }

    /// Publish a typed payload on `topic`.
    ///
    /// Returns the number of handlers invoked.
    pub fn publish<T: Any + Send + Sync>(&self, topic: &Topic<T>, payload: T) -> usize {
        self.publish_event(Event::new(topic, payload))
    }

    /// Publish a pre-built event, typed or not.
    ///
    /// Returns the number of handlers invoked.
    pub fn publish_event(&self, event: Event) -> usize {
        let handlers: Vec<Handler> = {
            let inner = self.inner.read();
            match inner.handlers.get(event.topic()) {
                Some(handlers) => handlers.iter().map(|(_, h)| Arc::clone(h)).collect(),
                None => Vec::new(),
            }
        };

        trace!(topic = event.topic(), handlers = handlers.len(), "publishing");
        for handler in &handlers {
            handler(&event);
        }
        handlers.len()
    }

    /// Number of active subscribers on the named topic.
    pub fn subscriber_count(&self, topic: &str) -> usize {
        self.inner
            .read()
            .handlers
            .get(topic)
            .map_or(0, |handlers| handlers.len())
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for EventBus {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const COUNTER: Topic<u32> = Topic::new("test.counter");
    const OTHER: Topic<u32> = Topic::new("test.other");

    #[test]
    fn test_subscribe_and_publish() {
        let bus = EventBus::new();
        let counter = Arc::new(AtomicUsize::new(0));

        let counter_clone = Arc::clone(&counter);
        let _handle = bus.subscribe(&COUNTER, move |event| {
            let value = event.decode(&COUNTER).unwrap();
            counter_clone.fetch_add(*value as usize, Ordering::SeqCst);
        });

        assert_eq!(bus.publish(&COUNTER, 2), 1);
        assert_eq!(counter.load(Ordering::SeqCst), 2);

        bus.publish(&COUNTER, 3);
        assert_eq!(counter.load(Ordering::SeqCst), 5);
    }

    #[test]
    fn test_handlers_run_in_subscription_order() {
        let bus = EventBus::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let first = Arc::clone(&seen);
        let _h1 = bus.subscribe(&COUNTER, move |_| first.lock().unwrap().push("first"));
        let second = Arc::clone(&seen);
        let _h2 = bus.subscribe(&COUNTER, move |_| second.lock().unwrap().push("second"));

        assert_eq!(bus.publish(&COUNTER, 1), 2);
        assert_eq!(*seen.lock().unwrap(), vec!["first", "second"]);
    }

    #[test]
    fn test_topics_are_isolated() {
        let bus = EventBus::new();
        let counter = Arc::new(AtomicUsize::new(0));

        let counter_clone = Arc::clone(&counter);
        let _handle = bus.subscribe(&COUNTER, move |_| {
            counter_clone.fetch_add(1, Ordering::SeqCst);
        });

        assert_eq!(bus.publish(&OTHER, 1), 0);
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_unsubscribe_is_immediate() {
        let bus = EventBus::new();
        let counter = Arc::new(AtomicUsize::new(0));

        let counter_clone = Arc::clone(&counter);
        let handle = bus.subscribe(&COUNTER, move |_| {
            counter_clone.fetch_add(1, Ordering::SeqCst);
        });

        bus.publish(&COUNTER, 1);
        handle.cancel();
        bus.publish(&COUNTER, 1);

        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert_eq!(bus.subscriber_count(COUNTER.name()), 0);
    }

    #[test]
    fn test_subscriber_count() {
        let bus = EventBus::new();
        assert_eq!(bus.subscriber_count(COUNTER.name()), 0);

        let handle1 = bus.subscribe(&COUNTER, |_| {});
        assert_eq!(bus.subscriber_count(COUNTER.name()), 1);

        let _handle2 = bus.subscribe(&COUNTER, |_| {});
        assert_eq!(bus.subscriber_count(COUNTER.name()), 2);

        drop(handle1);
        assert_eq!(bus.subscriber_count(COUNTER.name()), 1);
    }

    #[test]
    fn test_handle_outlives_bus() {
        let bus = EventBus::new();
        let handle = bus.subscribe(&COUNTER, |_| {});
        drop(bus);
        drop(handle);
    }

    #[test]
    fn test_handler_may_unsubscribe_during_publish() {
        let bus = EventBus::new();
        let slot: Arc<Mutex<Option<Subscription>>> = Arc::new(Mutex::new(None));

        let slot_clone = Arc::clone(&slot);
        let handle = bus.subscribe(&COUNTER, move |_| {
            drop(slot_clone.lock().unwrap().take());
        });
        *slot.lock().unwrap() = Some(handle);

        assert_eq!(bus.publish(&COUNTER, 1), 1);
        assert_eq!(bus.publish(&COUNTER, 1), 0);
    }

    #[test]
    fn test_clone_bus() {
        let bus = EventBus::new();
        let bus2 = bus.clone();
        let counter = Arc::new(AtomicUsize::new(0));

        let counter_clone = Arc::clone(&counter);
        let _handle = bus.subscribe(&COUNTER, move |_| {
            counter_clone.fetch_add(1, Ordering::SeqCst);
        });

        // Publish via clone
        bus2.publish(&COUNTER, 1);
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }
}
