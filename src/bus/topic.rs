//! Typed topics and the events published on them.

use crate::config::DeliveryConfig;
use crate::playback::PlayingItem;
use std::any::Any;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// Type-erased event payload.
pub type Payload = Arc<dyn Any + Send + Sync>;

/// Topic a playback source publishes on when a new track starts.
pub const PLAYBACK_CHANGED: Topic<PlayingItem> = Topic::new("playback.changed");

/// Topic the configuration subsystem publishes on when credentials change.
pub const CONFIG_UPDATED: Topic<DeliveryConfig> = Topic::new("config.updated");

/// A named event stream whose payload type is known statically.
///
/// # Examples
///
/// ```rust
/// use nowplaying_notify::bus::Topic;
///
/// const VOLUME_CHANGED: Topic<u8> = Topic::new("volume.changed");
/// assert_eq!(VOLUME_CHANGED.name(), "volume.changed");
/// ```
pub struct Topic<T> {
    name: &'static str,
    _payload: PhantomData<fn() -> T>,
}

impl<T> Topic<T> {
    /// Declare a topic with the given name.
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            _payload: PhantomData,
        }
    }

    /// The topic name used for routing.
    pub const fn name(&self) -> &'static str {
        self.name
    }
}

impl<T> Clone for Topic<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Topic<T> {}

impl<T> fmt::Debug for Topic<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Topic").field(&self.name).finish()
    }
}

/// A single publication on a topic.
///
/// Events built with [`Event::new`] always carry the topic's payload type.
/// Publishers outside the typed API use [`Event::raw`], so handlers must
/// still decode defensively.
#[derive(Clone)]
pub struct Event {
    topic: &'static str,
    payload: Option<Payload>,
}

impl Event {
    /// Build a typed event for `topic`.
    pub fn new<T: Any + Send + Sync>(topic: &Topic<T>, payload: T) -> Self {
        Self {
            topic: topic.name(),
            payload: Some(Arc::new(payload)),
        }
    }

    /// Build an event with an arbitrary payload, or none at all.
    pub fn raw(topic: &'static str, payload: Option<Payload>) -> Self {
        Self { topic, payload }
    }

    /// Name of the topic this event was published on.
    pub fn topic(&self) -> &'static str {
        self.topic
    }

    /// Decode the payload as the type carried by `topic`.
    ///
    /// Returns `None` if the event belongs to a different topic, has no
    /// payload, or carries a payload of another type.
    pub fn decode<T: Any + Send + Sync>(&self, topic: &Topic<T>) -> Option<Arc<T>> {
        if self.topic != topic.name() {
            return None;
        }
        self.payload.clone()?.downcast::<T>().ok()
    }
}

impl fmt::Debug for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("topic", &self.topic)
            .field("has_payload", &self.payload.is_some())
            .finish()
    }
}
