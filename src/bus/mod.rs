//! In-process event bus.
//!
//! Topics carry a statically known payload type, and handlers decode events
//! into that type. Subscriptions are scoped handles released on drop.

mod registry;
mod topic;

pub use registry::{EventBus, Subscription};
pub use topic::{CONFIG_UPDATED, Event, PLAYBACK_CHANGED, Payload, Topic};
