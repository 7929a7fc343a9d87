//! # nowplaying-notify
//!
//! Posts "now playing" status messages to a chat webhook, with delivery
//! credentials that can change while the process runs.
//!
//! ## Overview
//!
//! A [`Notifier`](notifier::Notifier) sits on an in-process
//! [`EventBus`](bus::EventBus) and:
//! - formats a message for every [`PlayingItem`](playback::PlayingItem)
//!   published on [`PLAYBACK_CHANGED`](bus::PLAYBACK_CHANGED)
//! - posts it to Slack's `chat.postMessage` without blocking the publisher
//! - swaps its channel and token atomically whenever a
//!   [`DeliveryConfig`](config::DeliveryConfig) is published on
//!   [`CONFIG_UPDATED`](bus::CONFIG_UPDATED)
//!
//! Delivery is best effort: failures are logged through `tracing` and never
//! retried.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use nowplaying_notify::prelude::*;
//!
//! # async fn example() -> Result<()> {
//! let bus = EventBus::new();
//!
//! let store = SourcedConfigStore::builder()
//!     .with_file("config/slack.yaml")
//!     .with_env_overrides("NOWPLAYING", "__")
//!     .build();
//!
//! let notifier = Notifier::builder(&bus)
//!     .with_config_store(store)
//!     .build()?;
//! notifier.start();
//!
//! bus.publish(
//!     &PLAYBACK_CHANGED,
//!     PlayingItem::new()
//!         .with_name("Song")
//!         .with_artist("Artist")
//!         .with_album("Album"),
//! );
//! # Ok(())
//! # }
//! ```
//!
//! ## Feature Flags
//!
//! - `http` (default): [`HttpTransport`](notifier::HttpTransport) built on `reqwest`
//! - `file-watch` (default): reload credentials when config files change
//! - `validation` (default): reject malformed credentials before publishing

#![warn(missing_docs, rust_2024_compatibility)]
#![deny(unsafe_code)]

pub mod bus;
pub mod config;
pub mod error;
pub mod notifier;
pub mod playback;
pub mod sources;

#[cfg(feature = "file-watch")]
pub mod watch;

/// Convenient re-exports for common usage patterns.
pub mod prelude {
    pub use crate::bus::{CONFIG_UPDATED, Event, EventBus, PLAYBACK_CHANGED, Subscription, Topic};
    pub use crate::config::{ConfigStore, DeliveryConfig, SourcedConfigStore};
    pub use crate::error::{NotifierError, Result, ValidationError};
    pub use crate::notifier::{Notifier, Transport};
    pub use crate::playback::PlayingItem;

    #[cfg(feature = "http")]
    pub use crate::notifier::HttpTransport;

    #[cfg(feature = "validation")]
    pub use crate::config::Validate;
}
