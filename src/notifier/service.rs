//! The notifier: reacts to playback and config events and posts messages.

use super::message::format_message;
use super::transport::{DeliveryRequest, Transport};
use crate::bus::{CONFIG_UPDATED, Event, EventBus, PLAYBACK_CHANGED, Subscription};
use crate::config::{ConfigStore, DeliveryConfig};
use crate::error::{NotifierError, Result};
use crate::playback::PlayingItem;
use arc_swap::ArcSwapOption;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};

/// State shared between the notifier and its event handlers.
struct NotifierInner {
    config: ArcSwapOption<DeliveryConfig>,
    transport: Arc<dyn Transport>,
    runtime: Handle,
}

impl NotifierInner {
    fn on_playback_changed(&self, event: &Event) -> Option<JoinHandle<()>> {
        match event.decode(&PLAYBACK_CHANGED) {
            Some(item) => self.deliver(&item),
            None => {
                trace!(topic = event.topic(), "ignoring event without a playing item");
                None
            }
        }
    }

    fn on_config_updated(&self, event: &Event) {
        match event.decode(&CONFIG_UPDATED) {
            Some(config) => {
                debug!(channel = %config.channel, "delivery config replaced");
                self.config.store(Some(config));
            }
            None => trace!(topic = event.topic(), "ignoring event without a delivery config"),
        }
    }

    fn deliver(&self, item: &PlayingItem) -> Option<JoinHandle<()>> {
        let config = self.config.load_full()?;

        let message = format_message(item);
        info!(channel = %config.channel, message = %message, "posting now playing");

        let request = DeliveryRequest::new(&config, message);
        let transport = Arc::clone(&self.transport);

        Some(self.runtime.spawn(async move {
            match transport.post(&request).await {
                Ok(response) if response.is_success() => {
                    debug!(status = response.status, body = %response.body, "delivery completed");
                }
                Ok(response) => {
                    warn!(status = response.status, body = %response.body, "delivery rejected");
                }
                Err(e) => warn!(error = %e, "delivery failed"),
            }
        }))
    }
}

/// Posts a "now playing" message for every playback event.
///
/// The notifier listens on [`CONFIG_UPDATED`] for its whole lifetime and on
/// [`PLAYBACK_CHANGED`] between [`start`](Self::start) and
/// [`stop`](Self::stop). Deliveries run as spawned tasks and never block the
/// publisher. Both subscriptions are released by [`shutdown`](Self::shutdown),
/// which also runs on drop.
///
/// # Examples
///
/// ```rust,no_run
/// use nowplaying_notify::prelude::*;
///
/// # async fn example() -> Result<()> {
/// let bus = EventBus::new();
/// let notifier = Notifier::builder(&bus)
///     .with_config_store(DeliveryConfig::new("music", "xoxb-token"))
///     .build()?;
///
/// notifier.start();
/// bus.publish(&PLAYBACK_CHANGED, PlayingItem::new().with_name("Song"));
/// # Ok(())
/// # }
/// ```
pub struct Notifier {
    bus: EventBus,
    inner: Arc<NotifierInner>,
    playback: Mutex<Option<Subscription>>,
    config_updates: Mutex<Option<Subscription>>,
}

impl Notifier {
    /// Start building a notifier attached to `bus`.
    pub fn builder(bus: &EventBus) -> NotifierBuilder {
        NotifierBuilder::new(bus)
    }

    /// Subscribe to playback events.
    ///
    /// Calling `start` while already started is a no-op, so each playback
    /// event is delivered at most once.
    pub fn start(&self) {
        let mut playback = self.playback.lock();
        if playback.is_some() {
            debug!("notifier already started");
            return;
        }

        let inner = Arc::clone(&self.inner);
        *playback = Some(self.bus.subscribe(&PLAYBACK_CHANGED, move |event| {
            inner.on_playback_changed(event);
        }));
        info!("notifier started");
    }

    /// Unsubscribe from playback events. Safe to call when not started.
    ///
    /// Deliveries already in flight are neither cancelled nor awaited.
    pub fn stop(&self) {
        if self.playback.lock().take().is_some() {
            info!("notifier stopped");
        }
    }

    /// Whether playback events are currently being handled.
    pub fn is_started(&self) -> bool {
        self.playback.lock().is_some()
    }

    /// Release both subscriptions. Idempotent.
    pub fn shutdown(&self) {
        self.stop();
        if self.config_updates.lock().take().is_some() {
            debug!("notifier stopped following config updates");
        }
    }

    /// Handle a playback event. Events without a [`PlayingItem`] are ignored.
    ///
    /// Returns the delivery task if one was spawned.
    pub fn on_playback_changed(&self, event: &Event) -> Option<JoinHandle<()>> {
        self.inner.on_playback_changed(event)
    }

    /// Handle a config event. Events without a [`DeliveryConfig`] leave the
    /// current config in place.
    pub fn on_config_updated(&self, event: &Event) {
        self.inner.on_config_updated(event);
    }

    /// Format and post a message for `item`.
    ///
    /// Does nothing and returns `None` while no config is held. Otherwise
    /// returns the spawned delivery task; awaiting it is optional.
    pub fn deliver(&self, item: &PlayingItem) -> Option<JoinHandle<()>> {
        self.inner.deliver(item)
    }

    /// Snapshot of the config the next delivery will use.
    pub fn config(&self) -> Option<Arc<DeliveryConfig>> {
        self.inner.config.load_full()
    }
}

impl Drop for Notifier {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Builder for a [`Notifier`].
pub struct NotifierBuilder {
    bus: EventBus,
    store: Option<Box<dyn ConfigStore>>,
    transport: Option<Arc<dyn Transport>>,
    runtime: Option<Handle>,
}

impl NotifierBuilder {
    fn new(bus: &EventBus) -> Self {
        Self {
            bus: bus.clone(),
            store: None,
            transport: None,
            runtime: None,
        }
    }

    /// Where the initial config snapshot is loaded from.
    ///
    /// Without a store the notifier starts with no config and waits for
    /// [`CONFIG_UPDATED`].
    pub fn with_config_store<S: ConfigStore + 'static>(mut self, store: S) -> Self {
        self.store = Some(Box::new(store));
        self
    }

    /// Transport used for deliveries. Defaults to
    /// [`HttpTransport`](super::HttpTransport) when the `http` feature is on.
    pub fn with_transport<T: Transport + 'static>(mut self, transport: T) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    /// Like [`with_transport`](Self::with_transport) for a shared transport.
    pub fn with_shared_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Runtime deliveries are spawned on. Defaults to the current runtime.
    pub fn with_runtime(mut self, runtime: Handle) -> Self {
        self.runtime = Some(runtime);
        self
    }

    /// Load the initial config, subscribe to config updates and build the
    /// notifier. Playback events are not handled until [`Notifier::start`].
    ///
    /// # Errors
    ///
    /// Returns an error if no runtime handle was given and none is current,
    /// or if the default transport cannot be created.
    pub fn build(self) -> Result<Notifier> {
        let runtime = match self.runtime {
            Some(runtime) => runtime,
            None => Handle::try_current().map_err(|e| NotifierError::NoRuntime(e.to_string()))?,
        };
        let transport = match self.transport {
            Some(transport) => transport,
            None => default_transport()?,
        };

        let initial = self.store.and_then(|store| store.load());
        match &initial {
            Some(config) => debug!(channel = %config.channel, "loaded initial delivery config"),
            None => info!("no delivery config yet, deliveries skipped until one is published"),
        }

        let inner = Arc::new(NotifierInner {
            config: ArcSwapOption::from_pointee(initial),
            transport,
            runtime,
        });

        let handler_inner = Arc::clone(&inner);
        let config_updates = self.bus.subscribe(&CONFIG_UPDATED, move |event| {
            handler_inner.on_config_updated(event);
        });

        Ok(Notifier {
            bus: self.bus,
            inner,
            playback: Mutex::new(None),
            config_updates: Mutex::new(Some(config_updates)),
        })
    }
}

#[cfg(feature = "http")]
fn default_transport() -> Result<Arc<dyn Transport>> {
    Ok(Arc::new(super::HttpTransport::new()?))
}

#[cfg(not(feature = "http"))]
fn default_transport() -> Result<Arc<dyn Transport>> {
    Err(NotifierError::Transport(
        "no transport configured and the 'http' feature is disabled".to_string(),
    ))
}
