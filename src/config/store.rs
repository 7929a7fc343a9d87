//! Where the notifier gets its delivery credentials from.

use crate::bus::{CONFIG_UPDATED, EventBus};
use crate::config::{ConfigLoader, DeliveryConfig};
use crate::error::Result;
use crate::sources::{ConfigSource, EnvSource, FileSource};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

#[cfg(feature = "validation")]
use crate::config::Validate;

#[cfg(feature = "file-watch")]
use crate::watch::ConfigWatcher;
#[cfg(feature = "file-watch")]
use std::sync::Arc;
#[cfg(feature = "file-watch")]
use std::time::Duration;

/// Synchronous access to the current delivery configuration.
///
/// The notifier calls [`load`](Self::load) once at construction; every later
/// change arrives on the [`CONFIG_UPDATED`] topic.
pub trait ConfigStore: Send + Sync {
    /// The current configuration, or `None` if no credentials exist yet.
    fn load(&self) -> Option<DeliveryConfig>;
}

impl ConfigStore for Option<DeliveryConfig> {
    fn load(&self) -> Option<DeliveryConfig> {
        self.clone()
    }
}

impl ConfigStore for DeliveryConfig {
    fn load(&self) -> Option<DeliveryConfig> {
        Some(self.clone())
    }
}

/// Configuration store backed by files and environment variables.
///
/// # Examples
///
/// ```rust,no_run
/// use nowplaying_notify::bus::EventBus;
/// use nowplaying_notify::config::{ConfigStore, SourcedConfigStore};
///
/// # fn example() -> nowplaying_notify::error::Result<()> {
/// let store = SourcedConfigStore::builder()
///     .with_file("config/slack.yaml")
///     .with_env_overrides("NOWPLAYING", "__")
///     .build();
///
/// let initial = store.load();
///
/// // Later, after the file changed:
/// let bus = EventBus::new();
/// store.reload(&bus)?;
/// # Ok(())
/// # }
/// ```
pub struct SourcedConfigStore {
    loader: ConfigLoader,
    files: Vec<PathBuf>,
}

impl SourcedConfigStore {
    /// Create a new builder.
    pub fn builder() -> ConfigStoreBuilder {
        ConfigStoreBuilder::new()
    }

    /// Load, merge and validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if a source cannot be read, the merged keys do not
    /// form a `DeliveryConfig`, or validation fails.
    pub fn try_load(&self) -> Result<DeliveryConfig> {
        let config: DeliveryConfig = self.loader.load()?;

        #[cfg(feature = "validation")]
        config.validate()?;

        Ok(config)
    }

    /// Reload the configuration and publish it on [`CONFIG_UPDATED`].
    ///
    /// Nothing is published on failure, so subscribers keep their previous
    /// config.
    ///
    /// # Errors
    ///
    /// Returns the error from [`try_load`](Self::try_load).
    pub fn reload(&self, bus: &EventBus) -> Result<()> {
        let config = self.try_load()?;
        let delivered = bus.publish(&CONFIG_UPDATED, config);
        info!(subscribers = delivered, "published updated delivery config");
        Ok(())
    }

    /// Reload and republish whenever one of the store's files changes.
    ///
    /// Watching stops when the returned watcher is dropped. Failed reloads
    /// are logged and skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if the watcher cannot be created or a file cannot be
    /// watched.
    #[cfg(feature = "file-watch")]
    pub async fn watch(
        self: Arc<Self>,
        bus: EventBus,
        debounce: Duration,
    ) -> Result<ConfigWatcher> {
        let (watcher, mut rx) = ConfigWatcher::new(debounce)?;
        for path in &self.files {
            watcher.watch(path).await?;
        }

        tokio::spawn(async move {
            while rx.recv().await.is_some() {
                if let Err(e) = self.reload(&bus) {
                    warn!(error = %e, "config reload failed, keeping previous config");
                }
            }
            debug!("config watch loop finished");
        });

        Ok(watcher)
    }

    /// Files this store reads from, in precedence order.
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }
}

impl ConfigStore for SourcedConfigStore {
    fn load(&self) -> Option<DeliveryConfig> {
        match self.try_load() {
            Ok(config) => Some(config),
            Err(e) => {
                warn!(error = %e, "no usable delivery config");
                None
            }
        }
    }
}

/// Builder for a [`SourcedConfigStore`].
pub struct ConfigStoreBuilder {
    file_paths: Vec<PathBuf>,
    env_prefix: Option<String>,
    env_separator: Option<String>,
    custom_sources: Vec<Box<dyn ConfigSource>>,
}

impl ConfigStoreBuilder {
    /// Create a new builder with no sources.
    pub fn new() -> Self {
        Self {
            file_paths: Vec::new(),
            env_prefix: None,
            env_separator: None,
            custom_sources: Vec::new(),
        }
    }

    /// Add a file source (`.yaml`, `.yml`, `.toml` or `.json`).
    ///
    /// Later files override earlier ones.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        self.file_paths.push(path.as_ref().to_path_buf());
        self
    }

    /// Read overrides from environment variables, e.g. `NOWPLAYING_TOKEN`.
    ///
    /// Environment variables take precedence over every file.
    pub fn with_env_overrides(mut self, prefix: &str, separator: &str) -> Self {
        self.env_prefix = Some(prefix.to_string());
        self.env_separator = Some(separator.to_string());
        self
    }

    /// Add a custom configuration source.
    pub fn with_source<S: ConfigSource + 'static>(mut self, source: S) -> Self {
        self.custom_sources.push(Box::new(source));
        self
    }

    /// Build the store. No source is read until the first load.
    pub fn build(self) -> SourcedConfigStore {
        let mut loader = ConfigLoader::new();

        for (index, path) in self.file_paths.iter().enumerate() {
            let priority = 100 + (index as i32 * 10);
            loader.add_source(Box::new(FileSource::new(path).with_priority(priority)));
        }

        for source in self.custom_sources {
            loader.add_source(source);
        }

        if let (Some(prefix), Some(separator)) = (self.env_prefix, self.env_separator) {
            loader.add_source(Box::new(EnvSource::new(prefix, separator)));
        }

        debug!(sources = ?loader.source_names(), "built config store");

        SourcedConfigStore {
            loader,
            files: self.file_paths,
        }
    }
}

impl Default for ConfigStoreBuilder {
    fn default() -> Self {
        Self::new()
    }
}
