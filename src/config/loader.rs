//! Merges delivery configuration from prioritized sources.

use crate::error::{NotifierError, Result};
use crate::sources::ConfigSource;
use serde::de::DeserializeOwned;
use tracing::trace;

/// Loads and merges configuration from multiple sources.
///
/// Sources are applied lowest priority first, so a higher priority source
/// overrides individual keys (e.g. an env var replacing only the token).
pub(crate) struct ConfigLoader {
    sources: Vec<Box<dyn ConfigSource>>,
}

impl ConfigLoader {
    pub(crate) fn new() -> Self {
        Self {
            sources: Vec::new(),
        }
    }

    pub(crate) fn add_source(&mut self, source: Box<dyn ConfigSource>) {
        self.sources.push(source);
    }

    /// Load and merge every source, then deserialize into `T`.
    ///
    /// # Errors
    ///
    /// Returns an error if there are no sources, any source fails to load,
    /// or the merged keys do not deserialize into `T`.
    pub(crate) fn load<T>(&self) -> Result<T>
    where
        T: DeserializeOwned,
    {
        if self.sources.is_empty() {
            return Err(NotifierError::LoadError(
                "No configuration sources specified".to_string(),
            ));
        }

        let mut builder = config::Config::builder();

        for source in self.sorted_sources() {
            let values = source.load().map_err(|e| {
                NotifierError::LoadError(format!(
                    "Failed to load source '{}': {}",
                    source.name(),
                    e
                ))
            })?;
            trace!(source = %source.name(), keys = values.len(), "merging configuration source");

            for (key, value) in values {
                builder = builder.set_override(&key, value).map_err(|e| {
                    NotifierError::LoadError(format!(
                        "Failed to merge source '{}': {}",
                        source.name(),
                        e
                    ))
                })?;
            }
        }

        let merged = builder.build().map_err(|e| {
            NotifierError::LoadError(format!("Failed to build configuration: {}", e))
        })?;

        merged.try_deserialize::<T>().map_err(|e| {
            NotifierError::DeserializationError(format!(
                "Failed to deserialize configuration: {}",
                e
            ))
        })
    }

    /// Source names in the order they are applied.
    pub(crate) fn source_names(&self) -> Vec<String> {
        self.sorted_sources().iter().map(|s| s.name()).collect()
    }

    fn sorted_sources(&self) -> Vec<&dyn ConfigSource> {
        let mut sorted: Vec<&dyn ConfigSource> = self.sources.iter().map(|s| s.as_ref()).collect();
        sorted.sort_by_key(|s| s.priority());
        sorted
    }
}
