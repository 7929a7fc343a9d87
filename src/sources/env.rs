//! Environment variable configuration source.

use super::ConfigSource;
use crate::error::{NotifierError, Result};
use config::Environment;
use std::collections::HashMap;

/// Environment variable configuration source.
///
/// Reads keys named `<PREFIX>_<KEY>`, so with prefix `NOWPLAYING` the token
/// comes from `NOWPLAYING_TOKEN`. Values are never parsed as numbers or
/// booleans; channel ids and tokens stay strings.
///
/// # Examples
///
/// ```rust
/// use nowplaying_notify::sources::EnvSource;
///
/// // NOWPLAYING_CHANNEL=music NOWPLAYING_TOKEN=xoxb-...
/// let source = EnvSource::new("NOWPLAYING", "__");
/// ```
pub struct EnvSource {
    prefix: String,
    separator: String,
    priority: i32,
}

impl EnvSource {
    /// Create a new environment variable source.
    ///
    /// # Arguments
    ///
    /// * `prefix` - Prefix for environment variables (e.g., "NOWPLAYING")
    /// * `separator` - Separator for nested keys
    pub fn new(prefix: impl Into<String>, separator: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            separator: separator.into(),
            priority: 300,
        }
    }

    /// Set the priority for this source.
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }
}

impl ConfigSource for EnvSource {
    fn load(&self) -> Result<HashMap<String, config::Value>> {
        let env_source = Environment::with_prefix(&self.prefix)
            .prefix_separator("_")
            .separator(&self.separator)
            .try_parsing(false);

        let merged = config::Config::builder()
            .add_source(env_source)
            .build()
            .map_err(|e| {
                NotifierError::LoadError(format!("Failed to load environment variables: {}", e))
            })?;

        merged
            .try_deserialize::<HashMap<String, config::Value>>()
            .map_err(|e| {
                NotifierError::DeserializationError(format!(
                    "Failed to parse environment variables: {}",
                    e
                ))
            })
    }

    fn name(&self) -> String {
        format!("env:{}*", self.prefix)
    }

    fn priority(&self) -> i32 {
        self.priority
    }
}
