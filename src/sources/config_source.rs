//! Configuration source trait.

use crate::error::Result;
use std::collections::HashMap;

/// A place delivery credentials can be read from.
///
/// Implement this for sources beyond files and environment variables, such
/// as a keychain or secret store. Values from all sources are merged by
/// priority before being deserialized into a
/// [`DeliveryConfig`](crate::config::DeliveryConfig).
pub trait ConfigSource: Send + Sync {
    /// Load the source as a flat key-value map (`channel`, `token`).
    ///
    /// # Errors
    ///
    /// Returns an error if the source cannot be read or parsed.
    fn load(&self) -> Result<HashMap<String, config::Value>>;

    /// Human-readable name for logging.
    fn name(&self) -> String;

    /// Priority of this source (higher = takes precedence).
    ///
    /// Files start at 100, environment variables use 300.
    fn priority(&self) -> i32 {
        100
    }
}
