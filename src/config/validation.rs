//! Configuration validation support.

use crate::error::ValidationError;

/// Trait for configuration validation.
///
/// Configs that fail validation are never handed to subscribers; the
/// previous config stays in effect.
///
/// # Examples
///
/// ```rust
/// use nowplaying_notify::config::{DeliveryConfig, Validate};
///
/// assert!(DeliveryConfig::new("music", "xoxb-token").validate().is_ok());
/// assert!(DeliveryConfig::new("#music", "xoxb-token").validate().is_err());
/// ```
pub trait Validate {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Should return a `ValidationError` describing what validation failed.
    fn validate(&self) -> Result<(), ValidationError>;
}
