//! Delivery credentials.

use serde::{Deserialize, Serialize};
use std::fmt;

#[cfg(feature = "validation")]
use crate::config::Validate;
#[cfg(feature = "validation")]
use crate::error::ValidationError;

/// Channel and token used to post a message.
///
/// Replaced wholesale whenever the configuration subsystem publishes a new
/// value; fields are never merged with a previous config.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryConfig {
    /// Destination channel, without the leading `#`
    pub channel: String,
    /// Bearer credential for the delivery endpoint
    pub token: String,
}

impl DeliveryConfig {
    /// Create a config from a channel name and token.
    pub fn new(channel: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
            token: token.into(),
        }
    }
}

impl fmt::Debug for DeliveryConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeliveryConfig")
            .field("channel", &self.channel)
            .field("token", &"<redacted>")
            .finish()
    }
}

#[cfg(feature = "validation")]
impl Validate for DeliveryConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = Vec::new();

        if self.channel.trim().is_empty() {
            errors.push(ValidationError::invalid_field("channel", "must not be empty"));
        } else if self.channel.starts_with('#') {
            errors.push(ValidationError::invalid_field(
                "channel",
                "must not include the leading '#'",
            ));
        }

        if self.token.trim().is_empty() {
            errors.push(ValidationError::invalid_field("token", "must not be empty"));
        }

        match ValidationError::from_list(errors) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}
