//! Delivery configuration: the credential type, where it is loaded from,
//! and how changes are published.

mod delivery;
mod loader;
mod store;

#[cfg(feature = "validation")]
mod validation;

pub use delivery::DeliveryConfig;
pub(crate) use loader::ConfigLoader;
pub use store::{ConfigStore, ConfigStoreBuilder, SourcedConfigStore};

#[cfg(feature = "validation")]
pub use validation::Validate;
