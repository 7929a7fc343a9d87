//! File watching for live credential changes.
//!
//! Used by [`SourcedConfigStore::watch`](crate::config::SourcedConfigStore::watch)
//! to republish the delivery config whenever a config file is edited.

mod watcher;

pub use watcher::ConfigWatcher;
