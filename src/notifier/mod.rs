//! Formats "now playing" messages and delivers them to the chat service.

mod message;
mod service;
mod transport;

pub use message::{UNKNOWN, escape, format_message};
pub use service::{Notifier, NotifierBuilder};
pub use transport::{DELIVERY_ENDPOINT, DeliveryRequest, DeliveryResponse, Transport};

#[cfg(feature = "http")]
pub use transport::HttpTransport;
