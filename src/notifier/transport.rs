//! Outbound delivery of formatted messages.

use crate::config::DeliveryConfig;
use crate::error::Result;
use async_trait::async_trait;
use serde::Serialize;

/// Chat-posting endpoint every message is sent to.
pub const DELIVERY_ENDPOINT: &str = "https://slack.com/api/chat.postMessage";

/// Form parameters of a single post.
///
/// Field order is the order of the encoded form body.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct DeliveryRequest {
    /// Channel with its leading `#`
    pub channel: String,
    /// Bearer credential
    pub token: String,
    /// Post as the token's user rather than a bot; always `true`
    pub as_user: bool,
    /// Formatted message
    pub text: String,
}

impl DeliveryRequest {
    /// Address `text` using the channel and token from `config`.
    pub fn new(config: &DeliveryConfig, text: impl Into<String>) -> Self {
        Self {
            channel: format!("#{}", config.channel),
            token: config.token.clone(),
            as_user: true,
            text: text.into(),
        }
    }
}

impl std::fmt::Debug for DeliveryRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeliveryRequest")
            .field("channel", &self.channel)
            .field("token", &"<redacted>")
            .field("as_user", &self.as_user)
            .field("text", &self.text)
            .finish()
    }
}

/// What came back from the endpoint. Only ever logged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryResponse {
    /// HTTP status code
    pub status: u16,
    /// Response body as text
    pub body: String,
}

impl DeliveryResponse {
    /// Whether the status code is in the 2xx range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Performs the network call for a delivery.
///
/// Implementations must not retry; the notifier treats every post as a
/// single best-effort attempt.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Post `request` to the delivery endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if no response was received.
    async fn post(&self, request: &DeliveryRequest) -> Result<DeliveryResponse>;
}

#[cfg(feature = "http")]
pub use http::HttpTransport;

#[cfg(feature = "http")]
mod http {
    use super::{DELIVERY_ENDPOINT, DeliveryRequest, DeliveryResponse, Transport};
    use crate::error::Result;
    use async_trait::async_trait;
    use reqwest::Client;

    /// [`Transport`] posting URL-encoded forms with `reqwest`.
    ///
    /// No request timeout is configured and no headers are added beyond the
    /// form content type.
    #[derive(Clone)]
    pub struct HttpTransport {
        client: Client,
    }

    impl HttpTransport {
        /// Create a transport with a fresh client.
        ///
        /// # Errors
        ///
        /// Returns an error if the TLS backend cannot be initialized.
        pub fn new() -> Result<Self> {
            let client = Client::builder().build()?;
            Ok(Self { client })
        }

        /// Use an existing client, e.g. to share its connection pool.
        pub fn with_client(client: Client) -> Self {
            Self { client }
        }

        /// Build the request without sending it.
        pub(crate) fn build_request(&self, request: &DeliveryRequest) -> Result<reqwest::Request> {
            Ok(self.client.post(DELIVERY_ENDPOINT).form(request).build()?)
        }
    }

    #[async_trait]
    impl Transport for HttpTransport {
        async fn post(&self, request: &DeliveryRequest) -> Result<DeliveryResponse> {
            let response = self.client.execute(self.build_request(request)?).await?;
            let status = response.status().as_u16();
            let body = response.text().await?;
            Ok(DeliveryResponse { status, body })
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use crate::config::DeliveryConfig;

        fn request() -> DeliveryRequest {
            DeliveryRequest::new(
                &DeliveryConfig::new("music", "xoxb-1"),
                "Now Playing: *Song* by *A & B*",
            )
        }

        #[test]
        fn test_request_targets_endpoint() {
            let transport = HttpTransport::new().unwrap();
            let built = transport.build_request(&request()).unwrap();

            assert_eq!(built.method(), reqwest::Method::POST);
            assert_eq!(built.url().as_str(), DELIVERY_ENDPOINT);
            assert_eq!(
                built.headers()[reqwest::header::CONTENT_TYPE],
                "application/x-www-form-urlencoded"
            );
        }

        #[test]
        fn test_request_body_is_form_encoded() {
            let transport = HttpTransport::new().unwrap();
            let built = transport.build_request(&request()).unwrap();

            let body = built.body().and_then(|b| b.as_bytes()).unwrap();
            assert_eq!(
                std::str::from_utf8(body).unwrap(),
                "channel=%23music&token=xoxb-1&as_user=true\
                 &text=Now+Playing%3A+*Song*+by+*A+%26+B*"
            );
        }
    }
}
