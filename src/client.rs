//! The client handle and the three gateway operations.

use crate::config::ClientConfig;
use crate::domain::{AnnotationEvent, DeployEvent, GatewayMessage, StackdriverError};
use crate::sender::transmission::deliver_encoded;
use crate::sender::{DeliveryStats, Endpoint, HttpTransport, PayloadSerializer, Transport};
use std::sync::Arc;
use tracing::debug;

/// Handle for the Stackdriver gateways.
///
/// Holds the API key, an optional customer id and a shared transport.
/// Cloning is cheap and clones share one connection pool.
pub struct StackdriverClient<T: Transport = HttpTransport> {
    api_key: String,
    customer_id: Option<String>,
    transport: Arc<T>,
    serializer: PayloadSerializer,
}

impl StackdriverClient<HttpTransport> {
    /// Creates a client for the public gateways. The key is not checked
    /// locally; a bad key surfaces as a gateway rejection.
    pub fn new(api_key: impl Into<String>) -> Result<Self, StackdriverError> {
        Self::with_config(api_key, ClientConfig::default())
    }

    pub fn with_config(
        api_key: impl Into<String>,
        config: ClientConfig,
    ) -> Result<Self, StackdriverError> {
        Ok(Self::with_transport(api_key, HttpTransport::new(config)?))
    }

    pub fn delivery_stats(&self) -> DeliveryStats {
        self.transport.delivery_stats()
    }
}

impl<T: Transport> StackdriverClient<T> {
    pub fn with_transport(api_key: impl Into<String>, transport: T) -> Self {
        Self {
            api_key: api_key.into(),
            customer_id: None,
            transport: Arc::new(transport),
            serializer: PayloadSerializer::new(),
        }
    }

    /// Associates every metric batch sent through this client with a
    /// Stackdriver customer id.
    pub fn with_customer_id(mut self, customer_id: impl Into<String>) -> Self {
        let customer_id = customer_id.into();
        self.customer_id = (!customer_id.is_empty()).then_some(customer_id);
        self
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn customer_id(&self) -> Option<&str> {
        self.customer_id.as_deref()
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Sends every point collected so far in `message`.
    ///
    /// The batch is left untouched, so it can be extended and sent again.
    /// Succeeds on HTTP 200 or 201.
    pub async fn send(&self, message: &GatewayMessage) -> Result<(), StackdriverError> {
        debug!(points = message.len(), "sending custom metrics");
        let body = self
            .serializer
            .serialize_gateway_message(message, self.customer_id.as_deref())?;
        deliver_encoded(&*self.transport, Endpoint::CustomMetrics, &self.api_key, body).await?;
        Ok(())
    }

    /// Posts an annotation event. Succeeds only on HTTP 200.
    pub async fn send_annotation_event(
        &self,
        event: &AnnotationEvent,
    ) -> Result<(), StackdriverError> {
        debug!(event_epoch = event.event_epoch(), "sending annotation event");
        let body = self.serializer.serialize_annotation_event(event)?;
        deliver_encoded(&*self.transport, Endpoint::AnnotationEvent, &self.api_key, body).await?;
        Ok(())
    }

    /// Posts a deploy event. Succeeds only on HTTP 200.
    pub async fn send_deploy_event(&self, event: &DeployEvent) -> Result<(), StackdriverError> {
        debug!(revision_id = event.revision_id(), "sending deploy event");
        let body = self.serializer.serialize_deploy_event(event)?;
        deliver_encoded(&*self.transport, Endpoint::DeployEvent, &self.api_key, body).await?;
        Ok(())
    }
}

impl<T: Transport> Clone for StackdriverClient<T> {
    fn clone(&self) -> Self {
        Self {
            api_key: self.api_key.clone(),
            customer_id: self.customer_id.clone(),
            transport: Arc::clone(&self.transport),
            serializer: self.serializer,
        }
    }
}

impl<T: Transport> std::fmt::Debug for StackdriverClient<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StackdriverClient")
            .field("api_key", &"<redacted>")
            .field("customer_id", &self.customer_id)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::EventLevel;
    use crate::sender::TransportResponse;
    use crate::sender::transmission::MockTransport;
    use serde_json::{Value, json};

    fn ok(status: u16) -> Result<TransportResponse, StackdriverError> {
        Ok(TransportResponse {
            status,
            body: String::new(),
        })
    }

    #[tokio::test]
    async fn send_injects_customer_id_and_accepts_created() {
        let mut transport = MockTransport::new();
        transport
            .expect_post_json()
            .withf(|endpoint, _, body| {
                let value: Value = serde_json::from_slice(body).unwrap();
                *endpoint == Endpoint::CustomMetrics
                    && value["gateway_msg"]["customer_id"] == json!("cust-1")
                    && value["gateway_msg"]["data"][0]["name"] == json!("cpu")
            })
            .times(1)
            .returning(|_, _, _| ok(201));

        let client = StackdriverClient::with_transport("key", transport).with_customer_id("cust-1");
        let now = chrono::Utc::now().timestamp();
        let mut batch = GatewayMessage::new();
        batch.custom_metric("cpu", None, now, 42).unwrap();

        tokio_test::assert_ok!(client.send(&batch).await);
    }

    #[tokio::test]
    async fn batch_can_be_sent_repeatedly() {
        let mut transport = MockTransport::new();
        transport.expect_post_json().times(2).returning(|_, _, _| ok(200));

        let client = StackdriverClient::with_transport("key", transport);
        let mut batch = GatewayMessage::new();
        client.send(&batch).await.unwrap();

        let now = chrono::Utc::now().timestamp();
        batch.custom_metric("cpu", None, now, 1).unwrap();
        client.send(&batch).await.unwrap();
    }

    #[tokio::test]
    async fn annotation_rejects_created() {
        let mut transport = MockTransport::new();
        transport
            .expect_post_json()
            .withf(|endpoint, api_key, _| {
                *endpoint == Endpoint::AnnotationEvent && api_key == "key"
            })
            .returning(|_, _, _| ok(201));

        let client = StackdriverClient::with_transport("key", transport);
        let event = AnnotationEvent::new("rolled back", 1).level(EventLevel::Warn);

        let err = tokio_test::assert_err!(client.send_annotation_event(&event).await);
        assert_eq!(err.status(), Some(201));
    }

    #[tokio::test]
    async fn deploy_event_succeeds_on_ok() {
        let mut transport = MockTransport::new();
        transport
            .expect_post_json()
            .withf(|endpoint, _, _| *endpoint == Endpoint::DeployEvent)
            .returning(|_, _, _| ok(200));

        let client = StackdriverClient::with_transport("key", transport);
        tokio_test::assert_ok!(client.send_deploy_event(&DeployEvent::new("abc")).await);
    }

    #[tokio::test]
    async fn non_finite_metric_is_never_posted() {
        let mut transport = MockTransport::new();
        transport.expect_post_json().times(0);

        let client = StackdriverClient::with_transport("key", transport);
        let now = chrono::Utc::now().timestamp();
        let mut batch = GatewayMessage::new();
        batch.custom_metric("load", None, now, f64::NAN).unwrap();

        let err = tokio_test::assert_err!(client.send(&batch).await);
        assert!(matches!(err, StackdriverError::SerializationFailed(_)));
    }

    #[test]
    fn empty_customer_id_is_ignored() {
        let client =
            StackdriverClient::with_transport("key", MockTransport::new()).with_customer_id("");
        assert_eq!(client.customer_id(), None);
    }

    #[test]
    fn debug_output_redacts_api_key() {
        let client = StackdriverClient::with_transport("very-secret", MockTransport::new());
        let rendered = format!("{client:?}");

        assert!(!rendered.contains("very-secret"));
        assert!(rendered.contains("<redacted>"));
    }
}
