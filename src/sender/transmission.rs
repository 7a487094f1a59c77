use super::serialization::PayloadSerializer;
use crate::domain::StackdriverError;
use async_trait::async_trait;
use serde::Serialize;
use tracing::debug;

#[cfg(test)]
use mockall::automock;

/// The three gateway operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    CustomMetrics,
    AnnotationEvent,
    DeployEvent,
}

impl Endpoint {
    /// Whether `status` counts as a successful submission.
    ///
    /// The custom-metric gateway answers 200 or 201; the event gateway only
    /// ever signals success with 200.
    pub fn accepts(self, status: u16) -> bool {
        match self {
            Self::CustomMetrics => matches!(status, 200 | 201),
            Self::AnnotationEvent | Self::DeployEvent => status == 200,
        }
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CustomMetrics => write!(f, "custom metrics"),
            Self::AnnotationEvent => write!(f, "annotation event"),
            Self::DeployEvent => write!(f, "deploy event"),
        }
    }
}

/// Status and body of whatever the gateway answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

/// Posts an already-encoded JSON body to a gateway endpoint.
///
/// Implementations only fail when no response was obtained; classifying the
/// status is left to [`deliver`].
#[cfg_attr(test, automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    async fn post_json(
        &self,
        endpoint: Endpoint,
        api_key: &str,
        body: Vec<u8>,
    ) -> Result<TransportResponse, StackdriverError>;
}

/// Serializes `payload`, posts it and checks the answer against the
/// endpoint's acceptance policy. Returns the accepted status code.
pub async fn deliver<T, P>(
    transport: &T,
    endpoint: Endpoint,
    api_key: &str,
    payload: &P,
) -> Result<u16, StackdriverError>
where
    T: Transport + ?Sized,
    P: Serialize + ?Sized,
{
    let body = PayloadSerializer::new().serialize(payload)?;
    deliver_encoded(transport, endpoint, api_key, body).await
}

pub(crate) async fn deliver_encoded<T>(
    transport: &T,
    endpoint: Endpoint,
    api_key: &str,
    body: Vec<u8>,
) -> Result<u16, StackdriverError>
where
    T: Transport + ?Sized,
{
    let response = transport.post_json(endpoint, api_key, body).await?;

    if endpoint.accepts(response.status) {
        debug!(%endpoint, status = response.status, "gateway accepted payload");
        Ok(response.status)
    } else {
        debug!(%endpoint, status = response.status, "gateway rejected payload");
        Err(StackdriverError::RemoteRejection {
            endpoint,
            status: response.status,
            body: response.body,
        })
    }
}
