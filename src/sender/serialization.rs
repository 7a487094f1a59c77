use crate::domain::{AnnotationEvent, DeployEvent, GatewayMessage, StackdriverError};
use serde::Serialize;
use tracing::trace;

// Rough per-point size, used only to presize the output buffer.
const ESTIMATED_POINT_SIZE: usize = 96;
const ENVELOPE_OVERHEAD: usize = 128;

/// Encodes gateway payloads as JSON request bodies.
#[derive(Debug, Clone, Copy, Default)]
pub struct PayloadSerializer;

impl PayloadSerializer {
    pub fn new() -> Self {
        Self
    }

    pub fn serialize_gateway_message(
        &self,
        message: &GatewayMessage,
        customer_id: Option<&str>,
    ) -> Result<Vec<u8>, StackdriverError> {
        let capacity = message
            .len()
            .saturating_mul(ESTIMATED_POINT_SIZE)
            .saturating_add(ENVELOPE_OVERHEAD);
        self.serialize_into(Vec::with_capacity(capacity), &message.envelope(customer_id))
    }

    pub fn serialize_annotation_event(
        &self,
        event: &AnnotationEvent,
    ) -> Result<Vec<u8>, StackdriverError> {
        self.serialize(event)
    }

    pub fn serialize_deploy_event(&self, event: &DeployEvent) -> Result<Vec<u8>, StackdriverError> {
        self.serialize(event)
    }

    pub fn serialize<P>(&self, payload: &P) -> Result<Vec<u8>, StackdriverError>
    where
        P: Serialize + ?Sized,
    {
        self.serialize_into(Vec::with_capacity(ENVELOPE_OVERHEAD), payload)
    }

    fn serialize_into<P>(
        &self,
        mut buffer: Vec<u8>,
        payload: &P,
    ) -> Result<Vec<u8>, StackdriverError>
    where
        P: Serialize + ?Sized,
    {
        serde_json::to_writer(&mut buffer, payload)?;
        trace!(bytes = buffer.len(), "serialized gateway payload");
        Ok(buffer)
    }
}
