//! Domain layer for the Stackdriver client.
//!
//! Contains the payloads sent to the gateways:
//! - `GatewayMessage`: a batch of custom-metric points
//! - `AnnotationEvent`: a timeline annotation
//! - `DeployEvent`: a deploy marker
//! - `StackdriverError`: the error type shared by every operation

pub mod annotation;
pub mod deploy;
pub mod error;
pub mod metric;

pub use annotation::{AnnotationEvent, EventLevel, truncate_message};
pub use deploy::DeployEvent;
pub use error::StackdriverError;
pub use metric::{GatewayEnvelope, GatewayMessage, MetricPoint, MetricValue, PROTOCOL_VERSION};

/// Empty optionals are left off the wire entirely.
pub(crate) fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.is_empty()).map(str::to_string)
}
