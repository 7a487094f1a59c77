use super::error::StackdriverError;
use chrono::Utc;
use serde::ser::Error as _;
use serde::{Serialize, Serializer};

/// Schema version of the gateway message understood by the custom-metric gateway.
pub const PROTOCOL_VERSION: i64 = 1;

/// Points collected longer ago than this are rejected by the gateway.
pub const MAX_METRIC_AGE_SECS: i64 = 3600;

/// Measurement recorded for a single data point.
///
/// Serialized untagged, so `Integer(42)` goes over the wire as `42` and
/// `Text("up")` as `"up"`. NaN and infinities have no JSON form and fail
/// serialization.
#[derive(Debug, Clone, PartialEq)]
pub enum MetricValue {
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Text(String),
}

impl Serialize for MetricValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Integer(v) => serializer.serialize_i64(*v),
            Self::Float(v) if v.is_finite() => serializer.serialize_f64(*v),
            Self::Float(v) => Err(S::Error::custom(format_args!(
                "metric value {v} is not a finite number"
            ))),
            Self::Boolean(v) => serializer.serialize_bool(*v),
            Self::Text(v) => serializer.serialize_str(v),
        }
    }
}

impl From<i64> for MetricValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for MetricValue {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<u32> for MetricValue {
    fn from(value: u32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<f64> for MetricValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<f32> for MetricValue {
    fn from(value: f32) -> Self {
        Self::Float(f64::from(value))
    }
}

impl From<bool> for MetricValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<String> for MetricValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for MetricValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl std::str::FromStr for MetricValue {
    type Err = std::convert::Infallible;

    /// Integer, then float, then boolean; anything else is kept as text.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(v) = s.parse::<i64>() {
            return Ok(Self::Integer(v));
        }
        if let Ok(v) = s.parse::<f64>() {
            return Ok(Self::Float(v));
        }
        if let Ok(v) = s.parse::<bool>() {
            return Ok(Self::Boolean(v));
        }
        Ok(Self::Text(s.to_string()))
    }
}

/// A single custom-metric data point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricPoint {
    /// Unix timestamp of when the measurement was collected.
    pub collected_at: i64,
    /// Metric name; need not be unique within a batch.
    pub name: String,
    pub value: MetricValue,
    /// Points with an instance id show up under that instance's resources,
    /// otherwise under the Custom resource type.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance_id: Option<String>,
}

/// The metric batch sent to the custom-metric gateway.
///
/// Points keep their insertion order. The batch can be appended to and sent
/// any number of times, but points only get in through
/// [`custom_metric`](Self::custom_metric):
///
/// ```compile_fail
/// let mut batch = stackdriver::GatewayMessage::new();
/// batch.data.clear();
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GatewayMessage {
    timestamp: i64,
    proto_version: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    customer_id: Option<String>,
    data: Vec<MetricPoint>,
}

/// Wire form of a batch: `{"gateway_msg": {...}}`.
#[derive(Debug, Serialize)]
pub struct GatewayEnvelope<'a> {
    gateway_msg: OutgoingMessage<'a>,
}

#[derive(Debug, Serialize)]
struct OutgoingMessage<'a> {
    timestamp: i64,
    proto_version: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    customer_id: Option<&'a str>,
    data: &'a [MetricPoint],
}

impl GatewayMessage {
    pub fn new() -> Self {
        Self::at(Utc::now().timestamp())
    }

    pub fn at(timestamp: i64) -> Self {
        Self {
            timestamp,
            proto_version: PROTOCOL_VERSION,
            customer_id: None,
            data: Vec::new(),
        }
    }

    /// Sets the customer id sent with this batch. An empty id clears it.
    pub fn with_customer_id(mut self, customer_id: &str) -> Self {
        self.customer_id = super::non_empty(Some(customer_id));
        self
    }

    /// Appends a data point, rejecting it if `collected_at` is more than an
    /// hour in the past.
    pub fn custom_metric(
        &mut self,
        name: impl Into<String>,
        instance_id: Option<&str>,
        collected_at: i64,
        value: impl Into<MetricValue>,
    ) -> Result<(), StackdriverError> {
        self.custom_metric_at(name, instance_id, collected_at, value, Utc::now().timestamp())
    }

    pub(crate) fn custom_metric_at(
        &mut self,
        name: impl Into<String>,
        instance_id: Option<&str>,
        collected_at: i64,
        value: impl Into<MetricValue>,
        now: i64,
    ) -> Result<(), StackdriverError> {
        if now.saturating_sub(collected_at) > MAX_METRIC_AGE_SECS {
            return Err(StackdriverError::StaleMetric { collected_at, now });
        }

        self.data.push(MetricPoint {
            collected_at,
            name: name.into(),
            value: value.into(),
            instance_id: super::non_empty(instance_id),
        });
        Ok(())
    }

    /// Borrows the batch as its wire envelope. A `customer_id` given here
    /// takes precedence over the one stored on the batch.
    pub fn envelope<'a>(&'a self, customer_id: Option<&'a str>) -> GatewayEnvelope<'a> {
        GatewayEnvelope {
            gateway_msg: OutgoingMessage {
                timestamp: self.timestamp,
                proto_version: self.proto_version,
                customer_id: customer_id.or(self.customer_id.as_deref()),
                data: &self.data,
            },
        }
    }

    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    pub fn proto_version(&self) -> i64 {
        self.proto_version
    }

    pub fn customer_id(&self) -> Option<&str> {
        self.customer_id.as_deref()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn points(&self) -> &[MetricPoint] {
        &self.data
    }
}

impl Default for GatewayMessage {
    fn default() -> Self {
        Self::new()
    }
}
