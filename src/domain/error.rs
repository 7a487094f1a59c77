use crate::config::ConfigError;
use crate::sender::Endpoint;
use thiserror::Error;

/// Top-level error type for every gateway operation.
#[derive(Error, Debug)]
pub enum StackdriverError {
    #[error("Stale metric: collected_at {collected_at} is over an hour before now ({now})")]
    StaleMetric { collected_at: i64, now: i64 },

    #[error("Serialization failed: {0}")]
    SerializationFailed(#[from] serde_json::Error),

    #[error("Transport failed: {0}")]
    TransportFailed(#[from] reqwest::Error),

    #[error("{endpoint} gateway rejected request: HTTP {status} - {body}")]
    RemoteRejection {
        endpoint: Endpoint,
        status: u16,
        body: String,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl StackdriverError {
    /// HTTP status of a rejected request, if the gateway answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::RemoteRejection { status, .. } => Some(*status),
            Self::TransportFailed(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::TransportFailed(e) if e.is_timeout())
    }
}
