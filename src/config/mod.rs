pub mod serde_helpers;
mod validation;

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_CUSTOM_METRICS_URL: &str = "https://custom-gateway.stackdriver.com/v1/custom";
pub const DEFAULT_ANNOTATION_EVENT_URL: &str =
    "https://event-gateway.stackdriver.com/v1/annotationevent";
pub const DEFAULT_DEPLOY_EVENT_URL: &str = "https://event-gateway.stackdriver.com/v1/deployevent";

pub const DEFAULT_USER_AGENT: &str =
    concat!("Rust Stackdriver API Library/", env!("CARGO_PKG_VERSION"));

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("File error: {0}")]
    FileError(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// Gateway URLs, one per operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    pub custom_metrics: String,
    pub annotation_event: String,
    pub deploy_event: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            custom_metrics: DEFAULT_CUSTOM_METRICS_URL.to_string(),
            annotation_event: DEFAULT_ANNOTATION_EVENT_URL.to_string(),
            deploy_event: DEFAULT_DEPLOY_EVENT_URL.to_string(),
        }
    }
}

impl Endpoints {
    /// Points all three gateways at one base URL, keeping the standard paths.
    /// Handy for local mock gateways.
    pub fn with_base_url(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            custom_metrics: format!("{base}/v1/custom"),
            annotation_event: format!("{base}/v1/annotationevent"),
            deploy_event: format!("{base}/v1/deployevent"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub endpoints: Endpoints,
    /// Total time allowed for one request, from connect to last body byte.
    #[serde(with = "serde_helpers")]
    pub timeout: Duration,
    #[serde(with = "serde_helpers")]
    pub connect_timeout: Duration,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoints: Endpoints::default(),
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl ClientConfig {
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: ClientConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }
}
