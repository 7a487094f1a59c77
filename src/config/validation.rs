use super::{ClientConfig, ConfigError};
use reqwest::header::HeaderValue;
use url::Url;

impl ClientConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, endpoint) in [
            ("custom_metrics", &self.endpoints.custom_metrics),
            ("annotation_event", &self.endpoints.annotation_event),
            ("deploy_event", &self.endpoints.deploy_event),
        ] {
            let url = Url::parse(endpoint).map_err(|e| {
                ConfigError::InvalidUrl(format!("Invalid {name} endpoint URL '{endpoint}': {e}"))
            })?;

            if !matches!(url.scheme(), "http" | "https") {
                return Err(ConfigError::InvalidUrl(format!(
                    "Unsupported scheme '{}' for {name} endpoint",
                    url.scheme()
                )));
            }
        }

        if self.timeout.is_zero() {
            return Err(ConfigError::InvalidConfig(
                "Request timeout must be greater than 0".to_string(),
            ));
        }

        if self.connect_timeout.is_zero() {
            return Err(ConfigError::InvalidConfig(
                "Connect timeout must be greater than 0".to_string(),
            ));
        }

        if self.user_agent.is_empty() || HeaderValue::from_str(&self.user_agent).is_err() {
            return Err(ConfigError::InvalidConfig(format!(
                "User agent is not a valid header value: {:?}",
                self.user_agent
            )));
        }

        Ok(())
    }
}
