use super::transmission::{Endpoint, Transport, TransportResponse};
use crate::config::ClientConfig;
use crate::domain::StackdriverError;
use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue, USER_AGENT};
use reqwest::{Client, ClientBuilder};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tracing::debug;
use url::Url;

pub const API_KEY_HEADER: &str = "x-stackdriver-apikey";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryStats {
    pub total_requests: u64,
    pub successful_requests: u64,
    pub failed_requests: u64,
    pub average_response_time: Duration,
}

#[derive(Debug, Default)]
pub struct ClientStats {
    total_requests: AtomicU64,
    successful_requests: AtomicU64,
    failed_requests: AtomicU64,
    total_response_time: AtomicU64,
}

impl ClientStats {
    pub fn record_request(&self, success: bool, response_time: Duration) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
        self.total_response_time
            .fetch_add(response_time.as_millis() as u64, Ordering::Relaxed);

        if success {
            self.successful_requests.fetch_add(1, Ordering::Relaxed);
        } else {
            self.failed_requests.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn snapshot(&self) -> DeliveryStats {
        let total_requests = self.total_requests.load(Ordering::Relaxed);
        let total_response_time = self.total_response_time.load(Ordering::Relaxed);

        let average_response_time = if total_requests > 0 {
            Duration::from_millis(total_response_time / total_requests)
        } else {
            Duration::ZERO
        };

        DeliveryStats {
            total_requests,
            successful_requests: self.successful_requests.load(Ordering::Relaxed),
            failed_requests: self.failed_requests.load(Ordering::Relaxed),
            average_response_time,
        }
    }
}

#[derive(Debug, Clone)]
struct EndpointUrls {
    custom_metrics: Url,
    annotation_event: Url,
    deploy_event: Url,
}

/// reqwest-backed transport. One instance holds one connection pool, so
/// clone it rather than building a new one per request.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    config: ClientConfig,
    urls: EndpointUrls,
    stats: Arc<ClientStats>,
}

impl HttpTransport {
    pub fn new(config: ClientConfig) -> Result<Self, StackdriverError> {
        config.validate()?;

        let parse = |raw: &str| {
            raw.parse::<Url>().map_err(|e| {
                StackdriverError::InvalidConfiguration(format!("Invalid endpoint URL {raw}: {e}"))
            })
        };
        let urls = EndpointUrls {
            custom_metrics: parse(&config.endpoints.custom_metrics)?,
            annotation_event: parse(&config.endpoints.annotation_event)?,
            deploy_event: parse(&config.endpoints.deploy_event)?,
        };

        let client = ClientBuilder::new()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| {
                StackdriverError::InvalidConfiguration(format!("Failed to build HTTP client: {e}"))
            })?;

        Ok(Self {
            client,
            config,
            urls,
            stats: Arc::new(ClientStats::default()),
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn url(&self, endpoint: Endpoint) -> &Url {
        match endpoint {
            Endpoint::CustomMetrics => &self.urls.custom_metrics,
            Endpoint::AnnotationEvent => &self.urls.annotation_event,
            Endpoint::DeployEvent => &self.urls.deploy_event,
        }
    }

    pub fn delivery_stats(&self) -> DeliveryStats {
        self.stats.snapshot()
    }

    pub fn build_headers(&self, api_key: &str) -> Result<HeaderMap, StackdriverError> {
        let mut headers = HeaderMap::new();

        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&self.config.user_agent).map_err(|e| {
                StackdriverError::InvalidConfiguration(format!("Invalid user agent: {e}"))
            })?,
        );

        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let mut key = HeaderValue::from_str(api_key).map_err(|e| {
            StackdriverError::InvalidConfiguration(format!("Invalid API key: {e}"))
        })?;
        key.set_sensitive(true);
        headers.insert(HeaderName::from_static(API_KEY_HEADER), key);

        Ok(headers)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post_json(
        &self,
        endpoint: Endpoint,
        api_key: &str,
        body: Vec<u8>,
    ) -> Result<TransportResponse, StackdriverError> {
        let headers = self.build_headers(api_key)?;
        let url = self.url(endpoint).clone();
        let bytes_sent = body.len();
        let start = Instant::now();

        debug!(%endpoint, %url, bytes_sent, "posting payload to gateway");

        let response = match self.client.post(url).headers(headers).body(body).send().await {
            Ok(response) => response,
            Err(e) => {
                self.stats.record_request(false, start.elapsed());
                return Err(StackdriverError::TransportFailed(e));
            }
        };

        let status = response.status().as_u16();
        let body = response_body(endpoint, status, response.text().await);
        let latency = start.elapsed();

        self.stats.record_request(endpoint.accepts(status), latency);
        debug!(%endpoint, status, ?latency, "gateway responded");

        Ok(TransportResponse { status, body })
    }
}

/// Response body, or an empty string if it could not be read.
fn response_body<E: std::fmt::Display>(
    endpoint: Endpoint,
    status: u16,
    body: Result<String, E>,
) -> String {
    match body {
        Ok(body) => body,
        Err(e) => {
            debug!(%endpoint, status, error = %e, "failed to read gateway response body");
            String::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Endpoints;

    #[test]
    fn headers_carry_agent_content_type_and_key() {
        let transport = HttpTransport::new(ClientConfig::default()).unwrap();
        let headers = transport.build_headers("secret").unwrap();

        assert_eq!(headers[CONTENT_TYPE], "application/json");
        assert_eq!(headers[API_KEY_HEADER], "secret");
        assert!(headers[API_KEY_HEADER].is_sensitive());
        assert!(
            headers[USER_AGENT]
                .to_str()
                .unwrap()
                .starts_with("Rust Stackdriver API Library/")
        );
    }

    #[test]
    fn unprintable_api_key_is_rejected_locally() {
        let transport = HttpTransport::new(ClientConfig::default()).unwrap();

        assert!(matches!(
            transport.build_headers("bad\nkey"),
            Err(StackdriverError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn empty_api_key_is_accepted() {
        let transport = HttpTransport::new(ClientConfig::default()).unwrap();
        assert!(transport.build_headers("").is_ok());
    }

    #[test]
    fn urls_follow_configured_endpoints() {
        let config = ClientConfig {
            endpoints: Endpoints::with_base_url("http://localhost:8125"),
            ..Default::default()
        };
        let transport = HttpTransport::new(config).unwrap();

        assert_eq!(
            transport.url(Endpoint::CustomMetrics).as_str(),
            "http://localhost:8125/v1/custom"
        );
        assert_eq!(
            transport.url(Endpoint::DeployEvent).as_str(),
            "http://localhost:8125/v1/deployevent"
        );
    }

    #[test]
    fn invalid_config_fails_construction() {
        let config = ClientConfig {
            timeout: Duration::ZERO,
            ..Default::default()
        };

        assert!(matches!(
            HttpTransport::new(config),
            Err(StackdriverError::Config(_))
        ));
    }

    #[test]
    fn unreadable_body_falls_back_to_empty() {
        let read: Result<String, &str> = Err("connection reset while reading body");
        assert_eq!(response_body(Endpoint::CustomMetrics, 502, read), "");

        let read: Result<String, &str> = Ok("quota exceeded".to_string());
        assert_eq!(
            response_body(Endpoint::CustomMetrics, 429, read),
            "quota exceeded"
        );
    }

    #[test]
    fn stats_average_response_time() {
        let stats = ClientStats::default();
        assert_eq!(stats.snapshot().average_response_time, Duration::ZERO);

        stats.record_request(true, Duration::from_millis(10));
        stats.record_request(false, Duration::from_millis(30));

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.total_requests, 2);
        assert_eq!(snapshot.successful_requests, 1);
        assert_eq!(snapshot.failed_requests, 1);
        assert_eq!(snapshot.average_response_time, Duration::from_millis(20));
    }
}
