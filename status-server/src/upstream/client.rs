//! Transit proxy HTTP client.
//!
//! One logical query per (entity, query-kind) pair. The proxy injects
//! provider credentials server-side; this client only classifies its error
//! surface: 500 with an "integration not configured" body means the
//! credentials were never set up, 429 means rate limiting, anything else
//! non-2xx is a generic upstream failure.

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::Semaphore;

use crate::domain::{RawBusArrival, RawTimetableEntry, StationId, StopId};

use super::convert::{convert_bus_arrivals, convert_first_last, convert_timetable};
use super::error::UpstreamError;
use super::types::{BusArrivalDto, FirstLastDto};

/// Default proxy base URL (same-origin deployment).
const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8700/transit";

/// Default maximum concurrent requests.
const DEFAULT_MAX_CONCURRENT: usize = 5;

/// Marker the proxy puts in a 500 body when provider credentials are absent.
const NOT_CONFIGURED_MARKER: &str = "integration not configured";

/// Configuration for the transit proxy client.
#[derive(Debug, Clone)]
pub struct TransitConfig {
    /// Base URL of the credential-injecting proxy.
    pub base_url: String,
    /// Maximum concurrent requests.
    pub max_concurrent: usize,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl TransitConfig {
    /// Create a config pointing at the given proxy base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            timeout_secs: 10,
        }
    }

    /// Set maximum concurrent requests.
    pub fn with_max_concurrent(mut self, n: usize) -> Self {
        self.max_concurrent = n;
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

impl Default for TransitConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

/// Transit proxy client.
///
/// Uses a semaphore to limit concurrent requests so a burst of portal
/// refreshes cannot trip the provider's rate limiter on its own.
#[derive(Debug, Clone)]
pub struct TransitClient {
    http: reqwest::Client,
    base_url: String,
    semaphore: Arc<Semaphore>,
}

impl TransitClient {
    /// Create a new client with the given configuration.
    pub fn new(config: TransitConfig) -> Result<Self, UpstreamError> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url,
            semaphore: Arc::new(Semaphore::new(config.max_concurrent)),
        })
    }

    /// Metro first/last-train table for a station.
    pub async fn first_last(
        &self,
        station: &StationId,
    ) -> Result<Vec<RawTimetableEntry>, UpstreamError> {
        let body = self
            .get("metro/first-last", &[("station", station.as_str())])
            .await?;
        let dtos: Vec<FirstLastDto> = parse_body(&body)?;
        Ok(convert_first_last(dtos))
    }

    /// Metro live per-train timetable for a station.
    pub async fn timetable(
        &self,
        station: &StationId,
    ) -> Result<Vec<RawTimetableEntry>, UpstreamError> {
        let body = self
            .get("metro/timetable", &[("station", station.as_str())])
            .await?;
        let records: Vec<Value> = parse_body(&body)?;
        Ok(convert_timetable(records))
    }

    /// Live bus arrival estimates for a stop.
    pub async fn bus_arrivals(&self, stop: &StopId) -> Result<Vec<RawBusArrival>, UpstreamError> {
        let body = self
            .get("bus/arrivals", &[("stop", stop.as_str())])
            .await?;
        let dtos: Vec<BusArrivalDto> = parse_body(&body)?;
        Ok(convert_bus_arrivals(dtos))
    }

    /// Issue one GET against the proxy and classify the status code.
    async fn get(&self, path: &str, query: &[(&str, &str)]) -> Result<String, UpstreamError> {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|_| UpstreamError::Api {
                status: 0,
                message: "semaphore closed".to_string(),
            })?;

        let url = format!("{}/{}", self.base_url, path);
        let response = self.http.get(&url).query(query).send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(UpstreamError::RateLimited);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();

            if status == reqwest::StatusCode::INTERNAL_SERVER_ERROR
                && body.contains(NOT_CONFIGURED_MARKER)
            {
                return Err(UpstreamError::NotConfigured);
            }

            return Err(UpstreamError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        Ok(response.text().await?)
    }
}

/// Parse a whole response body, keeping a truncated copy for diagnostics.
fn parse_body<T: serde::de::DeserializeOwned>(body: &str) -> Result<T, UpstreamError> {
    serde_json::from_str(body).map_err(|e| UpstreamError::Json {
        message: e.to_string(),
        body: Some(body.chars().take(500).collect()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_builder() {
        let config = TransitConfig::new("http://localhost:9999/transit")
            .with_max_concurrent(2)
            .with_timeout(3);

        assert_eq!(config.base_url, "http://localhost:9999/transit");
        assert_eq!(config.max_concurrent, 2);
        assert_eq!(config.timeout_secs, 3);
    }

    #[test]
    fn config_defaults() {
        let config = TransitConfig::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.max_concurrent, DEFAULT_MAX_CONCURRENT);
    }

    #[test]
    fn client_creation() {
        assert!(TransitClient::new(TransitConfig::default()).is_ok());
    }

    #[test]
    fn parse_body_keeps_truncated_diagnostics() {
        let err = parse_body::<Vec<FirstLastDto>>("not json").unwrap_err();
        match err {
            UpstreamError::Json { body, .. } => assert_eq!(body.as_deref(), Some("not json")),
            other => panic!("unexpected error: {other}"),
        }
    }
}
