// Device API client implementation
use crate::application::device_gateway::DeviceGateway;
use crate::domain::reading::{EntryTimestamp, HistoryRecord, SensorReading};
use anyhow::Result;
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

/// Normalized base address of a device. Built from free-text input; a bad
/// address surfaces as a fetch error on the next poll, never as a
/// construction failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiEndpoint {
    base: String,
}

impl ApiEndpoint {
    /// Trim the input, prefix `http://` unless the input already starts
    /// with `http`, and strip all trailing slashes.
    pub fn from_input(raw: &str) -> Self {
        let trimmed = raw.trim();
        let with_scheme = if trimmed.starts_with("http") {
            trimmed.to_string()
        } else {
            format!("http://{}", trimmed)
        };
        Self {
            base: with_scheme.trim_end_matches('/').to_string(),
        }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn live_url(&self) -> String {
        format!("{}/api", self.base)
    }

    pub fn history_url(&self) -> String {
        format!("{}/api/history", self.base)
    }

    pub fn history_csv_url(&self) -> String {
        format!("{}/api/history/csv", self.base)
    }
}

/// Failure taxonomy for device requests. All variants degrade to the same
/// user-visible status; the distinction is kept for the logs.
#[derive(Debug, Error)]
pub enum DeviceApiError {
    #[error("request to {url} failed: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("device at {url} returned status {status}")]
    Status { url: String, status: StatusCode },
    #[error("malformed payload from {url}: {source}")]
    Parse {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// One stored history entry as the device reports it.
#[derive(Debug, Deserialize)]
struct HistoryEntry {
    timestamp: Option<EntryTimestamp>,
    pm2p5: Option<f64>,
    co2: Option<f64>,
    temperature: Option<f64>,
    humidity: Option<f64>,
    #[serde(rename = "vocIndex")]
    voc_index: Option<f64>,
    #[serde(rename = "noxIndex")]
    nox_index: Option<f64>,
    pm1p0: Option<f64>,
}

impl HistoryEntry {
    fn into_record(self) -> HistoryRecord {
        HistoryRecord {
            time_label: self
                .timestamp
                .map(|t| t.time_label())
                .unwrap_or_else(|| "--".to_string()),
            pm2p5: self.pm2p5.unwrap_or(0.0),
            co2: self.co2.unwrap_or(0.0),
            temperature: self.temperature.unwrap_or(0.0),
            humidity: self.humidity.unwrap_or(0.0),
            voc_index: self.voc_index.unwrap_or(0.0),
            nox_index: self.nox_index.unwrap_or(0.0),
            pm1p0: self.pm1p0.unwrap_or(0.0),
        }
    }
}

#[derive(Debug, Clone)]
pub struct HttpDeviceClient {
    http: reqwest::Client,
}

impl HttpDeviceClient {
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
        }
    }

    // No request timeout is configured; a stalled request ends only when
    // the socket does. Stale completions are rejected by sequence number.
    async fn get(&self, url: &str) -> Result<reqwest::Response, DeviceApiError> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|source| DeviceApiError::Network {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(DeviceApiError::Status {
                url: url.to_string(),
                status,
            });
        }

        Ok(response)
    }
}

impl Default for HttpDeviceClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DeviceGateway for HttpDeviceClient {
    async fn fetch_live(&self, endpoint: &ApiEndpoint) -> Result<SensorReading> {
        let url = endpoint.live_url();
        let response = self.get(&url).await?;
        let reading = response
            .json::<SensorReading>()
            .await
            .map_err(|source| DeviceApiError::Parse { url, source })?;
        Ok(reading)
    }

    async fn fetch_history(&self, endpoint: &ApiEndpoint) -> Result<Vec<HistoryRecord>> {
        let url = endpoint.history_url();
        let response = self.get(&url).await?;
        let entries = response
            .json::<Vec<HistoryEntry>>()
            .await
            .map_err(|source| DeviceApiError::Parse { url, source })?;
        Ok(entries.into_iter().map(HistoryEntry::into_record).collect())
    }

    async fn fetch_history_csv(&self, endpoint: &ApiEndpoint) -> Result<Bytes> {
        let url = endpoint.history_csv_url();
        let response = self.get(&url).await?;
        let body = response
            .bytes()
            .await
            .map_err(|source| DeviceApiError::Network { url, source })?;
        Ok(body)
    }
}
