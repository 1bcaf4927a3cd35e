use crate::commands::settings::DashboardSettings;
use crate::models::snapshot::{StatsEnvelope, TicketStatsSnapshot};
use async_trait::async_trait;
use log::{debug, warn};
use std::time::Duration;
use thiserror::Error;

pub const STATS_PATH: &str = "/api/get-gist-conv-for-hello-cv";

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("network error: {0}")]
    Network(String),
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
    #[error("server responded with status {0}")]
    Status(u16),
    #[error("malformed response: {0}")]
    Malformed(String),
    #[error("server reported an unsuccessful response")]
    Unsuccessful,
}

/// Something that can produce a fresh snapshot.
#[async_trait]
pub trait StatsSource: Send + Sync {
    async fn fetch(&self) -> Result<TicketStatsSnapshot, FetchError>;
}

/// Single GET against the stats endpoint. No retries.
#[derive(Debug, Clone)]
pub struct HttpStatsSource {
    url: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl HttpStatsSource {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Network(e.to_string()))?;

        Ok(Self {
            url: format!("{}{STATS_PATH}", base_url.trim_end_matches('/')),
            timeout,
            client,
        })
    }

    pub fn from_settings(settings: &DashboardSettings) -> Result<Self, FetchError> {
        Self::new(&settings.api_base_url, settings.request_timeout)
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn classify(&self, err: reqwest::Error) -> FetchError {
        if err.is_timeout() {
            FetchError::Timeout(self.timeout)
        } else if err.is_decode() {
            FetchError::Malformed(err.to_string())
        } else if let Some(status) = err.status() {
            FetchError::Status(status.as_u16())
        } else {
            FetchError::Network(err.to_string())
        }
    }
}

#[async_trait]
impl StatsSource for HttpStatsSource {
    async fn fetch(&self) -> Result<TicketStatsSnapshot, FetchError> {
        debug!("GET {}", self.url);

        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if !status.is_success() {
            warn!("stats endpoint returned {status}");
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = response.bytes().await.map_err(|e| self.classify(e))?;
        parse_envelope(&body)
    }
}

/// Decode a response body into a snapshot.
pub fn parse_envelope(body: &[u8]) -> Result<TicketStatsSnapshot, FetchError> {
    let envelope: StatsEnvelope =
        serde_json::from_slice(body).map_err(|e| FetchError::Malformed(e.to_string()))?;

    if !envelope.success {
        return Err(FetchError::Unsuccessful);
    }
    envelope
        .data
        .ok_or_else(|| FetchError::Malformed("missing data field".to_string()))
}

/// Serves the same snapshot on every call.
#[derive(Debug, Clone)]
pub struct StaticStatsSource {
    snapshot: TicketStatsSnapshot,
}

impl StaticStatsSource {
    pub fn new(snapshot: TicketStatsSnapshot) -> Self {
        Self { snapshot }
    }
}

#[async_trait]
impl StatsSource for StaticStatsSource {
    async fn fetch(&self) -> Result<TicketStatsSnapshot, FetchError> {
        Ok(self.snapshot.clone())
    }
}
