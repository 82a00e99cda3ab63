//! Remote fact providers.
//!
//! The stream only needs a one-shot fetch that either yields a [`Fact`] or a
//! [`RemoteError`]. [`HttpFactProvider`] talks to a catfact.ninja-compatible
//! service; [`OfflineProvider`] always fails so every fact comes from the
//! local fallback.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;

use crate::config::RemoteConfig;
use crate::fact::Fact;

/// Errors from a remote fact fetch. The stream recovers from all of them.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// Transport failure, including timeouts
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Service answered with a non-success status
    #[error("Service error: {status} - {message}")]
    Status { status: u16, message: String },

    /// Response body could not be turned into a fact
    #[error("Invalid response: {0}")]
    Parse(String),

    /// Provider is not able to serve facts at all
    #[error("Remote unavailable: {0}")]
    Unavailable(String),

    /// HTTP client could not be built
    #[error("Failed to build HTTP client: {0}")]
    Client(String),
}

/// Source of facts backed by a network service.
#[async_trait]
pub trait RemoteFactProvider: Send + Sync {
    /// Returns the name of this provider for logging.
    fn name(&self) -> &'static str;

    /// Fetch one fact.
    async fn fetch_fact(&self) -> Result<Fact, RemoteError>;
}

/// Body of `GET /fact`. The service also sends `length`, which is ignored.
#[derive(Debug, Deserialize)]
struct FactPayload {
    fact: String,
}

/// Provider for a catfact.ninja-compatible HTTP API.
pub struct HttpFactProvider {
    client: Client,
    url: String,
}

impl HttpFactProvider {
    /// Build a provider from remote settings.
    pub fn new(config: &RemoteConfig) -> Result<Self, RemoteError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds.into()))
            .connect_timeout(Duration::from_secs(config.connect_timeout_seconds.into()))
            .build()
            .map_err(|e| RemoteError::Client(e.to_string()))?;

        Ok(Self {
            client,
            url: format!("{}/fact", config.base_url.trim_end_matches('/')),
        })
    }

    /// Full URL requested on every fetch.
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl RemoteFactProvider for HttpFactProvider {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn fetch_fact(&self) -> Result<Fact, RemoteError> {
        let start = Instant::now();
        let response = self
            .client
            .get(&self.url)
            .header("Accept", "application/json")
            .send()
            .await?;

        let status = response.status();
        let latency_ms = start.elapsed().as_millis() as u64;

        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());
            tracing::debug!(
                url = %self.url,
                status = %status,
                latency_ms,
                "Fact service returned an error"
            );
            return Err(RemoteError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text().await?;
        let payload: FactPayload = serde_json::from_str(&body)
            .map_err(|e| RemoteError::Parse(format!("Failed to parse fact JSON: {}", e)))?;

        if payload.fact.trim().is_empty() {
            return Err(RemoteError::Parse("Fact text is empty".to_string()));
        }

        tracing::trace!(url = %self.url, latency_ms, "Fetched remote fact");
        Ok(Fact::new(payload.fact))
    }
}

/// Provider that never reaches the network.
#[derive(Debug, Default, Clone, Copy)]
pub struct OfflineProvider;

#[async_trait]
impl RemoteFactProvider for OfflineProvider {
    fn name(&self) -> &'static str {
        "offline"
    }

    async fn fetch_fact(&self) -> Result<Fact, RemoteError> {
        Err(RemoteError::Unavailable("offline mode".to_string()))
    }
}
