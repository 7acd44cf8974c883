//! ThingSpeak HTTP client.

use std::time::Duration;

use gaitwatch_core::{MonitorConfig, TelemetryError, ThingSpeakFeed};
use tracing::{debug, instrument};

/// Fetches channel feeds from the ThingSpeak REST API.
#[derive(Debug, Clone)]
pub struct ThingSpeakClient {
    http: reqwest::Client,
    base_url: String,
    channel_id: String,
    api_key: Option<String>,
}

impl ThingSpeakClient {
    /// Build a client from the feed settings in `config`.
    ///
    /// # Errors
    ///
    /// Returns [`TelemetryError::Transport`] if the HTTP client cannot be
    /// constructed.
    pub fn from_config(config: &MonitorConfig) -> Result<Self, TelemetryError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| TelemetryError::transport(e.to_string()))?;
        Ok(Self {
            http,
            base_url: config.feed_base_url.trim_end_matches('/').to_string(),
            channel_id: config.channel_id.clone(),
            api_key: config.api_key.clone(),
        })
    }

    /// Feed endpoint of the configured channel.
    #[must_use]
    pub fn feed_url(&self) -> String {
        format!("{}/channels/{}/feeds.json", self.base_url, self.channel_id)
    }

    /// Query parameters for a request of `results` entries.
    #[must_use]
    pub fn query(&self, results: usize) -> Vec<(&'static str, String)> {
        let mut query = vec![("results", results.to_string())];
        if let Some(key) = &self.api_key {
            query.push(("api_key", key.clone()));
        }
        query
    }

    /// Fetch the `results` most recent entries.
    ///
    /// # Errors
    ///
    /// Returns [`TelemetryError::Transport`] on network or HTTP status
    /// failures and parse errors from [`ThingSpeakFeed::parse`].
    #[instrument(skip(self), fields(channel = %self.channel_id))]
    pub async fn fetch(&self, results: usize) -> Result<ThingSpeakFeed, TelemetryError> {
        let response = self
            .http
            .get(self.feed_url())
            .query(&self.query(results))
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| TelemetryError::transport(e.to_string()))?;
        let body = response
            .text()
            .await
            .map_err(|e| TelemetryError::transport(e.to_string()))?;
        debug!(bytes = body.len(), "Fetched feed");
        ThingSpeakFeed::parse(&body)
    }
}
