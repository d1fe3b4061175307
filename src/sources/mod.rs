//! Feed integrations.
//!
//! Defines the `ForecastSource` trait and provides implementations for:
//! - FiveThirtyEight: state toplines CSV (the authoritative key set)
//! - PredictIt: market data JSON, normalized to FiveThirtyEight's state names

pub mod fivethirtyeight;
pub mod predictit;

use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

use crate::config::SourcesConfig;
use crate::types::{FeedError, SourceMap};

/// A feed that yields one probability per state.
#[async_trait]
pub trait ForecastSource: Send + Sync {
    /// Fetch and parse the feed. Any failure aborts the run.
    async fn fetch_probabilities(&self) -> Result<SourceMap>;

    /// Source name for logging and error messages.
    fn name(&self) -> &str;
}

/// Build the HTTP client shared by the feed clients' constructors.
pub(crate) fn build_http_client(cfg: &SourcesConfig, source_name: &str) -> Result<Client, FeedError> {
    Client::builder()
        .timeout(Duration::from_secs(cfg.timeout_secs))
        .user_agent(cfg.user_agent.as_str())
        .build()
        .map_err(|e| FeedError::fetch(source_name, format!("failed to build HTTP client: {e}")))
}

/// GET `url` and return the raw body. Non-2xx responses are errors.
pub(crate) async fn fetch_bytes(
    http: &Client,
    url: &str,
    source_name: &str,
) -> Result<Vec<u8>, FeedError> {
    debug!(source = source_name, url = %url, "Fetching feed");

    let resp = http
        .get(url)
        .send()
        .await
        .map_err(|e| FeedError::fetch(source_name, format!("request to {url} failed: {e}")))?;

    if !resp.status().is_success() {
        let status = resp.status().as_u16();
        let body = resp.text().await.unwrap_or_default();
        return Err(FeedError::Status {
            source_name: source_name.to_string(),
            status,
            body,
        });
    }

    let bytes = resp
        .bytes()
        .await
        .map_err(|e| FeedError::fetch(source_name, format!("failed to read body: {e}")))?;

    debug!(source = source_name, bytes = bytes.len(), "Feed downloaded");
    Ok(bytes.to_vec())
}
