//! Fetching the IP range feed over HTTP.

use super::IpRangeFeed;
use crate::error::{UpdaterError, UpdaterResult};
use async_trait::async_trait;

/// Source of the current IP range feed.
#[async_trait]
pub trait IpRangeSource: Send + Sync {
    async fn fetch(&self) -> UpdaterResult<IpRangeFeed>;
}

/// Unauthenticated GET against the published feed endpoint.
pub struct HttpIpRangeSource {
    client: reqwest::Client,
    url: String,
}

impl HttpIpRangeSource {
    pub fn new(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl IpRangeSource for HttpIpRangeSource {
    async fn fetch(&self) -> UpdaterResult<IpRangeFeed> {
        log::debug!("Fetching IP ranges from {}", self.url);

        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| UpdaterError::Network(format!("GET {}: {e}", self.url)))?;

        let body = response
            .text()
            .await
            .map_err(|e| UpdaterError::Network(format!("reading {}: {e}", self.url)))?;

        let feed: IpRangeFeed =
            serde_json::from_str(&body).map_err(|e| UpdaterError::Parse(e.to_string()))?;

        log::debug!(
            "Loaded {} IPv4 prefixes (syncToken {})",
            feed.prefixes.len(),
            feed.sync_token.as_deref().unwrap_or("<none>")
        );
        Ok(feed)
    }
}
