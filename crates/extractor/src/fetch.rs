use crate::error::{ExtractorError, Result};
use async_trait::async_trait;
use std::time::Duration;

/// Retrieves the text of an external stylesheet.
#[async_trait]
pub trait StylesheetFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String>;
}

/// Fetcher backed by a shared reqwest client.
///
/// Only connecting is time-limited; a slow body occupies one discovery slot
/// until the server gives up.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .user_agent(concat!("classmap/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ExtractorError::HttpClient(e.to_string()))?;
        Ok(Self { client })
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl StylesheetFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| ExtractorError::remote_fetch(url, e))?;

        response
            .text()
            .await
            .map_err(|e| ExtractorError::remote_fetch(url, e))
    }
}
