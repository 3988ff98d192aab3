use crate::core::DocumentSource;
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, instrument};

pub const USER_AGENT: &str = "banks-etl-bot/1.0 (+https://example.org)";

/// Fetches the page over HTTP. One attempt, bounded by `timeout`.
pub struct HttpSource {
    url: String,
    client: reqwest::Client,
}

impl HttpSource {
    pub fn new(url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;
        Ok(HttpSource {
            url: url.to_string(),
            client,
        })
    }
}

#[async_trait]
impl DocumentSource for HttpSource {
    fn describe(&self) -> String {
        self.url.clone()
    }

    #[instrument(name = "PageFetch", skip(self), fields(url = %self.url))]
    async fn fetch_document(&self) -> Result<String> {
        debug!("Requesting page");
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| anyhow!("Request error: {} for URL: {}", e, self.url))?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "HTTP error: {} for URL: {}",
                response.status(),
                self.url
            ));
        }

        let text = response.text().await?;
        debug!(bytes = text.len(), "Received page");
        Ok(text)
    }
}
