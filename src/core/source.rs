//! Where the raw page markup comes from

use anyhow::Result;
use async_trait::async_trait;

#[async_trait]
pub trait DocumentSource: Send + Sync {
    /// Human readable origin, used in log lines.
    fn describe(&self) -> String;

    async fn fetch_document(&self) -> Result<String>;
}
