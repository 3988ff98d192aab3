pub mod file;
pub mod http;

pub use file::FileSource;
pub use http::HttpSource;

use crate::core::DocumentSource;
use crate::core::config::{AppConfig, SourceConfig};
use anyhow::Result;
use std::time::Duration;

/// Builds the document source described by the configuration.
pub fn from_config(config: &AppConfig) -> Result<Box<dyn DocumentSource>> {
    Ok(match &config.source {
        SourceConfig::Url { url } => Box::new(HttpSource::new(
            url,
            Duration::from_secs(config.timeout_secs),
        )?),
        SourceConfig::HtmlFile { html_file } => Box::new(FileSource::new(html_file)),
    })
}
