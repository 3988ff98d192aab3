use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::debug;

pub const DEFAULT_TABLE_NAME: &str = "Largest_banks";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum SourceConfig {
    Url { url: String },
    HtmlFile { html_file: PathBuf },
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct OutputConfig {
    pub csv: PathBuf,
    pub database: PathBuf,
    #[serde(default = "default_table_name")]
    pub table: String,
}

fn default_table_name() -> String {
    DEFAULT_TABLE_NAME.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    pub source: SourceConfig,
    pub exchange_rates: PathBuf,
    pub output: OutputConfig,
    pub log_file: PathBuf,
    /// Fail the run on an unparseable market-cap cell instead of dropping the row.
    #[serde(default)]
    pub strict: bool,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("org", "banketl", "bank-etl")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    /// Parses the file and resolves relative paths against its directory.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let config_str = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let mut config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        if let Some(base) = path.parent() {
            config.resolve_paths(base);
        }
        debug!("Successfully loaded config");
        Ok(config)
    }

    pub fn resolve_paths(&mut self, base: &Path) {
        let resolve = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        };
        if let SourceConfig::HtmlFile { html_file } = &mut self.source {
            resolve(html_file);
        }
        resolve(&mut self.exchange_rates);
        resolve(&mut self.output.csv);
        resolve(&mut self.output.database);
        resolve(&mut self.log_file);
    }

    /// Creates the parent directory of every output path.
    pub fn ensure_dirs(&self) -> Result<()> {
        for path in [&self.output.csv, &self.output.database, &self.log_file] {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create directory: {}", parent.display())
                })?;
            }
        }
        Ok(())
    }
}
