pub mod cli;
pub mod core;
pub mod extract;
pub mod load;
pub mod pipeline;
pub mod sources;
pub mod transform;

use crate::core::config::{AppConfig, SourceConfig};
use anyhow::Result;
use tracing::{debug, info};

pub enum AppCommand {
    /// Run the pipeline, optionally overriding the configured source.
    Run {
        source: Option<SourceConfig>,
        preview: u32,
    },
    /// Print the first rows of an existing output table.
    Show { limit: u32 },
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("Bank ETL starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    match command {
        AppCommand::Run { source, preview } => cli::run::run(config, source, preview).await,
        AppCommand::Show { limit } => cli::show::show(&config, limit).await,
    }
}
