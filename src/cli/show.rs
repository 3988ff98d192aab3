use super::run::display_samples;
use crate::core::config::AppConfig;
use crate::load::SqliteSink;
use anyhow::{Result, bail};

/// Prints the first `limit` rows of the configured output table.
pub async fn show(config: &AppConfig, limit: u32) -> Result<()> {
    let database = &config.output.database;
    if !database.exists() {
        bail!(
            "Database {} does not exist yet, run the pipeline first",
            database.display()
        );
    }

    let sink = SqliteSink::open(database).await?;
    let samples = sink.sample(&config.output.table, limit).await;
    sink.close().await;

    println!("{}", display_samples(&config.output.table, &samples?));
    Ok(())
}
