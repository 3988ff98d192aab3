//! One end-to-end ETL run: extract, transform, load

use crate::core::config::{AppConfig, OutputConfig};
use crate::core::{DocumentSource, EnrichedEntity, ProgressLog, RateTable};
use crate::extract::{self, CellPolicy, Extraction};
use crate::load::{SqliteSink, quote_table_name, write_csv};
use crate::transform;
use anyhow::Result;
use std::path::Path;
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub struct RunOutcome {
    pub entities: Vec<EnrichedEntity>,
    pub dropped: usize,
    pub loaded: u64,
}

/// Runs the stages in order and records each milestone in the progress log.
///
/// Any error aborts the run; later stages are not attempted.
pub struct Pipeline<'a> {
    progress: &'a ProgressLog,
    policy: CellPolicy,
}

impl<'a> Pipeline<'a> {
    pub fn new(progress: &'a ProgressLog, policy: CellPolicy) -> Self {
        Pipeline { progress, policy }
    }

    pub fn from_config(progress: &'a ProgressLog, config: &AppConfig) -> Self {
        let policy = if config.strict {
            CellPolicy::Strict
        } else {
            CellPolicy::Lenient
        };
        Self::new(progress, policy)
    }

    pub async fn extract(&self, source: &dyn DocumentSource) -> Result<Extraction> {
        debug!(source = %source.describe(), "Fetching document");
        let document = source.fetch_document().await?;
        let extraction = extract::extract(&document, self.policy)?;
        if !extraction.dropped.is_empty() {
            self.progress.log(&format!(
                "Dropped {} rows with a non-numeric market cap",
                extraction.dropped.len()
            ))?;
        }
        self.progress.log("Data extraction complete")?;
        Ok(extraction)
    }

    pub fn transform(
        &self,
        extraction: &Extraction,
        rates: &RateTable,
    ) -> Result<Vec<EnrichedEntity>> {
        let enriched = transform::convert(&extraction.entities, rates)?;
        self.progress.log("Data transformation complete")?;
        Ok(enriched)
    }

    pub async fn load(&self, entities: &[EnrichedEntity], output: &OutputConfig) -> Result<u64> {
        write_csv(entities, &output.csv)?;
        self.progress.log("Data saved to CSV")?;

        let sink = SqliteSink::open(&output.database).await?;
        let loaded = sink.replace_table(&output.table, entities).await;
        sink.close().await;
        let loaded = loaded?;
        self.progress.log("Data loaded to SQLite DB")?;
        Ok(loaded)
    }

    pub async fn run(
        &self,
        source: &dyn DocumentSource,
        exchange_rates: &Path,
        output: &OutputConfig,
    ) -> Result<RunOutcome> {
        quote_table_name(&output.table)?;
        self.progress.log("Preliminaries complete. Initiating ETL process")?;

        let extraction = self.extract(source).await?;
        let rates = RateTable::load(exchange_rates)?;
        let entities = self.transform(&extraction, &rates)?;
        let loaded = self.load(&entities, output).await?;

        self.progress.log("ETL process completed")?;
        Ok(RunOutcome {
            entities,
            dropped: extraction.dropped.len(),
            loaded,
        })
    }
}
