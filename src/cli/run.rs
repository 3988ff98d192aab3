use super::ui;
use crate::core::ProgressLog;
use crate::core::config::{AppConfig, SourceConfig};
use crate::load::{SqliteSink, TableSample};
use crate::pipeline::{Pipeline, RunOutcome};
use crate::sources;
use anyhow::Result;
use comfy_table::Cell;

/// Runs the pipeline and prints where the data went plus a preview of the table.
pub async fn run(mut config: AppConfig, source: Option<SourceConfig>, preview: u32) -> Result<()> {
    if let Some(source) = source {
        config.source = source;
    }
    config.ensure_dirs()?;

    let progress = ProgressLog::open(&config.log_file)?;
    let document_source = sources::from_config(&config)?;
    let pipeline = Pipeline::from_config(&progress, &config);

    let spinner = ui::new_spinner(&format!("Running ETL from {}", document_source.describe()));
    let outcome = pipeline
        .run(
            document_source.as_ref(),
            &config.exchange_rates,
            &config.output,
        )
        .await;
    spinner.finish_and_clear();
    let outcome = outcome?;

    let samples = if preview > 0 {
        let sink = SqliteSink::open(&config.output.database).await?;
        let samples = sink.sample(&config.output.table, preview).await;
        sink.close().await;
        samples?
    } else {
        Vec::new()
    };

    println!("{}", display_outcome(&outcome, &config));
    if !samples.is_empty() {
        println!("\n{}", display_samples(&config.output.table, &samples));
    }
    Ok(())
}

pub fn display_outcome(outcome: &RunOutcome, config: &AppConfig) -> String {
    let mut output = format!(
        "{}: {}\n",
        ui::style_text("Rows loaded", ui::StyleType::TotalLabel),
        ui::style_text(&outcome.loaded.to_string(), ui::StyleType::TotalValue)
    );
    if outcome.dropped > 0 {
        output.push_str(&ui::style_text(
            &format!("Dropped {} rows with a non-numeric market cap\n", outcome.dropped),
            ui::StyleType::Warning,
        ));
    }
    output.push_str(&ui::style_text(
        &format!(
            "Outputs saved to {} and {} (table {})",
            config.output.csv.display(),
            config.output.database.display(),
            config.output.table
        ),
        ui::StyleType::Subtle,
    ));
    output
}

pub fn display_samples(table_name: &str, samples: &[TableSample]) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Name"),
        ui::header_cell("MC_USD_Billion"),
        ui::header_cell("MC_GBP_Billion"),
    ]);
    for sample in samples {
        table.add_row(vec![
            Cell::new(&sample.name),
            ui::amount_cell(sample.mc_usd_billion),
            ui::amount_cell(sample.mc_gbp_billion),
        ]);
    }

    format!(
        "Sample rows from {}\n\n{}",
        ui::style_text(table_name, ui::StyleType::Title),
        table
    )
}
