use anyhow::Result;
use bank_etl::core::config::SourceConfig;
use bank_etl::core::log::init_logging;
use clap::{Args, CommandFactory, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args)]
struct SourceArgs {
    /// Fetch the page from this URL instead of the configured source
    #[arg(long, conflicts_with = "html_file")]
    url: Option<String>,

    /// Read the page from a saved HTML file instead of the configured source
    #[arg(long)]
    html_file: Option<PathBuf>,
}

impl SourceArgs {
    fn into_source(self) -> Option<SourceConfig> {
        match (self.url, self.html_file) {
            (Some(url), _) => Some(SourceConfig::Url { url }),
            (None, Some(html_file)) => Some(SourceConfig::HtmlFile { html_file }),
            (None, None) => None,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Extract, transform and load the bank ranking
    Run {
        #[command(flatten)]
        source: SourceArgs,

        /// Number of rows to print from the loaded table
        #[arg(long, default_value_t = 5)]
        preview: u32,
    },
    /// Print the first rows of the loaded table
    Show {
        #[arg(short, long, default_value_t = 5)]
        limit: u32,
    },
}

impl From<Commands> for bank_etl::AppCommand {
    fn from(cmd: Commands) -> bank_etl::AppCommand {
        match cmd {
            Commands::Run { source, preview } => bank_etl::AppCommand::Run {
                source: source.into_source(),
                preview,
            },
            Commands::Show { limit } => bank_etl::AppCommand::Show { limit },
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => bank_etl::cli::setup::setup(),
        Some(cmd) => bank_etl::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
