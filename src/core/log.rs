// Logging: tracing diagnostics plus the append-only progress log
use anyhow::{Context, Result};
use chrono::Local;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{
    EnvFilter, filter::Targets, fmt, prelude::__tracing_subscriber_SubscriberExt,
    util::SubscriberInitExt,
};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub fn init_logging(verbose: bool) {
    let (level_filter, level) = if verbose {
        (LevelFilter::DEBUG, "debug")
    } else {
        (LevelFilter::OFF, "off")
    };
    let app_filter = Targets::new().with_target("bank_etl", level_filter);
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer().pretty().without_time())
        .with(app_filter)
        .with(env_filter)
        .init();
}

/// Milestone log for one pipeline run.
///
/// Each call to [`ProgressLog::log`] appends `<timestamp> : <message>` to the
/// file. The handle is created by whoever starts the run and handed to the
/// pipeline.
#[derive(Debug, Clone)]
pub struct ProgressLog {
    path: PathBuf,
}

impl ProgressLog {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create log directory: {}", parent.display()))?;
        }
        Ok(ProgressLog { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn log(&self, message: &str) -> Result<()> {
        info!("{message}");
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("Failed to open progress log: {}", self.path.display()))?;
        writeln!(file, "{} : {}", Local::now().format(TIMESTAMP_FORMAT), message)
            .with_context(|| format!("Failed to write progress log: {}", self.path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;
    use tempfile::TempDir;

    #[test]
    fn test_progress_log_appends_timestamped_lines() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("logs").join("code_log.txt");

        let progress = ProgressLog::open(&path)?;
        progress.log("Data extraction complete")?;
        progress.log("Data transformation complete")?;

        // A second handle on the same file keeps appending
        ProgressLog::open(&path)?.log("Data saved to CSV")?;

        let content = fs::read_to_string(&path)?;
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines.len(), 3);

        let (stamp, message) = lines[0].split_once(" : ").unwrap();
        assert!(NaiveDateTime::parse_from_str(stamp, TIMESTAMP_FORMAT).is_ok());
        assert_eq!(message, "Data extraction complete");
        assert!(lines[2].ends_with(" : Data saved to CSV"));
        Ok(())
    }
}
