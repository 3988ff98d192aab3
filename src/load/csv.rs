use crate::core::EnrichedEntity;
use anyhow::{Context, Result};
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::debug;

/// Writes the entities with a header row and no index column.
///
/// The previous file is only replaced once the new one is fully written.
pub fn write_csv<P: AsRef<Path>>(entities: &[EnrichedEntity], path: P) -> Result<()> {
    let path = path.as_ref();
    replace_file(path, |file| write_records(entities, file))
        .with_context(|| format!("Failed to write CSV file: {}", path.display()))?;
    debug!(rows = entities.len(), "Wrote {}", path.display());
    Ok(())
}

/// Writes into a temp file next to `path`, then renames it over `path`.
fn replace_file<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut NamedTempFile) -> Result<()>,
{
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let mut file = NamedTempFile::new_in(dir)
        .with_context(|| format!("Failed to create temp file in {}", dir.display()))?;
    write(&mut file)?;
    file.as_file()
        .sync_all()
        .context("Failed to flush temp file")?;
    file.persist(path)
        .with_context(|| format!("Failed to move temp file to {}", path.display()))?;
    Ok(())
}

fn write_records<W: Write>(entities: &[EnrichedEntity], out: W) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    if entities.is_empty() {
        writer.write_record(EnrichedEntity::COLUMNS)?;
    }
    for entity in entities {
        writer.serialize(entity)?;
    }
    writer.flush()?;
    Ok(())
}
