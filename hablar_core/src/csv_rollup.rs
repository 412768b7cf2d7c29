//! CSV rollup for archiving the progress WAL.
//!
//! Moves progress records out of the JSONL log into an append-only CSV
//! archive, renaming the WAL only after the CSV is on disk.

use crate::{Result, UserProgress};
use std::fs::OpenOptions;
use std::path::Path;

/// A row in the CSV archive
#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub(crate) struct CsvRow {
    pub id: String,
    pub lesson_id: String,
    pub completed: bool,
    pub score: u32,
    pub completed_exercises: u32,
    pub total_exercises: u32,
    pub last_accessed: String,
}

impl From<&UserProgress> for CsvRow {
    fn from(progress: &UserProgress) -> Self {
        CsvRow {
            id: progress.id.clone().unwrap_or_default(),
            lesson_id: progress.lesson_id.clone(),
            completed: progress.completed,
            score: progress.score,
            completed_exercises: progress.completed_exercises,
            total_exercises: progress.total_exercises,
            last_accessed: progress.last_accessed.to_rfc3339(),
        }
    }
}

/// Move every record in the progress log into the CSV archive
///
/// The archive is synced before the log is renamed to `.wal.processed`,
/// so a crash in between leaves the records in both files; history
/// loading drops the duplicates by id. Returns the number of records moved.
pub fn wal_to_csv_and_archive(wal_path: &Path, csv_path: &Path) -> Result<usize> {
    let records = crate::wal::read_records(wal_path)?;
    if records.is_empty() {
        tracing::info!("No progress records in WAL to roll up");
        return Ok(0);
    }

    append_to_archive(csv_path, &records)?;

    let processed_path = wal_path.with_extension("wal.processed");
    std::fs::rename(wal_path, &processed_path)?;
    tracing::info!(
        "Archived {} progress records, WAL moved to {:?}",
        records.len(),
        processed_path
    );

    Ok(records.len())
}

/// Append records to the archive, writing the header row for a new file
fn append_to_archive(csv_path: &Path, records: &[UserProgress]) -> Result<()> {
    if let Some(parent) = csv_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(csv_path)?;
    let is_new = file.metadata()?.len() == 0;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(is_new)
        .from_writer(file);
    for record in records {
        writer.serialize(CsvRow::from(record))?;
    }
    writer.flush()?;

    writer
        .into_inner()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?
        .sync_all()?;

    tracing::debug!("Appended {} rows to {:?}", records.len(), csv_path);
    Ok(())
}

/// Delete archived logs (`*.processed`) left behind by earlier rollups
pub fn cleanup_processed_wals(dir: &Path) -> Result<usize> {
    if !dir.exists() {
        return Ok(0);
    }

    let mut removed = 0;
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().is_some_and(|ext| ext == "processed") {
            std::fs::remove_file(&path)?;
            tracing::debug!("Removed {:?}", path);
            removed += 1;
        }
    }

    if removed > 0 {
        tracing::info!("Removed {} processed WAL files", removed);
    }
    Ok(removed)
}
