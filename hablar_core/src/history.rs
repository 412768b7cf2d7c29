//! Progress history loading.
//!
//! Combines the live WAL with the CSV archive to give the full record of
//! lessons played.

use crate::csv_rollup::CsvRow;
use crate::{Result, UserProgress};
use chrono::{DateTime, Utc};
use csv::ReaderBuilder;
use std::collections::{HashMap, HashSet};
use std::path::Path;

impl TryFrom<CsvRow> for UserProgress {
    type Error = crate::Error;

    fn try_from(row: CsvRow) -> Result<Self> {
        let last_accessed = DateTime::parse_from_rfc3339(&row.last_accessed)
            .map_err(|e| crate::Error::Other(format!("Invalid date: {}", e)))?
            .with_timezone(&Utc);

        let progress = UserProgress {
            id: (!row.id.is_empty()).then_some(row.id),
            lesson_id: row.lesson_id,
            completed: row.completed,
            score: row.score,
            completed_exercises: row.completed_exercises,
            total_exercises: row.total_exercises,
            last_accessed,
        };
        progress.validate()?;
        Ok(progress)
    }
}

/// Load every progress record from the WAL and the CSV archive
///
/// Returns records sorted by `last_accessed`, oldest first. Records that
/// appear in both files are kept once.
pub fn load_history(wal_path: &Path, csv_path: &Path) -> Result<Vec<UserProgress>> {
    let mut records = Vec::new();
    let mut seen_ids = HashSet::new();

    if wal_path.exists() {
        for record in crate::wal::read_records(wal_path)? {
            if let Some(id) = &record.id {
                seen_ids.insert(id.clone());
            }
            records.push(record);
        }
        tracing::debug!("Loaded {} progress records from WAL", records.len());
    }

    if csv_path.exists() {
        let mut csv_count = 0;
        for record in load_records_from_csv(csv_path)? {
            let duplicate = record
                .id
                .as_ref()
                .is_some_and(|id| !seen_ids.insert(id.clone()));
            if !duplicate {
                records.push(record);
                csv_count += 1;
            }
        }
        tracing::debug!("Loaded {} progress records from CSV", csv_count);
    }

    records.sort_by(|a, b| a.last_accessed.cmp(&b.last_accessed));

    tracing::info!("Loaded {} total progress records", records.len());
    Ok(records)
}

/// Load all records from a CSV archive, skipping bad rows
fn load_records_from_csv(path: &Path) -> Result<Vec<UserProgress>> {
    let mut reader = ReaderBuilder::new().has_headers(true).from_path(path)?;

    let mut records = Vec::new();
    for result in reader.deserialize::<CsvRow>() {
        match result {
            Ok(row) => match UserProgress::try_from(row) {
                Ok(record) => records.push(record),
                Err(e) => tracing::warn!("Failed to parse CSV row: {}", e),
            },
            Err(e) => tracing::warn!("Failed to deserialize CSV row: {}", e),
        }
    }

    Ok(records)
}

/// Keep only the most recent record for each lesson
///
/// Expects records oldest first, as returned by [`load_history`]. The
/// result keeps that order.
pub fn latest_per_lesson(records: &[UserProgress]) -> Vec<UserProgress> {
    let mut latest: HashMap<&str, usize> = HashMap::new();
    for (idx, record) in records.iter().enumerate() {
        latest.insert(record.lesson_id.as_str(), idx);
    }

    let mut indices: Vec<usize> = latest.into_values().collect();
    indices.sort_unstable();
    indices.into_iter().map(|i| records[i].clone()).collect()
}
