//! Write-Ahead Log (WAL) for progress records.
//!
//! Progress records are appended to a JSONL (JSON Lines) file with file
//! locking so several `hablar` processes can record lessons at once.

use crate::{Result, UserProgress};
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Sink trait for persisting progress records
pub trait ProgressSink {
    /// Append a record, returning it with its assigned id
    fn append(&mut self, progress: &UserProgress) -> Result<UserProgress>;
}

/// JSONL-based progress sink with file locking
pub struct JsonlSink {
    path: PathBuf,
}

impl JsonlSink {
    /// Create a new JSONL sink for the given path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Ensure the parent directory exists
    fn ensure_parent_dir(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(())
    }
}

impl ProgressSink for JsonlSink {
    fn append(&mut self, progress: &UserProgress) -> Result<UserProgress> {
        progress.validate()?;
        self.ensure_parent_dir()?;

        let mut record = progress.clone();
        if record.id.is_none() {
            record.id = Some(Uuid::new_v4().to_string());
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        file.lock_exclusive()?;

        let mut writer = std::io::BufWriter::new(&file);
        let line = serde_json::to_string(&record)?;
        writer.write_all(line.as_bytes())?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        drop(writer);

        file.unlock()?;

        tracing::debug!(
            "Appended progress {} for lesson {} to WAL",
            record.id.as_deref().unwrap_or("-"),
            record.lesson_id
        );
        Ok(record)
    }
}

/// Read all progress records from a WAL file
///
/// Unparseable lines (including invalid UTF-8) and records breaking the
/// progress invariant are skipped with a warning.
pub fn read_records(path: &Path) -> Result<Vec<UserProgress>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let file = File::open(path)?;
    file.lock_shared()?;

    let mut reader = BufReader::new(&file);
    let mut records = Vec::new();
    let mut line = Vec::new();
    let mut line_num = 0;

    // Lines are parsed as bytes so one mangled line can't fail the read
    loop {
        line.clear();
        if reader.read_until(b'\n', &mut line)? == 0 {
            break;
        }
        line_num += 1;
        if line.iter().all(u8::is_ascii_whitespace) {
            continue;
        }

        match serde_json::from_slice::<UserProgress>(&line) {
            Ok(record) => match record.validate() {
                Ok(()) => records.push(record),
                Err(e) => tracing::warn!("Skipping WAL line {}: {}", line_num, e),
            },
            Err(e) => {
                tracing::warn!("Failed to parse progress at line {}: {}", line_num, e);
            }
        }
    }

    file.unlock()?;
    tracing::debug!("Read {} progress records from WAL", records.len());
    Ok(records)
}
