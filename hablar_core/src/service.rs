//! The lesson service seam.
//!
//! [`LessonService`] mirrors the remote lesson API (lessons, exercises,
//! progress, stats). [`LocalLessonService`] implements it over a catalog
//! and the on-disk progress log. [`Snapshot`] is what the front-end
//! works from: every fetch is independent and falls back to defaults.

use crate::achievements;
use crate::gate::{progress_map, ProgressGate};
use crate::history::{latest_per_lesson, load_history};
use crate::stats::derive_stats;
use crate::wal::{JsonlSink, ProgressSink};
use crate::{Achievement, Catalog, Error, Exercise, Lesson, Result, UserProgress, UserStats};
use chrono::{NaiveDate, Utc};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

/// Operations offered by the lesson service
pub trait LessonService {
    /// All lessons, in display order
    fn lessons(&self) -> Result<Vec<Lesson>>;

    /// Exercises for a lesson, in presentation order
    fn exercises(&self, lesson_id: &str) -> Result<Vec<Exercise>>;

    /// Latest progress record per lesson
    fn user_progress(&self) -> Result<Vec<UserProgress>>;

    /// Every recorded attempt, oldest first
    ///
    /// Services that only keep the latest record per lesson can rely on
    /// the default.
    fn progress_history(&self) -> Result<Vec<UserProgress>> {
        self.user_progress()
    }

    /// Aggregate stats
    fn user_stats(&self) -> Result<UserStats>;

    /// Record a lesson attempt
    fn save_progress(&mut self, progress: &UserProgress) -> Result<()>;
}

/// File layout under the data directory
#[derive(Clone, Debug)]
pub struct DataPaths {
    pub wal_dir: PathBuf,
    pub wal: PathBuf,
    pub csv: PathBuf,
}

impl DataPaths {
    pub fn new(data_dir: &Path) -> Self {
        let wal_dir = data_dir.join("wal");
        Self {
            wal: wal_dir.join("progress.wal"),
            csv: data_dir.join("progress.csv"),
            wal_dir,
        }
    }
}

/// Lesson service backed by a catalog and the local progress log
pub struct LocalLessonService {
    catalog: Catalog,
    paths: DataPaths,
    today: Option<NaiveDate>,
}

impl LocalLessonService {
    pub fn new(catalog: Catalog, data_dir: &Path) -> Self {
        Self {
            catalog,
            paths: DataPaths::new(data_dir),
            today: None,
        }
    }

    /// Pin the day streaks are measured against (defaults to today, UTC)
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn paths(&self) -> &DataPaths {
        &self.paths
    }

    fn history(&self) -> Result<Vec<UserProgress>> {
        load_history(&self.paths.wal, &self.paths.csv)
    }
}

impl LessonService for LocalLessonService {
    fn lessons(&self) -> Result<Vec<Lesson>> {
        // The course itself stays available when the progress log is unreadable
        let history = self.history().unwrap_or_else(|e| {
            tracing::warn!(
                "Failed to read progress history: {}. Lessons shown as new.",
                e
            );
            Vec::new()
        });
        let completed: HashSet<&str> = history
            .iter()
            .filter(|r| r.completed)
            .map(|r| r.lesson_id.as_str())
            .collect();

        Ok(self
            .catalog
            .lessons
            .iter()
            .map(|lesson| Lesson {
                completed: lesson.completed || completed.contains(lesson.id.as_str()),
                ..lesson.clone()
            })
            .collect())
    }

    fn exercises(&self, lesson_id: &str) -> Result<Vec<Exercise>> {
        if self.catalog.lesson(lesson_id).is_none() {
            return Err(Error::UnknownLesson(lesson_id.to_string()));
        }
        Ok(self.catalog.exercises_for(lesson_id))
    }

    fn user_progress(&self) -> Result<Vec<UserProgress>> {
        Ok(latest_per_lesson(&self.history()?))
    }

    fn progress_history(&self) -> Result<Vec<UserProgress>> {
        self.history()
    }

    fn user_stats(&self) -> Result<UserStats> {
        let today = self.today.unwrap_or_else(|| Utc::now().date_naive());
        Ok(derive_stats(&self.history()?, today))
    }

    fn save_progress(&mut self, progress: &UserProgress) -> Result<()> {
        if self.catalog.lesson(&progress.lesson_id).is_none() {
            return Err(Error::UnknownLesson(progress.lesson_id.clone()));
        }

        let stored = JsonlSink::new(&self.paths.wal).append(progress)?;
        tracing::info!(
            "Saved progress for lesson {} (score {})",
            stored.lesson_id,
            stored.score
        );
        Ok(())
    }
}

/// Everything the front-end needs, loaded once per screen
///
/// Each part is fetched independently; a failed fetch is logged and
/// replaced by its default so callers always get usable values.
#[derive(Clone, Debug, Default)]
pub struct Snapshot {
    pub lessons: Vec<Lesson>,
    pub progress: Vec<UserProgress>,
    pub history: Vec<UserProgress>,
    pub stats: UserStats,
}

impl Snapshot {
    pub fn load<S: LessonService + ?Sized>(service: &S) -> Self {
        let lessons = service.lessons().unwrap_or_else(|e| {
            tracing::warn!("Failed to load lessons: {}. Using empty list.", e);
            Vec::new()
        });
        let progress = service.user_progress().unwrap_or_else(|e| {
            tracing::warn!("Failed to load progress: {}. Using empty list.", e);
            Vec::new()
        });
        let history = service.progress_history().unwrap_or_else(|e| {
            tracing::warn!(
                "Failed to load progress history: {}. Using latest records.",
                e
            );
            progress.clone()
        });
        let stats = service.user_stats().unwrap_or_else(|e| {
            tracing::warn!("Failed to load stats: {}. Using defaults.", e);
            UserStats::default()
        });

        Self {
            lessons,
            progress,
            history,
            stats,
        }
    }

    /// lessonId -> completed exercises, for the gate
    pub fn progress_map(&self) -> HashMap<String, u32> {
        progress_map(&self.progress)
    }

    /// Dashboard achievements
    ///
    /// Judged against every attempt, so a weaker replay never takes a
    /// badge back.
    pub fn achievements(&self) -> Vec<Achievement> {
        achievements::evaluate(&self.stats, &self.history, self.lessons.len() as u32)
    }

    pub fn lesson(&self, lesson_id: &str) -> Option<&Lesson> {
        self.lessons.iter().find(|l| l.id == lesson_id)
    }

    /// Check a lesson exists and its level gate is open
    pub fn ensure_enterable(&self, lesson_id: &str) -> Result<&Lesson> {
        let lesson = self
            .lesson(lesson_id)
            .ok_or_else(|| Error::UnknownLesson(lesson_id.to_string()))?;

        let progress = self.progress_map();
        let gate = ProgressGate::new(&self.lessons, &progress);
        if !gate.can_enter(&lesson.id, lesson.level) {
            return Err(Error::LessonLocked(lesson_id.to_string()));
        }
        Ok(lesson)
    }
}
