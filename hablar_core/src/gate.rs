//! Lesson unlock gating.
//!
//! A lesson of level N opens once every lesson of a lower level is
//! complete, either flagged `completed` by the service or with enough
//! exercises done. Level 1 is always open. Order within a level does not
//! matter, only the level partition.

use crate::{Lesson, UserProgress};
use std::collections::HashMap;

/// Build the lessonId -> completed exercises map from progress records
///
/// Later records override earlier ones for the same lesson.
pub fn progress_map(records: &[UserProgress]) -> HashMap<String, u32> {
    let mut map = HashMap::new();
    for record in records {
        map.insert(record.lesson_id.clone(), record.completed_exercises);
    }
    map
}

/// Unlock rules over a snapshot of lessons and per-lesson progress
#[derive(Clone, Copy, Debug)]
pub struct ProgressGate<'a> {
    lessons: &'a [Lesson],
    progress: &'a HashMap<String, u32>,
}

impl<'a> ProgressGate<'a> {
    pub fn new(lessons: &'a [Lesson], progress: &'a HashMap<String, u32>) -> Self {
        Self { lessons, progress }
    }

    /// Exercises completed for a lesson; missing entries count as zero
    pub fn completed_exercises(&self, lesson_id: &str) -> u32 {
        self.progress.get(lesson_id).copied().unwrap_or(0)
    }

    /// Whether a lesson counts as done for gating purposes
    pub fn is_lesson_complete(&self, lesson: &Lesson) -> bool {
        lesson.completed || self.completed_exercises(&lesson.id) >= lesson.total_exercises
    }

    /// Whether lessons of `level` are still locked
    ///
    /// When no lesson sits below `level` the gate is open.
    pub fn is_locked(&self, level: u32) -> bool {
        if level <= 1 {
            return false;
        }

        let blocking = self
            .lessons
            .iter()
            .filter(|l| l.level < level)
            .find(|l| !self.is_lesson_complete(l));

        if let Some(lesson) = blocking {
            tracing::debug!(
                "Level {} locked: lesson {} at {}/{}",
                level,
                lesson.id,
                self.completed_exercises(&lesson.id),
                lesson.total_exercises
            );
            return true;
        }

        false
    }

    /// Whether the learner may start the given lesson
    pub fn can_enter(&self, lesson_id: &str, level: u32) -> bool {
        let open = level == 1 || !self.is_locked(level);
        if !open {
            tracing::debug!("Refusing entry to lesson {} (level {})", lesson_id, level);
        }
        open
    }

    /// Progress bar fill for a lesson, 0..=100
    ///
    /// A lesson without exercises reports 100.
    pub fn completion_percent(&self, lesson: &Lesson) -> f64 {
        if lesson.total_exercises == 0 {
            return 100.0;
        }
        let done = self.completed_exercises(&lesson.id) as f64;
        (done / lesson.total_exercises as f64 * 100.0).min(100.0)
    }
}
