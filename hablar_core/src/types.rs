//! Core domain types for Hablar.
//!
//! This module defines the records exchanged with the lesson service:
//! - Lessons, their vocabulary and exercises
//! - Per-lesson progress records and aggregate stats
//! - Graded exercise results and achievements
//!
//! Field names serialize to the camelCase JSON shapes the lesson service
//! speaks; identifiers travel as `_id`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Lesson Types
// ============================================================================

/// A single vocabulary entry shown on the study page
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct VocabularyItem {
    pub spanish: String,
    #[serde(alias = "hebrew")]
    pub translation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<String>,
}

/// A themed unit of exercises, gated by level
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Lesson {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub level: u32,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub color: String,
    pub total_exercises: u32,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub vocabulary: Vec<VocabularyItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grammar_notes: Option<String>,
}

// ============================================================================
// Exercise Types
// ============================================================================

/// The three exercise variants
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum ExerciseType {
    MultipleChoice,
    Translation,
    FillInBlank,
}

impl ExerciseType {
    pub fn label(&self) -> &'static str {
        match self {
            Self::MultipleChoice => "Multiple choice",
            Self::Translation => "Translate to Spanish",
            Self::FillInBlank => "Fill in the blank",
        }
    }
}

/// One graded question within a lesson
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Exercise {
    #[serde(rename = "_id")]
    pub id: String,
    pub lesson_id: String,
    #[serde(rename = "type")]
    pub kind: ExerciseType,
    pub question: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question_spanish: Option<String>,
    pub correct_answer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

/// Outcome of grading one submission
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseResult {
    pub exercise_id: String,
    pub correct: bool,
    pub user_answer: String,
    pub correct_answer: String,
}

// ============================================================================
// Progress and Stats Types
// ============================================================================

/// Per-lesson progress record, as posted to the lesson service
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserProgress {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub lesson_id: String,
    pub completed: bool,
    pub score: u32,
    pub completed_exercises: u32,
    pub total_exercises: u32,
    pub last_accessed: DateTime<Utc>,
}

impl UserProgress {
    /// Check the `completed_exercises <= total_exercises` invariant
    pub fn validate(&self) -> crate::Result<()> {
        if self.completed_exercises > self.total_exercises {
            return Err(crate::Error::InvalidProgress(format!(
                "lesson '{}': {} completed exercises exceeds total of {}",
                self.lesson_id, self.completed_exercises, self.total_exercises
            )));
        }
        Ok(())
    }
}

/// Aggregate learner stats shown in the header and dashboard
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub total_score: u32,
    pub current_streak: u32,
    pub total_lessons_completed: u32,
    pub level: u32,
}

impl Default for UserStats {
    /// Fallback stats used when the service cannot be reached
    fn default() -> Self {
        Self {
            total_score: 0,
            current_streak: 0,
            total_lessons_completed: 0,
            level: 1,
        }
    }
}

impl UserStats {
    /// Percent progress toward the next level (every 100 points is a level)
    pub fn level_progress(&self) -> u32 {
        self.total_score % 100
    }
}

// ============================================================================
// Achievement Type
// ============================================================================

/// A dashboard badge, unlocked from stats and progress
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Achievement {
    pub id: String,
    pub title: String,
    pub description: String,
    pub icon: String,
    pub unlocked: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<u32>,
}

impl Achievement {
    /// Progress toward the target as a percentage, capped at 100
    pub fn percent(&self) -> Option<u32> {
        match (self.progress, self.target) {
            (Some(progress), Some(target)) if target > 0 => {
                Some(((progress as u64 * 100) / target as u64).min(100) as u32)
            }
            _ => None,
        }
    }
}
