//! Answer grading and lesson scoring.
//!
//! Grading rules:
//! - Multiple choice: exact match, options are shown verbatim
//! - Translation / fill-in-blank: accent- and case-insensitive match
//!
//! Every correct answer is worth a fixed number of points, summed in
//! presentation order.

use crate::normalize::compare;
use crate::{Error, Exercise, ExerciseResult, ExerciseType, Result, UserProgress};
use chrono::{DateTime, Utc};

/// Points awarded for each correct answer
pub const POINTS_PER_CORRECT: u32 = 10;

/// Grade a submitted answer against an exercise
pub fn grade(exercise: &Exercise, answer: &str) -> bool {
    match exercise.kind {
        ExerciseType::MultipleChoice => answer == exercise.correct_answer,
        ExerciseType::Translation | ExerciseType::FillInBlank => {
            compare(answer, &exercise.correct_answer)
        }
    }
}

/// Score a batch of answers, pairing them with exercises in order
///
/// Extra answers or exercises beyond the shorter list are ignored.
pub fn score_answers<S: AsRef<str>>(exercises: &[Exercise], answers: &[S]) -> u32 {
    exercises
        .iter()
        .zip(answers)
        .filter(|&(exercise, answer)| grade(exercise, answer.as_ref()))
        .count() as u32
        * POINTS_PER_CORRECT
}

/// An in-progress attempt at a lesson
///
/// Holds the exercises in presentation order and the running score.
/// Finishing produces the progress record to post to the lesson service.
#[derive(Clone, Debug)]
pub struct LessonRun {
    lesson_id: String,
    exercises: Vec<Exercise>,
    index: usize,
    score: u32,
    results: Vec<ExerciseResult>,
}

impl LessonRun {
    pub fn new(lesson_id: impl Into<String>, exercises: Vec<Exercise>) -> Self {
        Self {
            lesson_id: lesson_id.into(),
            exercises,
            index: 0,
            score: 0,
            results: Vec::new(),
        }
    }

    pub fn lesson_id(&self) -> &str {
        &self.lesson_id
    }

    /// The exercise awaiting an answer, if any
    pub fn current(&self) -> Option<&Exercise> {
        self.exercises.get(self.index)
    }

    /// 1-based position of the current exercise and the total count
    pub fn position(&self) -> (usize, usize) {
        ((self.index + 1).min(self.exercises.len()), self.exercises.len())
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn results(&self) -> &[ExerciseResult] {
        &self.results
    }

    pub fn is_finished(&self) -> bool {
        self.index >= self.exercises.len()
    }

    /// Grade an answer for the current exercise and advance
    ///
    /// Blank answers are rejected without advancing.
    pub fn submit(&mut self, answer: &str) -> Result<ExerciseResult> {
        if answer.trim().is_empty() {
            return Err(Error::EmptyAnswer);
        }

        let exercise = self.current().ok_or_else(|| {
            Error::Session(format!("lesson {} has no exercises left", self.lesson_id))
        })?;

        let correct = grade(exercise, answer);
        let result = ExerciseResult {
            exercise_id: exercise.id.clone(),
            correct,
            user_answer: answer.to_string(),
            correct_answer: exercise.correct_answer.clone(),
        };

        if correct {
            self.score += POINTS_PER_CORRECT;
        }

        tracing::debug!(
            "Exercise {} graded {} (score {})",
            result.exercise_id,
            if correct { "correct" } else { "incorrect" },
            self.score
        );

        self.results.push(result.clone());
        self.index += 1;
        Ok(result)
    }

    /// Build the progress record for a finished run
    pub fn finish(&self, now: DateTime<Utc>) -> Result<UserProgress> {
        if self.exercises.is_empty() {
            return Err(Error::Session(format!(
                "lesson {} has no exercises",
                self.lesson_id
            )));
        }
        if !self.is_finished() {
            let (position, total) = self.position();
            return Err(Error::Session(format!(
                "lesson {} not finished ({} of {})",
                self.lesson_id, position, total
            )));
        }

        let total = self.exercises.len() as u32;
        tracing::info!(
            "Finished lesson {} with score {}",
            self.lesson_id,
            self.score
        );

        Ok(UserProgress {
            id: None,
            lesson_id: self.lesson_id.clone(),
            completed: true,
            score: self.score,
            completed_exercises: total,
            total_exercises: total,
            last_accessed: now,
        })
    }
}
