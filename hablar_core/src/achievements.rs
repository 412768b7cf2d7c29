//! Achievement evaluation for the dashboard.
//!
//! Achievements are recomputed from the current stats and progress
//! records every time; nothing about them is persisted.

use crate::scoring::POINTS_PER_CORRECT;
use crate::{Achievement, UserProgress, UserStats};

/// Threshold-style achievement definition
struct Milestone {
    id: &'static str,
    title: &'static str,
    description: &'static str,
    icon: &'static str,
    metric: Metric,
    target: u32,
    show_progress: bool,
}

#[derive(Clone, Copy)]
enum Metric {
    LessonsCompleted,
    Streak,
    TotalScore,
}

const LESSON_MILESTONES: &[Milestone] = &[
    Milestone {
        id: "first-lesson",
        title: "Fresh Start",
        description: "Complete your first lesson",
        icon: "🎯",
        metric: Metric::LessonsCompleted,
        target: 1,
        show_progress: false,
    },
    Milestone {
        id: "five-lessons",
        title: "Steady Learner",
        description: "Complete 5 lessons",
        icon: "📚",
        metric: Metric::LessonsCompleted,
        target: 5,
        show_progress: true,
    },
    Milestone {
        id: "ten-lessons",
        title: "Rising Expert",
        description: "Complete 10 lessons",
        icon: "🎓",
        metric: Metric::LessonsCompleted,
        target: 10,
        show_progress: true,
    },
];

const STREAK_AND_SCORE_MILESTONES: &[Milestone] = &[
    Milestone {
        id: "streak-3",
        title: "First Streak",
        description: "Study 3 days in a row",
        icon: "🔥",
        metric: Metric::Streak,
        target: 3,
        show_progress: true,
    },
    Milestone {
        id: "streak-7",
        title: "Perfect Week",
        description: "Study 7 days in a row",
        icon: "⭐",
        metric: Metric::Streak,
        target: 7,
        show_progress: true,
    },
    Milestone {
        id: "streak-30",
        title: "Iron Commitment",
        description: "Study 30 days in a row",
        icon: "💪",
        metric: Metric::Streak,
        target: 30,
        show_progress: true,
    },
    Milestone {
        id: "score-500",
        title: "Point Collector",
        description: "Earn 500 points",
        icon: "💯",
        metric: Metric::TotalScore,
        target: 500,
        show_progress: true,
    },
    Milestone {
        id: "score-1000",
        title: "Score King",
        description: "Earn 1000 points",
        icon: "🏆",
        metric: Metric::TotalScore,
        target: 1000,
        show_progress: true,
    },
];

impl Metric {
    fn value(self, stats: &UserStats) -> u32 {
        match self {
            Metric::LessonsCompleted => stats.total_lessons_completed,
            Metric::Streak => stats.current_streak,
            Metric::TotalScore => stats.total_score,
        }
    }
}

impl Milestone {
    fn evaluate(&self, stats: &UserStats) -> Achievement {
        let value = self.metric.value(stats);
        Achievement {
            id: self.id.into(),
            title: self.title.into(),
            description: self.description.into(),
            icon: self.icon.into(),
            unlocked: value >= self.target,
            progress: self.show_progress.then_some(value),
            target: self.show_progress.then_some(self.target),
        }
    }
}

/// A record where every exercise was answered correctly
fn is_perfect(record: &UserProgress) -> bool {
    record.total_exercises > 0
        && record.completed_exercises == record.total_exercises
        && record.score == record.total_exercises * POINTS_PER_CORRECT
}

/// Evaluate every achievement against the current stats and progress
///
/// `lesson_count` is the size of the course, used by the "complete all
/// lessons" badge. An empty course never unlocks it.
pub fn evaluate(
    stats: &UserStats,
    progress: &[UserProgress],
    lesson_count: u32,
) -> Vec<Achievement> {
    let mut achievements: Vec<Achievement> =
        LESSON_MILESTONES.iter().map(|m| m.evaluate(stats)).collect();

    achievements.push(Achievement {
        id: "all-lessons".into(),
        title: "Spanish Master".into(),
        description: format!("Complete all {} lessons", lesson_count),
        icon: "👑".into(),
        unlocked: lesson_count > 0 && stats.total_lessons_completed >= lesson_count,
        progress: Some(stats.total_lessons_completed),
        target: Some(lesson_count),
    });

    achievements.extend(STREAK_AND_SCORE_MILESTONES.iter().map(|m| m.evaluate(stats)));

    achievements.push(Achievement {
        id: "perfect-score".into(),
        title: "Flawless!".into(),
        description: "Score 100% on a lesson".into(),
        icon: "✨".into(),
        unlocked: progress.iter().any(is_perfect),
        progress: None,
        target: None,
    });

    let unlocked = achievements.iter().filter(|a| a.unlocked).count();
    tracing::debug!(
        "Evaluated {} achievements, {} unlocked",
        achievements.len(),
        unlocked
    );

    achievements
}
