//! Aggregate stats derived from progress history.
//!
//! The local lesson service owns these numbers the way a remote service
//! would: best score per lesson, distinct completed lessons, and the
//! current run of consecutive study days.

use crate::{UserProgress, UserStats};
use chrono::{Duration, NaiveDate};
use std::collections::{BTreeSet, HashMap, HashSet};

/// Points needed per level
pub const POINTS_PER_LEVEL: u32 = 100;

/// Derive stats from every progress record on file
///
/// `today` is the calendar day (UTC) the streak is measured against.
pub fn derive_stats(records: &[UserProgress], today: NaiveDate) -> UserStats {
    let mut best_scores: HashMap<&str, u32> = HashMap::new();
    let mut completed: HashSet<&str> = HashSet::new();

    for record in records {
        let best = best_scores.entry(record.lesson_id.as_str()).or_insert(0);
        *best = (*best).max(record.score);

        if record.completed {
            completed.insert(record.lesson_id.as_str());
        }
    }

    let total_score: u32 = best_scores.values().sum();
    let days: BTreeSet<NaiveDate> = records
        .iter()
        .map(|r| r.last_accessed.date_naive())
        .collect();

    let stats = UserStats {
        total_score,
        current_streak: current_streak(&days, today),
        total_lessons_completed: completed.len() as u32,
        level: total_score / POINTS_PER_LEVEL + 1,
    };

    tracing::debug!("Derived stats from {} records: {:?}", records.len(), stats);
    stats
}

/// Count consecutive study days ending today, or yesterday if today has
/// no activity yet
pub fn current_streak(days: &BTreeSet<NaiveDate>, today: NaiveDate) -> u32 {
    let yesterday = today - Duration::days(1);
    let mut cursor = if days.contains(&today) {
        today
    } else if days.contains(&yesterday) {
        yesterday
    } else {
        return 0;
    };

    let mut streak = 0;
    while days.contains(&cursor) {
        streak += 1;
        cursor = cursor - Duration::days(1);
    }
    streak
}
