use crate::model::LearningProgress;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use std::collections::HashSet;

/// How far back the calendar scan looks before giving up
pub const STREAK_LOOKBACK_DAYS: i64 = 30;

/// Calculate the number of consecutive UTC calendar days, counting back from
/// `today`, that have at least one session in the user's history.
///
/// A day without a session ends the run, except today itself: a learner who
/// studied yesterday and the day before but not yet today still has a
/// 2-day streak.
pub fn compute_learning_streak(progress: &LearningProgress, today: NaiveDate) -> u32 {
    let active_days: HashSet<NaiveDate> = progress
        .session_history
        .iter()
        .map(|session| session.date.date_naive())
        .collect();

    let mut streak = 0;
    for offset in 0..STREAK_LOOKBACK_DAYS {
        let day = today - Duration::days(offset);
        if active_days.contains(&day) {
            streak += 1;
        } else if offset > 0 {
            break;
        }
    }

    streak
}

/// Next value of the stored `learning_streak` counter when a session dated
/// `session_date` ends.
///
/// First session starts at 1. Relative to the previous session's calendar
/// day: same day keeps the counter, the next day increments it, a longer gap
/// resets to 1. A session older than the previous one leaves it unchanged.
pub fn advance_stored_streak(
    current: u32,
    previous_session: Option<DateTime<Utc>>,
    session_date: DateTime<Utc>,
) -> u32 {
    let Some(previous) = previous_session else {
        return 1;
    };

    let gap = (session_date.date_naive() - previous.date_naive()).num_days();
    match gap {
        1 => current.saturating_add(1),
        g if g > 1 => 1,
        _ => current,
    }
}
