use super::streak::compute_learning_streak;
use super::topics::{TopicStat, compute_topic_stats};
use crate::model::LearningProgress;
use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use serde::Serialize;

pub const ANALYTICS_TOP_TOPICS: usize = 10;
pub const WEEKS_TRACKED: i64 = 8;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyProgress {
    /// Sunday that starts the week
    pub week: NaiveDate,
    pub sessions: u32,
    pub time: u64,
}

/// Per-student analytics over the (capped) session history
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningAnalytics {
    pub total_sessions: u32,
    pub total_time: u64,
    pub average_session_length: f64,
    pub learning_streak: u32,
    pub top_topics: Vec<TopicStat>,
    /// Oldest week first
    pub weekly_progress: Vec<WeeklyProgress>,
    /// Sessions per week since the oldest session in history
    pub learning_velocity: f64,
    /// 0-100, reaches 100 at a 7-day streak
    pub consistency_score: f64,
}

fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_sunday()))
}

pub fn compute_learning_analytics(progress: &LearningProgress, now: DateTime<Utc>) -> LearningAnalytics {
    let history = &progress.session_history;
    let total_sessions = u32::try_from(history.len()).unwrap_or(u32::MAX);
    let total_time: u64 = history.iter().map(|s| u64::from(s.duration)).sum();
    let average_session_length = if history.is_empty() {
        0.0
    } else {
        total_time as f64 / history.len() as f64
    };

    let learning_streak = compute_learning_streak(progress, now.date_naive());

    let current_week = week_start(now.date_naive());
    let mut weekly_progress: Vec<WeeklyProgress> = (0..WEEKS_TRACKED)
        .rev()
        .map(|weeks_back| WeeklyProgress {
            week: current_week - Duration::weeks(weeks_back),
            sessions: 0,
            time: 0,
        })
        .collect();
    for session in history {
        let week = week_start(session.date.date_naive());
        if let Some(bucket) = weekly_progress.iter_mut().find(|b| b.week == week) {
            bucket.sessions += 1;
            bucket.time += u64::from(session.duration);
        }
    }

    let learning_velocity = history
        .iter()
        .map(|s| s.date)
        .min()
        .map(|oldest| {
            let weeks = ((now - oldest).num_days() / 7).max(1);
            f64::from(total_sessions) / weeks as f64
        })
        .unwrap_or(0.0);

    let consistency_score = (f64::from(learning_streak) / 7.0 * 100.0).min(100.0);

    LearningAnalytics {
        total_sessions,
        total_time,
        average_session_length,
        learning_streak,
        top_topics: compute_topic_stats(history, ANALYTICS_TOP_TOPICS),
        weekly_progress,
        learning_velocity,
        consistency_score,
    }
}
