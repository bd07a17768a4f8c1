use super::insights::{Insight, build_insights};
use crate::error::Result;
use crate::metrics::{
    LearningAnalytics, Period, TopicCount, compute_learning_analytics, compute_learning_streak,
    compute_top_topics, compute_total_time,
};
use crate::store::EventStore;
use chrono::{DateTime, Utc};
use serde::Serialize;

pub const DASHBOARD_TOP_TOPICS: usize = 5;

/// Everything the per-student analytics screen shows
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentDashboard {
    pub user_id: String,
    pub period: Period,
    pub learning_streak: u32,
    /// Minutes inside `period`
    pub total_time: u64,
    pub total_sessions: u32,
    pub topics_learned: usize,
    pub top_topics: Vec<TopicCount>,
    pub insights: Vec<Insight>,
    pub analytics: LearningAnalytics,
    /// False for a student who never finished a session
    pub has_data: bool,
}

pub fn build_dashboard<S>(store: &S, user_id: &str, period: Period, now: DateTime<Utc>) -> Result<StudentDashboard>
where
    S: EventStore + ?Sized,
{
    let progress = store.fetch_learning_progress(user_id)?;
    let history = &progress.session_history;

    let today = now.date_naive();
    let total_time = compute_total_time(history, period, now);
    let top_topics = compute_top_topics(history, DASHBOARD_TOP_TOPICS);
    let insights = build_insights(&progress, today, total_time, period, &top_topics);

    Ok(StudentDashboard {
        user_id: progress.user_id.clone(),
        period,
        learning_streak: compute_learning_streak(&progress, today),
        total_time,
        total_sessions: progress.total_sessions,
        topics_learned: progress.topics_learned.len(),
        analytics: compute_learning_analytics(&progress, now),
        has_data: progress.total_sessions > 0,
        top_topics,
        insights,
    })
}
