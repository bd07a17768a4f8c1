use super::fan_out::{SkippedUser, gather_per_user};
use super::insights::rounded_hours;
use crate::error::Result;
use crate::metrics::{LearningAnalytics, Period, compute_learning_analytics, compute_total_time};
use crate::model::Role;
use crate::store::EventStore;
use chrono::{DateTime, Utc};
use log::info;
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

pub const TOP_PERFORMERS: usize = 3;

/// Column a teacher sorts the class table by, always descending
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassSortKey {
    Streak,
    Sessions,
    Time,
    Topics,
}

impl ClassSortKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClassSortKey::Streak => "streak",
            ClassSortKey::Sessions => "sessions",
            ClassSortKey::Time => "time",
            ClassSortKey::Topics => "topics",
        }
    }
}

impl fmt::Display for ClassSortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClassSortKey {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "streak" => Ok(ClassSortKey::Streak),
            "sessions" => Ok(ClassSortKey::Sessions),
            "time" => Ok(ClassSortKey::Time),
            "topics" => Ok(ClassSortKey::Topics),
            other => Err(format!(
                "unknown sort key '{other}', expected streak, sessions, time or topics"
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentProgressRow {
    pub user_id: String,
    pub display_name: String,
    pub email: String,
    /// Minutes inside the requested period
    pub period_time: u64,
    pub topics_learned: Vec<String>,
    pub analytics: LearningAnalytics,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassStats {
    pub total_students: usize,
    pub active_students: usize,
    pub total_sessions: u64,
    /// Rounded to whole hours
    pub total_hours: u64,
    /// Rounded to one decimal
    pub average_streak: f64,
    /// Distinct topics across the whole class
    pub total_topics: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassOverview {
    pub period: Period,
    pub sort_key: ClassSortKey,
    /// Sorted by `sort_key`
    pub students: Vec<StudentProgressRow>,
    /// `None` when the class has no students
    pub stats: Option<ClassStats>,
    pub skipped: Vec<SkippedUser>,
}

impl ClassOverview {
    pub fn top_performers(&self) -> &[StudentProgressRow] {
        &self.students[..self.students.len().min(TOP_PERFORMERS)]
    }
}

fn sort_value(row: &StudentProgressRow, key: ClassSortKey) -> u64 {
    match key {
        ClassSortKey::Streak => u64::from(row.analytics.learning_streak),
        ClassSortKey::Sessions => u64::from(row.analytics.total_sessions),
        ClassSortKey::Time => row.period_time,
        ClassSortKey::Topics => row.topics_learned.len() as u64,
    }
}

pub fn sort_students(rows: &mut [StudentProgressRow], key: ClassSortKey) {
    rows.sort_by(|a, b| sort_value(b, key).cmp(&sort_value(a, key)));
}

pub fn compute_class_stats(rows: &[StudentProgressRow]) -> Option<ClassStats> {
    if rows.is_empty() {
        return None;
    }

    let total_sessions = rows.iter().map(|r| u64::from(r.analytics.total_sessions)).sum();
    let total_time: u64 = rows.iter().map(|r| r.period_time).sum();
    let streak_sum: u64 = rows.iter().map(|r| u64::from(r.analytics.learning_streak)).sum();
    let average_streak = (streak_sum as f64 / rows.len() as f64 * 10.0).round() / 10.0;
    let total_topics = rows
        .iter()
        .flat_map(|r| r.topics_learned.iter())
        .collect::<HashSet<_>>()
        .len();

    Some(ClassStats {
        total_students: rows.len(),
        active_students: rows.iter().filter(|r| r.analytics.total_sessions > 0).count(),
        total_sessions,
        total_hours: rounded_hours(total_time),
        average_streak,
        total_topics,
    })
}

/// Teacher view over every student in the roster
pub fn build_class_overview<S>(
    store: &S,
    period: Period,
    sort_key: ClassSortKey,
    now: DateTime<Utc>,
    max_concurrency: usize,
) -> Result<ClassOverview>
where
    S: EventStore + ?Sized,
{
    let students = store.fetch_users_by_role(Role::Student)?;

    let gathered = gather_per_user(&students, max_concurrency, |user| {
        let progress = store.fetch_learning_progress(&user.user_id)?;
        Ok(Some(StudentProgressRow {
            user_id: user.user_id.clone(),
            display_name: user.display_name.clone(),
            email: user.email.clone(),
            period_time: compute_total_time(&progress.session_history, period, now),
            analytics: compute_learning_analytics(&progress, now),
            topics_learned: progress.topics_learned,
        }))
    })?;

    let mut rows = gathered.values;
    sort_students(&mut rows, sort_key);
    let stats = compute_class_stats(&rows);
    info!("Class overview: {} students, {} skipped", rows.len(), gathered.skipped.len());

    Ok(ClassOverview {
        period,
        sort_key,
        students: rows,
        stats,
        skipped: gathered.skipped,
    })
}
