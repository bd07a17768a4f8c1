use crate::metrics::{Period, TopicCount, compute_learning_streak};
use crate::model::LearningProgress;
use chrono::NaiveDate;
use serde::Serialize;

pub const STREAK_INSIGHT_DAYS: u32 = 7;
pub const TIME_INSIGHT_MINUTES: u64 = 300;
pub const TOPIC_INSIGHT_COUNT: usize = 3;

/// Presentation severity of an insight. `Warning` is what the diversity rule
/// has always been tagged with; it is not an alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightKind {
    Success,
    Info,
    Warning,
}

impl InsightKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            InsightKind::Success => "success",
            InsightKind::Info => "info",
            InsightKind::Warning => "warning",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Insight {
    #[serde(rename = "type")]
    pub kind: InsightKind,
    pub icon: &'static str,
    pub title: &'static str,
    pub description: String,
}

/// Rule-based observations for a student's dashboard, using the calendar
/// learning streak as of `today`
pub fn build_insights(
    progress: &LearningProgress,
    today: NaiveDate,
    total_time: u64,
    period: Period,
    top_topics: &[TopicCount],
) -> Vec<Insight> {
    insights_for(compute_learning_streak(progress, today), total_time, period, top_topics)
}

/// Each rule is checked on its own; an empty list is a valid answer.
pub fn insights_for(
    learning_streak: u32,
    total_time: u64,
    period: Period,
    top_topics: &[TopicCount],
) -> Vec<Insight> {
    let mut insights = Vec::new();

    if learning_streak >= STREAK_INSIGHT_DAYS {
        insights.push(Insight {
            kind: InsightKind::Success,
            icon: "🔥",
            title: "Amazing Consistency!",
            description: format!("You've maintained a {learning_streak}-day learning streak!"),
        });
    }

    if total_time >= TIME_INSIGHT_MINUTES {
        insights.push(Insight {
            kind: InsightKind::Info,
            icon: "⏰",
            title: "Dedicated Learner",
            description: format!(
                "You've spent {} hours learning {}!",
                rounded_hours(total_time),
                period.label()
            ),
        });
    }

    if top_topics.len() >= TOPIC_INSIGHT_COUNT {
        insights.push(Insight {
            kind: InsightKind::Warning,
            icon: "📚",
            title: "Well-Rounded Student",
            description: format!("You've explored {} different topics!", top_topics.len()),
        });
    }

    insights
}

/// Minutes to hours, half up
pub fn rounded_hours(minutes: u64) -> u64 {
    (minutes + 30) / 60
}
