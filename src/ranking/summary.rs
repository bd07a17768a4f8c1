use super::insights::rounded_hours;
use crate::metrics::{Period, compute_learning_streak, compute_top_topics, count_distinct_topics, filter_sessions};
use crate::model::LearningProgress;
use chrono::{DateTime, Utc};
use std::fmt::Write;

pub const SUMMARY_TOP_TOPICS: usize = 5;
pub const SUMMARY_ACHIEVEMENTS: usize = 3;

pub const NO_PROGRESS_MESSAGE: &str =
    "No learning progress to summarize yet. Start your first session to begin tracking your journey!";

/// Plain-text progress report over the sessions inside `period`
pub fn progress_summary(progress: &LearningProgress, period: Period, now: DateTime<Utc>) -> String {
    if progress.total_sessions == 0 {
        return NO_PROGRESS_MESSAGE.to_string();
    }

    let sessions = filter_sessions(&progress.session_history, period, now);
    let total_time: u64 = sessions.iter().map(|s| u64::from(s.duration)).sum();
    let total_messages: u64 = sessions.iter().map(|s| u64::from(s.messages_count)).sum();
    let streak = compute_learning_streak(progress, now.date_naive());
    let distinct_topics = count_distinct_topics(sessions.iter().copied());

    // writeln! into a String cannot fail
    let mut out = String::new();
    let _ = writeln!(out, "📊 Learning Progress Summary ({})", period.label());
    let _ = writeln!(out);

    let _ = writeln!(out, "📈 Overall Performance");
    let _ = writeln!(out, "• Sessions: {}", sessions.len());
    let _ = writeln!(out, "• Total Time: {} hours {} minutes", total_time / 60, total_time % 60);
    let _ = writeln!(out, "• Messages: {total_messages}");
    let _ = writeln!(out, "• Learning Streak: {streak} days");

    let top_topics = compute_top_topics(sessions.iter().copied(), SUMMARY_TOP_TOPICS);
    if !top_topics.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "📚 Most Studied Topics");
        for (rank, topic) in top_topics.iter().enumerate() {
            let _ = writeln!(out, "{}. {} ({} sessions)", rank + 1, topic.topic, topic.count);
        }
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "💡 Learning Insights");
    if streak >= 7 {
        let _ = writeln!(out, "🔥 Amazing consistency! You've maintained a {streak}-day streak.");
    } else if streak >= 3 {
        let _ = writeln!(out, "📅 Good consistency with a {streak}-day streak.");
    }
    if total_time >= 300 {
        let _ = writeln!(out, "⏰ Dedicated learner! You've spent {} hours learning.", rounded_hours(total_time));
    } else if total_time >= 120 {
        let _ = writeln!(out, "📖 Steady progress with {} hours of learning.", rounded_hours(total_time));
    }
    if distinct_topics >= 5 {
        let _ = writeln!(out, "🌟 Well-rounded student! You've explored {distinct_topics} different topics.");
    } else if distinct_topics >= 3 {
        let _ = writeln!(out, "📚 Good topic diversity with {distinct_topics} subjects explored.");
    }

    if !progress.achievements.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "🏆 Recent Achievements");
        for achievement in progress.achievements.iter().take(SUMMARY_ACHIEVEMENTS) {
            let _ = writeln!(out, "• {achievement}");
        }
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "🎯 Recommendations");
    if streak < 3 {
        let _ = writeln!(out, "• Try to maintain a consistent learning schedule");
    }
    if distinct_topics < 3 {
        let _ = writeln!(out, "• Explore new topics to broaden your knowledge");
    }
    if total_time < 60 {
        let _ = writeln!(out, "• Increase session duration for deeper learning");
    }
    let _ = writeln!(out, "• Keep up the great work and continue your learning journey!");

    out
}
