//! Metrics Calculator: pure functions over one user's submissions or
//! sessions. No I/O; every function is total over well-formed records.

pub mod analytics;
pub mod challenge;
pub mod streak;
pub mod time;
pub mod topics;

pub use analytics::{LearningAnalytics, WeeklyProgress, compute_learning_analytics};
pub use challenge::{ChallengeMetrics, compute_challenge_metrics, compute_win_streak};
pub use streak::{advance_stored_streak, compute_learning_streak};
pub use time::{Period, compute_total_time, filter_sessions};
pub use topics::{TopicCount, TopicStat, compute_top_topics, compute_topic_stats, count_distinct_topics};
