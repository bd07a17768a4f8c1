//! Ranking & Insight Composer: leaderboards, insights and the dashboards
//! built on top of the metrics. Every call recomputes from store state.

pub mod challenge_board;
pub mod class_overview;
pub mod dashboard;
pub mod fan_out;
pub mod insights;
pub mod leaderboard;
pub mod levels;
pub mod summary;

pub use challenge_board::{
    ChallengeLeaderboard, ChallengeTopSubmission, build_challenge_leaderboard, user_challenge_stats,
};
pub use class_overview::{
    ClassOverview, ClassSortKey, ClassStats, StudentProgressRow, build_class_overview,
};
pub use dashboard::{StudentDashboard, build_dashboard};
pub use fan_out::SkippedUser;
pub use insights::{Insight, InsightKind, build_insights};
pub use leaderboard::{DEFAULT_LEADERBOARD_LIMIT, Leaderboard, build_leaderboard, compare_entries, rank_entries};
pub use levels::ChallengeLevel;
pub use summary::progress_summary;
