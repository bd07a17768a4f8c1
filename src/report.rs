//! Terminal rendering of composer results. Colours come from `colored` and
//! follow its global override, so `--no-color` output is plain text.

use crate::metrics::LearningAnalytics;
use crate::ranking::{
    ChallengeLeaderboard, ChallengeLevel, ClassOverview, InsightKind, Leaderboard, SkippedUser,
    StudentDashboard,
};
use chrono::{DateTime, Utc};
use colored::Colorize;
use std::fmt::Write;

pub const NO_DATA: &str = "No data yet.";

/// Formats a past datetime relative to `now`
///
/// Examples:
/// - under a minute ago: "just now"
/// - 5 minutes ago: "5 minutes ago"
/// - 1 hour ago: "1 hour ago"
/// - 1 day ago: "yesterday"
/// - 3 days ago: "3 days ago"
/// - 30 days or more: "on 2025-12-10"
pub fn format_last_activity(at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now.signed_duration_since(at);

    if elapsed.num_seconds() < 60 {
        "just now".to_string()
    } else if elapsed.num_minutes() < 60 {
        let mins = elapsed.num_minutes();
        format!("{} minute{} ago", mins, if mins == 1 { "" } else { "s" })
    } else if elapsed.num_hours() < 24 {
        let hours = elapsed.num_hours();
        format!("{} hour{} ago", hours, if hours == 1 { "" } else { "s" })
    } else if elapsed.num_days() == 1 {
        "yesterday".to_string()
    } else if elapsed.num_days() < 30 {
        format!("{} days ago", elapsed.num_days())
    } else {
        format!("on {}", at.format("%Y-%m-%d"))
    }
}

fn podium(rank: usize) -> String {
    match rank {
        1 => "🥇".to_string(),
        2 => "🥈".to_string(),
        3 => "🥉".to_string(),
        n => format!("{n:>2}."),
    }
}

fn write_skipped(out: &mut String, skipped: &[SkippedUser]) {
    if skipped.is_empty() {
        return;
    }
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "{}",
        format!("⚠ {} student(s) could not be loaded:", skipped.len()).yellow()
    );
    for user in skipped {
        let _ = writeln!(out, "  - {}: {}", user.user_id, user.reason);
    }
}

pub fn render_leaderboard(board: &Leaderboard, now: DateTime<Utc>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", "Student Leaderboard".bold());
    let _ = writeln!(out, "{}", "=".repeat(60));

    if board.is_empty() {
        let _ = writeln!(out, "{NO_DATA}");
    }

    for (index, entry) in board.entries.iter().enumerate() {
        let level = ChallengeLevel::for_points(entry.total_points);
        let _ = writeln!(
            out,
            "{} {} {}",
            podium(index + 1),
            entry.display_name.bold(),
            format!("({level})").dimmed()
        );
        let _ = writeln!(
            out,
            "    {} pts | {}/{} correct | avg {:.1}s | streak {} | last active {}",
            entry.total_points.to_string().green(),
            entry.correct_answers,
            entry.total_challenges,
            entry.average_time,
            entry.win_streak,
            format_last_activity(entry.last_activity, now)
        );
    }

    write_skipped(&mut out, &board.skipped);
    out
}

pub fn render_challenge_board(board: &ChallengeLeaderboard) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} {}",
        "Challenge:".bold(),
        format!("{} ({})", board.challenge_title, board.challenge_id).bold()
    );
    let _ = writeln!(out, "{}", "-".repeat(60));

    if board.top_submissions.is_empty() {
        let _ = writeln!(out, "{NO_DATA}");
    }
    for (index, submission) in board.top_submissions.iter().enumerate() {
        let _ = writeln!(
            out,
            "{} {} - {} pts in {}s ({} hints)",
            podium(index + 1),
            submission.display_name,
            submission.points_earned.to_string().green(),
            submission.time_spent,
            submission.hints_used
        );
    }
    out
}

fn write_analytics(out: &mut String, analytics: &LearningAnalytics) {
    let _ = writeln!(out, "{}", "Analytics".bold());
    let _ = writeln!(
        out,
        "  Sessions in history: {} | avg length {:.1} min",
        analytics.total_sessions, analytics.average_session_length
    );
    let _ = writeln!(
        out,
        "  Velocity: {:.1} sessions/week | consistency {:.0}%",
        analytics.learning_velocity, analytics.consistency_score
    );
    let _ = writeln!(out, "  Weekly progress:");
    for week in &analytics.weekly_progress {
        let _ = writeln!(
            out,
            "    {}  {:>2} sessions {:>4} min",
            week.week.format("%Y-%m-%d"),
            week.sessions,
            week.time
        );
    }
}

pub fn render_dashboard(dashboard: &StudentDashboard) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{}",
        format!("Learning Dashboard: {} ({})", dashboard.user_id, dashboard.period.label()).bold()
    );
    let _ = writeln!(out, "{}", "=".repeat(60));

    if !dashboard.has_data {
        let _ = writeln!(out, "{NO_DATA}");
        return out;
    }

    let _ = writeln!(
        out,
        "🔥 Streak: {} days | ⏰ Time: {}h {}m | 📅 Sessions: {} | 📚 Topics: {}",
        dashboard.learning_streak.to_string().yellow(),
        dashboard.total_time / 60,
        dashboard.total_time % 60,
        dashboard.total_sessions,
        dashboard.topics_learned
    );

    if !dashboard.top_topics.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "{}", "Top Topics".bold());
        for (index, topic) in dashboard.top_topics.iter().enumerate() {
            let _ = writeln!(out, "  {}. {} ({} sessions)", index + 1, topic.topic, topic.count);
        }
    }

    if !dashboard.insights.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "{}", "Learning Insights".bold());
        for insight in &dashboard.insights {
            let title = match insight.kind {
                InsightKind::Success => insight.title.green(),
                InsightKind::Info => insight.title.cyan(),
                InsightKind::Warning => insight.title.yellow(),
            };
            let _ = writeln!(out, "  {} {} - {}", insight.icon, title, insight.description);
        }
    }

    let _ = writeln!(out);
    write_analytics(&mut out, &dashboard.analytics);
    out
}

pub fn render_class_overview(overview: &ClassOverview) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{}",
        format!(
            "Class Progress ({}, sorted by {})",
            overview.period.label(),
            overview.sort_key
        )
        .bold()
    );
    let _ = writeln!(out, "{}", "=".repeat(60));

    let Some(stats) = &overview.stats else {
        let _ = writeln!(out, "{NO_DATA}");
        write_skipped(&mut out, &overview.skipped);
        return out;
    };

    let _ = writeln!(
        out,
        "Students: {} ({} active) | Sessions: {} | Hours: {} | Avg streak: {:.1} | Topics: {}",
        stats.total_students,
        stats.active_students,
        stats.total_sessions,
        stats.total_hours,
        stats.average_streak,
        stats.total_topics
    );

    let _ = writeln!(out);
    let _ = writeln!(out, "{}", "Top Performers".bold());
    for (index, row) in overview.top_performers().iter().enumerate() {
        let _ = writeln!(out, "  {} {}", podium(index + 1), row.display_name);
    }

    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "{:<20} {:>7} {:>9} {:>9} {:>7}",
        "Student", "Streak", "Sessions", "Time", "Topics"
    );
    for row in &overview.students {
        let _ = writeln!(
            out,
            "{:<20} {:>7} {:>9} {:>9} {:>7}",
            row.display_name,
            row.analytics.learning_streak,
            row.analytics.total_sessions,
            format!("{}h {}m", row.period_time / 60, row.period_time % 60),
            row.topics_learned.len()
        );
    }

    write_skipped(&mut out, &overview.skipped);
    out
}
