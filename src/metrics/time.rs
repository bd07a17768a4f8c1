use crate::model::SessionSummary;
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Reporting window for time-based analytics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    /// Last 7 days, inclusive
    Week,
    /// Last 30 days, inclusive
    Month,
    All,
}

impl Period {
    pub fn as_str(&self) -> &'static str {
        match self {
            Period::Week => "week",
            Period::Month => "month",
            Period::All => "all",
        }
    }

    pub fn window_days(&self) -> Option<i64> {
        match self {
            Period::Week => Some(7),
            Period::Month => Some(30),
            Period::All => None,
        }
    }

    /// Earliest instant inside the window, `None` for no lower bound
    pub fn window_start(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.window_days().map(|days| now - Duration::days(days))
    }

    pub fn contains(&self, date: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        self.window_start(now).is_none_or(|start| date >= start)
    }

    /// Phrase used in human-readable text ("this week")
    pub fn label(&self) -> &'static str {
        match self {
            Period::Week => "this week",
            Period::Month => "this month",
            Period::All => "in total",
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Period {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "week" => Ok(Period::Week),
            "month" => Ok(Period::Month),
            "all" => Ok(Period::All),
            other => Err(format!("unknown period '{other}', expected week, month or all")),
        }
    }
}

/// Sessions whose start falls inside the period window
pub fn filter_sessions(
    sessions: &[SessionSummary],
    period: Period,
    now: DateTime<Utc>,
) -> Vec<&SessionSummary> {
    sessions
        .iter()
        .filter(|session| period.contains(session.date, now))
        .collect()
}

/// Total minutes studied inside the period window
pub fn compute_total_time(sessions: &[SessionSummary], period: Period, now: DateTime<Utc>) -> u64 {
    filter_sessions(sessions, period, now)
        .iter()
        .map(|session| u64::from(session.duration))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn now() -> DateTime<Utc> {
        NaiveDate::from_ymd_opt(2025, 4, 20)
            .unwrap()
            .and_hms_opt(18, 0, 0)
            .unwrap()
            .and_utc()
    }

    fn session_days_ago(days: i64, duration: u32) -> SessionSummary {
        SessionSummary {
            session_id: format!("d{days}"),
            date: now() - Duration::days(days),
            duration,
            topics: vec![],
            messages_count: 0,
            key_learnings: vec![],
            next_steps: vec![],
        }
    }

    #[test]
    fn test_week_excludes_ten_days_ago_and_includes_two() {
        let sessions = vec![session_days_ago(10, 45), session_days_ago(2, 30)];
        assert_eq!(compute_total_time(&sessions, Period::Week, now()), 30);
    }

    #[test]
    fn test_week_boundary_is_inclusive() {
        let sessions = vec![session_days_ago(7, 40)];
        assert_eq!(compute_total_time(&sessions, Period::Week, now()), 40);
    }

    #[test]
    fn test_month_and_all_windows() {
        let sessions = vec![
            session_days_ago(1, 10),
            session_days_ago(25, 20),
            session_days_ago(45, 40),
        ];
        assert_eq!(compute_total_time(&sessions, Period::Month, now()), 30);
        assert_eq!(compute_total_time(&sessions, Period::All, now()), 70);
    }

    #[test]
    fn test_empty_sessions_total_zero() {
        assert_eq!(compute_total_time(&[], Period::All, now()), 0);
    }

    #[test]
    fn test_filter_sessions_keeps_order() {
        let sessions = vec![session_days_ago(1, 10), session_days_ago(40, 10), session_days_ago(3, 10)];
        let ids: Vec<_> = filter_sessions(&sessions, Period::Month, now())
            .iter()
            .map(|s| s.session_id.as_str())
            .collect();
        assert_eq!(ids, vec!["d1", "d3"]);
    }

    #[test]
    fn test_period_parsing() {
        assert_eq!("month".parse::<Period>(), Ok(Period::Month));
        assert!("fortnight".parse::<Period>().is_err());
        assert_eq!(Period::Week.to_string(), "week");
        assert_eq!(Period::All.window_start(now()), None);
    }
}
