//! Caller-owned study session and the welcome-back message shown when a
//! student returns.

use crate::model::{LearningProgress, SessionSummary};
use chrono::{DateTime, Utc};

/// A study session in progress. Each caller owns its own; finishing it
/// yields the summary to hand to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudySession {
    pub user_id: String,
    pub session_id: String,
    pub started_at: DateTime<Utc>,
    messages_count: u32,
    topics: Vec<String>,
    key_learnings: Vec<String>,
    next_steps: Vec<String>,
}

impl StudySession {
    pub fn start(user_id: &str, session_id: &str, started_at: DateTime<Utc>) -> Self {
        StudySession {
            user_id: user_id.to_string(),
            session_id: session_id.to_string(),
            started_at,
            messages_count: 0,
            topics: Vec::new(),
            key_learnings: Vec::new(),
            next_steps: Vec::new(),
        }
    }

    pub fn record_message(&mut self) {
        self.messages_count = self.messages_count.saturating_add(1);
    }

    pub fn messages_count(&self) -> u32 {
        self.messages_count
    }

    /// Ignores blank and already-recorded topics
    pub fn add_topic(&mut self, topic: &str) {
        let topic = topic.trim();
        if !topic.is_empty() && !self.topics.iter().any(|t| t == topic) {
            self.topics.push(topic.to_string());
        }
    }

    pub fn topics(&self) -> &[String] {
        &self.topics
    }

    pub fn add_key_learning(&mut self, learning: &str) {
        self.key_learnings.push(learning.to_string());
    }

    pub fn add_next_step(&mut self, step: &str) {
        self.next_steps.push(step.to_string());
    }

    /// Close the session. Duration is in whole minutes and never negative,
    /// even if the clock went backwards.
    pub fn finish(self, ended_at: DateTime<Utc>) -> SessionSummary {
        let minutes = (ended_at - self.started_at).num_minutes().max(0);
        SessionSummary {
            session_id: self.session_id,
            date: self.started_at,
            duration: u32::try_from(minutes).unwrap_or(u32::MAX),
            topics: self.topics,
            messages_count: self.messages_count,
            key_learnings: self.key_learnings,
            next_steps: self.next_steps,
        }
    }
}

/// Greeting for a returning student, built from the stored rollup
pub fn resume_message(progress: &LearningProgress, now: DateTime<Utc>) -> String {
    if progress.total_sessions == 0 {
        return "Welcome! I'm excited to start learning with you. What would you like to explore today?"
            .to_string();
    }

    let mut message = String::from("Welcome back! I'm glad to see you again. ");

    if progress.learning_streak > 1 {
        message.push_str(&format!(
            "You're on a {}-day learning streak! 🎉 ",
            progress.learning_streak
        ));
    }

    if let Some(last) = progress.session_history.first() {
        match (now.date_naive() - last.date.date_naive()).num_days() {
            days if days <= 0 => message.push_str("You were here earlier today. "),
            1 => message.push_str("You were here yesterday. "),
            days => message.push_str(&format!("It's been {days} days since your last session. ")),
        }

        if !last.topics.is_empty() {
            message.push_str(&format!("Last time we worked on: {}. ", last.topics.join(", ")));
        }
        if !last.key_learnings.is_empty() {
            message.push_str(&format!("You learned about: {}. ", last.key_learnings.join(", ")));
        }
        if !last.next_steps.is_empty() {
            message.push_str(&format!("We planned to work on: {}. ", last.next_steps.join(", ")));
        }
    }

    message.push_str("Would you like to continue where we left off, or explore something new?");
    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn start_time() -> DateTime<Utc> {
        NaiveDate::from_ymd_opt(2025, 4, 2)
            .unwrap()
            .and_hms_opt(16, 0, 0)
            .unwrap()
            .and_utc()
    }

    #[test]
    fn test_finish_builds_summary() {
        let mut session = StudySession::start("ana", "sess-1", start_time());
        session.record_message();
        session.record_message();
        session.add_topic("photosynthesis");
        session.add_topic(" photosynthesis ");
        session.add_topic("");
        session.add_topic("respiration");
        session.add_key_learning("Chlorophyll absorbs light");
        session.add_next_step("Review the Calvin cycle");

        let summary = session.finish(start_time() + Duration::seconds(25 * 60 + 59));
        assert_eq!(summary.session_id, "sess-1");
        assert_eq!(summary.date, start_time());
        assert_eq!(summary.duration, 25);
        assert_eq!(summary.messages_count, 2);
        assert_eq!(summary.topics, vec!["photosynthesis", "respiration"]);
        assert_eq!(summary.key_learnings, vec!["Chlorophyll absorbs light"]);
        assert_eq!(summary.next_steps, vec!["Review the Calvin cycle"]);
    }

    #[test]
    fn test_duration_never_negative() {
        let session = StudySession::start("ana", "s", start_time());
        assert_eq!(session.finish(start_time() - Duration::minutes(5)).duration, 0);
    }

    #[test]
    fn test_sessions_are_independent() {
        let mut first = StudySession::start("ana", "a", start_time());
        let second = StudySession::start("ben", "b", start_time());
        first.add_topic("algebra");
        assert!(second.topics().is_empty());
    }

    #[test]
    fn test_resume_for_new_student() {
        let message = resume_message(&LearningProgress::new("u1"), start_time());
        assert!(message.starts_with("Welcome! I'm excited"));
    }

    #[test]
    fn test_resume_after_yesterday_with_streak() {
        let mut progress = LearningProgress::new("u1");
        let mut day_before = StudySession::start("u1", "s1", start_time() - Duration::days(2));
        day_before.add_topic("fractions");
        let day_before = day_before.finish(start_time() - Duration::days(2) + Duration::minutes(20));
        progress.apply_session(day_before, start_time());

        let mut yesterday = StudySession::start("u1", "s2", start_time() - Duration::days(1));
        yesterday.add_topic("decimals");
        yesterday.add_next_step("percentages");
        let yesterday = yesterday.finish(start_time() - Duration::days(1) + Duration::minutes(20));
        progress.apply_session(yesterday, start_time());

        assert_eq!(
            resume_message(&progress, start_time()),
            "Welcome back! I'm glad to see you again. You're on a 2-day learning streak! 🎉 \
             You were here yesterday. Last time we worked on: decimals. \
             We planned to work on: percentages. \
             Would you like to continue where we left off, or explore something new?"
        );
    }

    #[test]
    fn test_resume_after_long_break() {
        let mut progress = LearningProgress::new("u1");
        let old = StudySession::start("u1", "s1", start_time() - Duration::days(9));
        progress.apply_session(old.finish(start_time() - Duration::days(9)), start_time());

        let message = resume_message(&progress, start_time());
        assert!(message.contains("It's been 9 days since your last session. "));
        assert!(!message.contains("streak"));
    }
}
