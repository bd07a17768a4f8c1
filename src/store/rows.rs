//! Parsing boundary between raw SQLite rows and domain records.
//!
//! Row factories read columns as loosely typed values; the `TryFrom`
//! conversions then validate them, so nothing past the adapter ever sees a
//! negative counter, an unparsable timestamp or an unknown role.

use crate::error::{Error, Result};
use crate::model::{
    Challenge, ChallengeSubmission, DEFAULT_DISPLAY_NAME, Difficulty, LearningProgress, Role,
    SessionSummary, UserIdentity,
};
use chrono::{DateTime, Utc};
use rusqlite::Row;

fn non_negative(record: &'static str, key: &str, field: &str, value: i64) -> Result<u32> {
    u32::try_from(value)
        .map_err(|_| Error::malformed(record, key, format!("{field} must be a non-negative count, got {value}")))
}

fn flag(record: &'static str, key: &str, field: &str, value: i64) -> Result<bool> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(Error::malformed(record, key, format!("{field} must be 0 or 1, got {other}"))),
    }
}

fn timestamp(record: &'static str, key: &str, field: &str, value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| Error::malformed(record, key, format!("{field} '{value}' is not RFC 3339: {e}")))
}

fn string_list(record: &'static str, key: &str, field: &str, value: &str) -> Result<Vec<String>> {
    serde_json::from_str(value)
        .map_err(|e| Error::malformed(record, key, format!("{field} is not a JSON list of strings: {e}")))
}

pub fn format_timestamp(value: &DateTime<Utc>) -> String {
    value.to_rfc3339()
}

pub struct RawSubmission {
    pub id: i64,
    pub user_id: String,
    pub challenge_id: String,
    pub is_correct: i64,
    pub points_earned: i64,
    pub time_spent: i64,
    pub hints_used: i64,
    pub submitted_at: String,
}

/// Factory for reading submission rows
pub struct SubmissionRowFactory;

impl SubmissionRowFactory {
    /// Expected columns: id, user_id, challenge_id, is_correct, points_earned,
    ///                   time_spent, hints_used, submitted_at
    pub fn from_row(row: &Row) -> rusqlite::Result<RawSubmission> {
        Ok(RawSubmission {
            id: row.get(0)?,
            user_id: row.get(1)?,
            challenge_id: row.get(2)?,
            is_correct: row.get(3)?,
            points_earned: row.get(4)?,
            time_spent: row.get(5)?,
            hints_used: row.get(6)?,
            submitted_at: row.get(7)?,
        })
    }
}

impl TryFrom<RawSubmission> for ChallengeSubmission {
    type Error = Error;

    fn try_from(raw: RawSubmission) -> Result<Self> {
        const RECORD: &str = "submission";
        let key = raw.id.to_string();
        Ok(ChallengeSubmission {
            is_correct: flag(RECORD, &key, "is_correct", raw.is_correct)?,
            points_earned: non_negative(RECORD, &key, "points_earned", raw.points_earned)?,
            time_spent: non_negative(RECORD, &key, "time_spent", raw.time_spent)?,
            hints_used: non_negative(RECORD, &key, "hints_used", raw.hints_used)?,
            submitted_at: timestamp(RECORD, &key, "submitted_at", &raw.submitted_at)?,
            user_id: raw.user_id,
            challenge_id: raw.challenge_id,
        })
    }
}

pub struct RawUser {
    pub user_id: String,
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub photo_url: Option<String>,
    pub role: String,
}

/// Factory for reading user rows
pub struct UserRowFactory;

impl UserRowFactory {
    /// Expected columns: user_id, display_name, email, photo_url, role
    pub fn from_row(row: &Row) -> rusqlite::Result<RawUser> {
        Ok(RawUser {
            user_id: row.get(0)?,
            display_name: row.get(1)?,
            email: row.get(2)?,
            photo_url: row.get(3)?,
            role: row.get(4)?,
        })
    }
}

impl TryFrom<RawUser> for UserIdentity {
    type Error = Error;

    fn try_from(raw: RawUser) -> Result<Self> {
        let role = raw
            .role
            .parse::<Role>()
            .map_err(|reason| Error::malformed("user", &raw.user_id, reason))?;
        Ok(UserIdentity {
            display_name: raw
                .display_name
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| DEFAULT_DISPLAY_NAME.to_string()),
            email: raw.email.unwrap_or_default(),
            photo_url: raw.photo_url,
            user_id: raw.user_id,
            role,
        })
    }
}

pub struct RawChallenge {
    pub challenge_id: String,
    pub title: String,
    pub challenge_type: String,
    pub difficulty: String,
    pub points: i64,
    pub category: String,
    pub created_at: String,
    pub is_active: i64,
}

/// Factory for reading challenge rows
pub struct ChallengeRowFactory;

impl ChallengeRowFactory {
    /// Expected columns: challenge_id, title, challenge_type, difficulty,
    ///                   points, category, created_at, is_active
    pub fn from_row(row: &Row) -> rusqlite::Result<RawChallenge> {
        Ok(RawChallenge {
            challenge_id: row.get(0)?,
            title: row.get(1)?,
            challenge_type: row.get(2)?,
            difficulty: row.get(3)?,
            points: row.get(4)?,
            category: row.get(5)?,
            created_at: row.get(6)?,
            is_active: row.get(7)?,
        })
    }
}

impl TryFrom<RawChallenge> for Challenge {
    type Error = Error;

    fn try_from(raw: RawChallenge) -> Result<Self> {
        const RECORD: &str = "challenge";
        let key = raw.challenge_id.clone();
        let difficulty = raw
            .difficulty
            .parse::<Difficulty>()
            .map_err(|reason| Error::malformed(RECORD, &key, reason))?;
        Ok(Challenge {
            points: non_negative(RECORD, &key, "points", raw.points)?,
            created_at: timestamp(RECORD, &key, "created_at", &raw.created_at)?,
            is_active: flag(RECORD, &key, "is_active", raw.is_active)?,
            challenge_id: raw.challenge_id,
            title: raw.title,
            challenge_type: raw.challenge_type,
            difficulty,
            category: raw.category,
        })
    }
}

pub struct RawProgress {
    pub user_id: String,
    pub last_session_id: String,
    pub last_session_date: Option<String>,
    pub total_sessions: i64,
    pub total_messages: i64,
    pub learning_streak: i64,
    pub topics_learned: String,
    pub current_topics: String,
    pub learning_goals: String,
    pub achievements: String,
    pub last_activity: Option<String>,
}

/// Factory for reading learning progress rows
pub struct ProgressRowFactory;

impl ProgressRowFactory {
    /// Expected columns: user_id, last_session_id, last_session_date,
    ///                   total_sessions, total_messages, learning_streak,
    ///                   topics_learned, current_topics, learning_goals,
    ///                   achievements, last_activity
    pub fn from_row(row: &Row) -> rusqlite::Result<RawProgress> {
        Ok(RawProgress {
            user_id: row.get(0)?,
            last_session_id: row.get(1)?,
            last_session_date: row.get(2)?,
            total_sessions: row.get(3)?,
            total_messages: row.get(4)?,
            learning_streak: row.get(5)?,
            topics_learned: row.get(6)?,
            current_topics: row.get(7)?,
            learning_goals: row.get(8)?,
            achievements: row.get(9)?,
            last_activity: row.get(10)?,
        })
    }
}

impl RawProgress {
    /// Validate the rollup and attach its already-parsed history
    pub fn into_progress(self, session_history: Vec<SessionSummary>) -> Result<LearningProgress> {
        const RECORD: &str = "learning progress";
        let key = self.user_id.clone();
        Ok(LearningProgress {
            last_session_date: self
                .last_session_date
                .as_deref()
                .map(|value| timestamp(RECORD, &key, "last_session_date", value))
                .transpose()?,
            total_sessions: non_negative(RECORD, &key, "total_sessions", self.total_sessions)?,
            total_messages: non_negative(RECORD, &key, "total_messages", self.total_messages)?,
            learning_streak: non_negative(RECORD, &key, "learning_streak", self.learning_streak)?,
            topics_learned: string_list(RECORD, &key, "topics_learned", &self.topics_learned)?,
            current_topics: string_list(RECORD, &key, "current_topics", &self.current_topics)?,
            learning_goals: string_list(RECORD, &key, "learning_goals", &self.learning_goals)?,
            achievements: string_list(RECORD, &key, "achievements", &self.achievements)?,
            last_activity: self
                .last_activity
                .as_deref()
                .map(|value| timestamp(RECORD, &key, "last_activity", value))
                .transpose()?,
            user_id: self.user_id,
            last_session_id: self.last_session_id,
            session_history,
        })
    }
}

pub struct RawSession {
    pub session_id: String,
    pub date: String,
    pub duration: i64,
    pub topics: String,
    pub messages_count: i64,
    pub key_learnings: String,
    pub next_steps: String,
}

/// Factory for reading session history rows
pub struct SessionRowFactory;

impl SessionRowFactory {
    /// Expected columns: session_id, date, duration, topics, messages_count,
    ///                   key_learnings, next_steps
    pub fn from_row(row: &Row) -> rusqlite::Result<RawSession> {
        Ok(RawSession {
            session_id: row.get(0)?,
            date: row.get(1)?,
            duration: row.get(2)?,
            topics: row.get(3)?,
            messages_count: row.get(4)?,
            key_learnings: row.get(5)?,
            next_steps: row.get(6)?,
        })
    }
}

impl TryFrom<RawSession> for SessionSummary {
    type Error = Error;

    fn try_from(raw: RawSession) -> Result<Self> {
        const RECORD: &str = "session";
        let key = raw.session_id.clone();
        Ok(SessionSummary {
            date: timestamp(RECORD, &key, "date", &raw.date)?,
            duration: non_negative(RECORD, &key, "duration", raw.duration)?,
            topics: string_list(RECORD, &key, "topics", &raw.topics)?,
            messages_count: non_negative(RECORD, &key, "messages_count", raw.messages_count)?,
            key_learnings: string_list(RECORD, &key, "key_learnings", &raw.key_learnings)?,
            next_steps: string_list(RECORD, &key, "next_steps", &raw.next_steps)?,
            session_id: raw.session_id,
        })
    }
}
