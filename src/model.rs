use crate::metrics::streak::advance_stored_streak;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::str::FromStr;

/// Maximum number of sessions kept in a user's history
pub const SESSION_HISTORY_CAP: usize = 10;

/// Name shown for users whose record carries no display name
pub const DEFAULT_DISPLAY_NAME: &str = "Student";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Teacher,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Teacher => "teacher",
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "student" => Ok(Role::Student),
            "teacher" => Ok(Role::Teacher),
            other => Err(format!("unknown role '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }

    /// Points awarded for a challenge of this difficulty when none are set
    pub fn default_points(&self) -> u32 {
        match self {
            Difficulty::Easy => 10,
            Difficulty::Medium => 25,
            Difficulty::Hard => 50,
        }
    }

    pub fn time_limit_minutes(&self) -> u32 {
        match self {
            Difficulty::Easy => 5,
            Difficulty::Medium => 10,
            Difficulty::Hard => 15,
        }
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(format!("unknown difficulty '{other}'")),
        }
    }
}

/// Identity of a user as stored in the roster
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserIdentity {
    pub user_id: String,
    pub display_name: String,
    pub email: String,
    #[serde(rename = "photoURL", skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    pub role: Role,
}

impl UserIdentity {
    pub fn new(user_id: &str, display_name: &str, email: &str, role: Role) -> Self {
        UserIdentity {
            user_id: user_id.to_string(),
            display_name: display_name.to_string(),
            email: email.to_string(),
            photo_url: None,
            role,
        }
    }

    /// Placeholder identity for a user id with no roster record
    pub fn unknown(user_id: &str) -> Self {
        UserIdentity::new(user_id, DEFAULT_DISPLAY_NAME, "", Role::Student)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Challenge {
    pub challenge_id: String,
    pub title: String,
    /// riddle, word_hunt, enigmas, logic_puzzle, word_play, math_challenge, trivia
    pub challenge_type: String,
    pub difficulty: Difficulty,
    pub points: u32,
    pub category: String,
    pub created_at: DateTime<Utc>,
    pub is_active: bool,
}

/// One attempt at a challenge. Append-only: never mutated once stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeSubmission {
    pub user_id: String,
    pub challenge_id: String,
    pub is_correct: bool,
    pub points_earned: u32,
    /// Seconds
    pub time_spent: u32,
    pub hints_used: u32,
    pub submitted_at: DateTime<Utc>,
}

/// One completed study/chat session
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub session_id: String,
    /// Session start
    pub date: DateTime<Utc>,
    /// Minutes
    pub duration: u32,
    pub topics: Vec<String>,
    pub messages_count: u32,
    pub key_learnings: Vec<String>,
    pub next_steps: Vec<String>,
}

/// Per-user rollup, updated after every session end
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningProgress {
    pub user_id: String,
    pub last_session_id: String,
    pub last_session_date: Option<DateTime<Utc>>,
    pub total_sessions: u32,
    pub total_messages: u32,
    /// Counter maintained at session end; see `metrics::streak` for the
    /// recomputed streak used by analytics.
    pub learning_streak: u32,
    pub topics_learned: Vec<String>,
    pub current_topics: Vec<String>,
    /// Most recent first, at most `SESSION_HISTORY_CAP` entries
    pub session_history: Vec<SessionSummary>,
    pub learning_goals: Vec<String>,
    pub achievements: Vec<String>,
    pub last_activity: Option<DateTime<Utc>>,
}

impl LearningProgress {
    /// Empty record returned for users who never finished a session
    pub fn new(user_id: &str) -> Self {
        LearningProgress {
            user_id: user_id.to_string(),
            last_session_id: String::new(),
            last_session_date: None,
            total_sessions: 0,
            total_messages: 0,
            learning_streak: 0,
            topics_learned: Vec::new(),
            current_topics: Vec::new(),
            session_history: Vec::new(),
            learning_goals: Vec::new(),
            achievements: Vec::new(),
            last_activity: None,
        }
    }

    /// Fold a finished session into the rollup.
    ///
    /// A session dated before the current `last_session_date` (a late
    /// upload) is counted but does not replace the "last session" fields.
    /// History stays ordered by date, newest first, so a late upload lands
    /// at its place in the list and is dropped if it is older than every
    /// kept entry of a full history.
    pub fn apply_session(&mut self, session: SessionSummary, recorded_at: DateTime<Utc>) {
        let is_latest = self
            .last_session_date
            .is_none_or(|last| session.date >= last);

        self.learning_streak =
            advance_stored_streak(self.learning_streak, self.last_session_date, session.date);

        if is_latest {
            self.last_session_id = session.session_id.clone();
            self.last_session_date = Some(session.date);
            self.current_topics = session.topics.clone();
        }

        self.total_sessions = self.total_sessions.saturating_add(1);
        self.total_messages = self.total_messages.saturating_add(session.messages_count);

        for topic in &session.topics {
            if !self.topics_learned.contains(topic) {
                self.topics_learned.push(topic.clone());
            }
        }

        let position = self
            .session_history
            .iter()
            .position(|kept| kept.date <= session.date)
            .unwrap_or(self.session_history.len());
        self.session_history.insert(position, session);
        self.session_history.truncate(SESSION_HISTORY_CAP);
        self.last_activity = Some(recorded_at);
    }
}

/// A ranked row of the student leaderboard. Derived on every request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentLeaderboardEntry {
    pub user_id: String,
    pub display_name: String,
    pub email: String,
    #[serde(rename = "photoURL", skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    pub total_points: u64,
    pub total_challenges: u32,
    pub correct_answers: u32,
    /// Mean seconds per submission
    pub average_time: f64,
    pub win_streak: u32,
    pub last_activity: DateTime<Utc>,
}
