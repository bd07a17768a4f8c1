use super::rows::{ProgressRowFactory, SessionRowFactory, format_timestamp};
use crate::error::{Error, Result};
use crate::model::{LearningProgress, SESSION_HISTORY_CAP, SessionSummary};
use rusqlite::{Connection, OptionalExtension, params};

pub struct ProgressRepository<'a> {
    conn: &'a Connection,
}

impl<'a> ProgressRepository<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        ProgressRepository { conn }
    }

    /// Stored rollup with its history, or `None` if the user never finished a session
    pub fn get(&self, user_id: &str) -> Result<Option<LearningProgress>> {
        let raw = self
            .conn
            .query_row(
                "SELECT user_id, last_session_id, last_session_date, total_sessions, total_messages,
                        learning_streak, topics_learned, current_topics, learning_goals,
                        achievements, last_activity
                 FROM learning_progress WHERE user_id = ?1",
                [user_id],
                ProgressRowFactory::from_row,
            )
            .optional()?;

        match raw {
            Some(raw) => {
                let history = self.history(user_id)?;
                raw.into_progress(history).map(Some)
            }
            None => Ok(None),
        }
    }

    /// Most recent first
    pub fn history(&self, user_id: &str) -> Result<Vec<SessionSummary>> {
        let mut stmt = self.conn.prepare(
            "SELECT session_id, date, duration, topics, messages_count, key_learnings, next_steps
             FROM session_history WHERE user_id = ?1 ORDER BY position",
        )?;
        let raw_rows = stmt
            .query_map([user_id], SessionRowFactory::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        raw_rows.into_iter().map(SessionSummary::try_from).collect()
    }

    /// Write the rollup and replace the stored history with the capped list.
    /// Callers wrap this in a transaction.
    pub fn save(&self, progress: &LearningProgress) -> Result<()> {
        if progress.user_id.is_empty() {
            return Err(Error::InvalidInput("user id must not be empty".to_string()));
        }

        self.conn.execute(
            "INSERT INTO learning_progress
                (user_id, last_session_id, last_session_date, total_sessions, total_messages,
                 learning_streak, topics_learned, current_topics, learning_goals, achievements,
                 last_activity)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
             ON CONFLICT(user_id) DO UPDATE SET
                last_session_id = excluded.last_session_id,
                last_session_date = excluded.last_session_date,
                total_sessions = excluded.total_sessions,
                total_messages = excluded.total_messages,
                learning_streak = excluded.learning_streak,
                topics_learned = excluded.topics_learned,
                current_topics = excluded.current_topics,
                learning_goals = excluded.learning_goals,
                achievements = excluded.achievements,
                last_activity = excluded.last_activity",
            params![
                progress.user_id,
                progress.last_session_id,
                progress.last_session_date.as_ref().map(format_timestamp),
                progress.total_sessions,
                progress.total_messages,
                progress.learning_streak,
                serde_json::to_string(&progress.topics_learned)?,
                serde_json::to_string(&progress.current_topics)?,
                serde_json::to_string(&progress.learning_goals)?,
                serde_json::to_string(&progress.achievements)?,
                progress.last_activity.as_ref().map(format_timestamp),
            ],
        )?;

        self.conn.execute(
            "DELETE FROM session_history WHERE user_id = ?1",
            [&progress.user_id],
        )?;

        let mut insert = self.conn.prepare(
            "INSERT INTO session_history
                (user_id, position, session_id, date, duration, topics, messages_count, key_learnings, next_steps)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        )?;
        for (position, session) in progress
            .session_history
            .iter()
            .take(SESSION_HISTORY_CAP)
            .enumerate()
        {
            insert.execute(params![
                progress.user_id,
                position as i64,
                session.session_id,
                format_timestamp(&session.date),
                session.duration,
                serde_json::to_string(&session.topics)?,
                session.messages_count,
                serde_json::to_string(&session.key_learnings)?,
                serde_json::to_string(&session.next_steps)?,
            ])?;
        }

        Ok(())
    }
}
