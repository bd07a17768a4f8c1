use super::rows::{ChallengeRowFactory, format_timestamp};
use crate::error::{Error, Result};
use crate::model::Challenge;
use rusqlite::{Connection, OptionalExtension, params};

pub struct ChallengesRepository<'a> {
    conn: &'a Connection,
}

impl<'a> ChallengesRepository<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        ChallengesRepository { conn }
    }

    pub fn insert(&self, challenge: &Challenge) -> Result<()> {
        if challenge.challenge_id.is_empty() {
            return Err(Error::InvalidInput("challenge id must not be empty".to_string()));
        }

        self.conn.execute(
            "INSERT INTO challenges
                (challenge_id, title, challenge_type, difficulty, points, category, created_at, is_active)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                challenge.challenge_id,
                challenge.title,
                challenge.challenge_type,
                challenge.difficulty.as_str(),
                challenge.points,
                challenge.category,
                format_timestamp(&challenge.created_at),
                challenge.is_active as i32,
            ],
        )?;
        Ok(())
    }

    pub fn get(&self, challenge_id: &str) -> Result<Option<Challenge>> {
        let raw = self
            .conn
            .query_row(
                "SELECT challenge_id, title, challenge_type, difficulty, points, category, created_at, is_active
                 FROM challenges WHERE challenge_id = ?1",
                [challenge_id],
                ChallengeRowFactory::from_row,
            )
            .optional()?;

        raw.map(Challenge::try_from).transpose()
    }
}
