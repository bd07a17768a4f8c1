use super::rows::{SubmissionRowFactory, format_timestamp};
use crate::error::{Error, Result};
use crate::model::ChallengeSubmission;
use rusqlite::{Connection, Params, params};

const SELECT_SUBMISSIONS: &str = "SELECT id, user_id, challenge_id, is_correct, points_earned, time_spent, hints_used, submitted_at
     FROM challenge_submissions";

pub struct SubmissionsRepository<'a> {
    conn: &'a Connection,
}

impl<'a> SubmissionsRepository<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        SubmissionsRepository { conn }
    }

    /// Append a submission. Returns its row id.
    pub fn insert(&self, submission: &ChallengeSubmission) -> Result<i64> {
        if submission.user_id.is_empty() || submission.challenge_id.is_empty() {
            return Err(Error::InvalidInput(
                "submission needs both a user id and a challenge id".to_string(),
            ));
        }

        self.conn.execute(
            "INSERT INTO challenge_submissions
                (user_id, challenge_id, is_correct, points_earned, time_spent, hints_used, submitted_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                submission.user_id,
                submission.challenge_id,
                submission.is_correct as i32,
                submission.points_earned,
                submission.time_spent,
                submission.hints_used,
                format_timestamp(&submission.submitted_at),
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn for_user(&self, user_id: &str) -> Result<Vec<ChallengeSubmission>> {
        self.query(
            &format!("{SELECT_SUBMISSIONS} WHERE user_id = ?1 ORDER BY id"),
            [user_id],
        )
    }

    pub fn for_challenge(&self, challenge_id: &str) -> Result<Vec<ChallengeSubmission>> {
        self.query(
            &format!("{SELECT_SUBMISSIONS} WHERE challenge_id = ?1 ORDER BY id"),
            [challenge_id],
        )
    }

    pub fn all(&self) -> Result<Vec<ChallengeSubmission>> {
        self.query(&format!("{SELECT_SUBMISSIONS} ORDER BY id"), [])
    }

    pub fn count(&self) -> Result<i64> {
        let count: i64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM challenge_submissions", [], |row| row.get(0))?;
        Ok(count)
    }

    fn query<P: Params>(&self, sql: &str, params: P) -> Result<Vec<ChallengeSubmission>> {
        let mut stmt = self.conn.prepare(sql)?;
        let raw_rows = stmt
            .query_map(params, SubmissionRowFactory::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        raw_rows.into_iter().map(ChallengeSubmission::try_from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::connection::init_connection;
    use chrono::{DateTime, Duration, NaiveDate, Utc};

    fn create_test_db() -> Connection {
        init_connection(":memory:", std::time::Duration::from_secs(1))
            .expect("Failed to create test database")
    }

    fn at(minutes: i64) -> DateTime<Utc> {
        NaiveDate::from_ymd_opt(2025, 1, 15)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
            .and_utc()
            + Duration::minutes(minutes)
    }

    fn submission(user: &str, challenge: &str, is_correct: bool, points: u32) -> ChallengeSubmission {
        ChallengeSubmission {
            user_id: user.to_string(),
            challenge_id: challenge.to_string(),
            is_correct,
            points_earned: points,
            time_spent: 42,
            hints_used: 2,
            submitted_at: at(points as i64),
        }
    }

    #[test]
    fn test_insert_and_read_back() {
        let conn = create_test_db();
        let repo = SubmissionsRepository::new(&conn);

        let original = submission("u1", "c1", true, 25);
        let id = repo.insert(&original).unwrap();
        assert_eq!(id, 1);
        assert_eq!(repo.count().unwrap(), 1);

        let stored = repo.for_user("u1").unwrap();
        assert_eq!(stored, vec![original]);
    }

    #[test]
    fn test_filters_by_user_and_challenge() {
        let conn = create_test_db();
        let repo = SubmissionsRepository::new(&conn);
        repo.insert(&submission("u1", "c1", true, 10)).unwrap();
        repo.insert(&submission("u2", "c1", false, 0)).unwrap();
        repo.insert(&submission("u1", "c2", true, 20)).unwrap();

        assert_eq!(repo.for_user("u1").unwrap().len(), 2);
        assert_eq!(repo.for_user("nobody").unwrap().len(), 0);
        assert_eq!(repo.for_challenge("c1").unwrap().len(), 2);
        assert_eq!(repo.all().unwrap().len(), 3);
    }

    #[test]
    fn test_rejects_missing_ids() {
        let conn = create_test_db();
        let repo = SubmissionsRepository::new(&conn);
        let result = repo.insert(&submission("", "c1", true, 10));
        assert!(matches!(result, Err(Error::InvalidInput(_))));
        assert_eq!(repo.count().unwrap(), 0);
    }

    #[test]
    fn test_corrupt_row_surfaces_as_malformed() {
        let conn = create_test_db();
        conn.execute(
            "INSERT INTO challenge_submissions
                (user_id, challenge_id, is_correct, points_earned, time_spent, hints_used, submitted_at)
             VALUES ('u1', 'c1', 1, -3, 10, 0, '2025-01-01T00:00:00Z')",
            [],
        )
        .unwrap();

        let repo = SubmissionsRepository::new(&conn);
        assert!(matches!(repo.for_user("u1"), Err(Error::Malformed { .. })));
    }
}
