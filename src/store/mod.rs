//! Event Store Adapter: read access to the persisted event log, plus the
//! append-only writes used by session end, fixtures and the seed binary.

pub mod challenges;
pub mod connection;
pub mod memory;
pub mod progress;
pub mod rows;
pub mod submissions;
pub mod users;

use crate::config::DEFAULT_FETCH_TIMEOUT;
use crate::date_provider::{DateProvider, SystemDateProvider};
use crate::error::{Error, Result};
use crate::model::{Challenge, ChallengeSubmission, LearningProgress, Role, SessionSummary, UserIdentity};
use log::debug;
use rusqlite::Connection;
use std::ops::Deref;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

pub use challenges::ChallengesRepository;
pub use memory::MemoryEventStore;
pub use progress::ProgressRepository;
pub use submissions::SubmissionsRepository;
pub use users::UsersRepository;

/// Read side of the persistence collaborator.
///
/// Implementations return validated records only. Order of returned
/// submissions is unspecified; callers sort when order matters.
/// `Sync` so the ranking composer can fan per-user fetches out over threads.
pub trait EventStore: Sync {
    /// All submissions of one user, or every submission when `user_id` is `None`
    fn fetch_submissions(&self, user_id: Option<&str>) -> Result<Vec<ChallengeSubmission>>;

    fn fetch_users_by_role(&self, role: Role) -> Result<Vec<UserIdentity>>;

    /// Never fails for a missing record: an empty rollup is returned instead
    fn fetch_learning_progress(&self, user_id: &str) -> Result<LearningProgress>;

    fn fetch_user(&self, user_id: &str) -> Result<Option<UserIdentity>>;

    fn fetch_challenge(&self, challenge_id: &str) -> Result<Option<Challenge>>;

    fn fetch_challenge_submissions(&self, challenge_id: &str) -> Result<Vec<ChallengeSubmission>>;
}

/// SQLite-backed event store.
///
/// Writes go through one connection. Fetches check out a connection of
/// their own from an idle list, so concurrent per-user fetches run side by
/// side in SQLite and each waits at most `fetch_timeout` on database locks.
pub struct SqliteEventStore {
    writer: Mutex<Connection>,
    idle_readers: Mutex<Vec<Connection>>,
    location: String,
    fetch_timeout: Duration,
    date_provider: Arc<dyn DateProvider>,
}

/// A read connection on loan from the store; returned to the idle list on drop
pub struct PooledReader<'a> {
    conn: Option<Connection>,
    store: &'a SqliteEventStore,
}

impl Deref for PooledReader<'_> {
    type Target = Connection;

    fn deref(&self) -> &Connection {
        // only taken in drop
        self.conn.as_ref().unwrap_or_else(|| unreachable!("reader used after release"))
    }
}

impl Drop for PooledReader<'_> {
    fn drop(&mut self) {
        if let (Some(conn), Ok(mut idle)) = (self.conn.take(), self.store.idle_readers.lock()) {
            idle.push(conn);
        }
    }
}

impl SqliteEventStore {
    pub fn open(db_path: &str) -> Result<Self> {
        Self::with_options(db_path, DEFAULT_FETCH_TIMEOUT, Arc::new(SystemDateProvider))
    }

    pub fn with_options(
        db_path: &str,
        fetch_timeout: Duration,
        date_provider: Arc<dyn DateProvider>,
    ) -> Result<Self> {
        let location = connection::shared_location(db_path);
        let writer = connection::init_connection(&location, fetch_timeout)?;
        debug!("Opened event store at {db_path}");
        Ok(SqliteEventStore {
            writer: Mutex::new(writer),
            idle_readers: Mutex::new(Vec::new()),
            location,
            fetch_timeout,
            date_provider,
        })
    }

    fn writer(&self) -> Result<MutexGuard<'_, Connection>> {
        self.writer
            .lock()
            .map_err(|_| Error::Unavailable("connection lock poisoned".to_string()))
    }

    /// Check out a read connection, opening a new one when none is idle
    pub fn reader(&self) -> Result<PooledReader<'_>> {
        let idle = self
            .idle_readers
            .lock()
            .map_err(|_| Error::Unavailable("reader list lock poisoned".to_string()))?
            .pop();

        let conn = match idle {
            Some(conn) => conn,
            None => {
                debug!("Opening read connection to {}", self.location);
                connection::open_reader(&self.location, self.fetch_timeout)?
            }
        };
        Ok(PooledReader {
            conn: Some(conn),
            store: self,
        })
    }

    pub fn idle_reader_count(&self) -> usize {
        self.idle_readers.lock().map(|idle| idle.len()).unwrap_or(0)
    }

    // ===== Writes =====

    pub fn insert_user(&self, user: &UserIdentity) -> Result<()> {
        let conn = self.writer()?;
        UsersRepository::new(&conn).upsert(user)
    }

    pub fn insert_challenge(&self, challenge: &Challenge) -> Result<()> {
        let conn = self.writer()?;
        ChallengesRepository::new(&conn).insert(challenge)
    }

    pub fn insert_submission(&self, submission: &ChallengeSubmission) -> Result<i64> {
        let conn = self.writer()?;
        SubmissionsRepository::new(&conn).insert(submission)
    }

    /// Fold a finished session into the user's rollup in one transaction
    pub fn record_session(&self, user_id: &str, session: SessionSummary) -> Result<LearningProgress> {
        if user_id.is_empty() {
            return Err(Error::InvalidInput("user id must not be empty".to_string()));
        }

        let mut conn = self.writer()?;
        let tx = conn.transaction()?;
        let progress = {
            let repo = ProgressRepository::new(&tx);
            let mut progress = repo
                .get(user_id)?
                .unwrap_or_else(|| LearningProgress::new(user_id));
            progress.apply_session(session, self.date_provider.get_current_time());
            repo.save(&progress)?;
            progress
        };
        tx.commit()?;

        debug!(
            "Recorded session for {user_id}: {} sessions, streak {}",
            progress.total_sessions, progress.learning_streak
        );
        Ok(progress)
    }

    pub fn count_submissions(&self) -> Result<i64> {
        let conn = self.reader()?;
        SubmissionsRepository::new(&conn).count()
    }
}

impl EventStore for SqliteEventStore {
    fn fetch_submissions(&self, user_id: Option<&str>) -> Result<Vec<ChallengeSubmission>> {
        let conn = self.reader()?;
        let repo = SubmissionsRepository::new(&conn);
        match user_id {
            Some(user_id) => repo.for_user(user_id),
            None => repo.all(),
        }
    }

    fn fetch_users_by_role(&self, role: Role) -> Result<Vec<UserIdentity>> {
        let conn = self.reader()?;
        UsersRepository::new(&conn).by_role(role)
    }

    fn fetch_learning_progress(&self, user_id: &str) -> Result<LearningProgress> {
        let conn = self.reader()?;
        Ok(ProgressRepository::new(&conn)
            .get(user_id)?
            .unwrap_or_else(|| LearningProgress::new(user_id)))
    }

    fn fetch_user(&self, user_id: &str) -> Result<Option<UserIdentity>> {
        let conn = self.reader()?;
        UsersRepository::new(&conn).get(user_id)
    }

    fn fetch_challenge(&self, challenge_id: &str) -> Result<Option<Challenge>> {
        let conn = self.reader()?;
        ChallengesRepository::new(&conn).get(challenge_id)
    }

    fn fetch_challenge_submissions(&self, challenge_id: &str) -> Result<Vec<ChallengeSubmission>> {
        let conn = self.reader()?;
        SubmissionsRepository::new(&conn).for_challenge(challenge_id)
    }
}
