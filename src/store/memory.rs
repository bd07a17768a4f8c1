//! In-process event store for tests and fixtures.
//!
//! Outages can be injected per user or for the whole store, so ranking code
//! can be exercised against partial failures without a database.

use super::EventStore;
use crate::error::{Error, Result};
use crate::model::{Challenge, ChallengeSubmission, LearningProgress, Role, SessionSummary, UserIdentity};
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};

#[derive(Debug, Default)]
pub struct MemoryEventStore {
    users: Vec<UserIdentity>,
    submissions: Vec<ChallengeSubmission>,
    challenges: HashMap<String, Challenge>,
    progress: HashMap<String, LearningProgress>,
    unavailable_users: HashSet<String>,
    offline: bool,
}

impl MemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a roster entry
    pub fn add_user(&mut self, user: UserIdentity) -> &mut Self {
        self.users.retain(|u| u.user_id != user.user_id);
        self.users.push(user);
        self
    }

    pub fn add_submission(&mut self, submission: ChallengeSubmission) -> &mut Self {
        self.submissions.push(submission);
        self
    }

    pub fn add_challenge(&mut self, challenge: Challenge) -> &mut Self {
        self.challenges.insert(challenge.challenge_id.clone(), challenge);
        self
    }

    pub fn put_progress(&mut self, progress: LearningProgress) -> &mut Self {
        self.progress.insert(progress.user_id.clone(), progress);
        self
    }

    /// Same rollup update the SQLite store performs at session end
    pub fn record_session(
        &mut self,
        user_id: &str,
        session: SessionSummary,
        recorded_at: DateTime<Utc>,
    ) -> &LearningProgress {
        let progress = self
            .progress
            .entry(user_id.to_string())
            .or_insert_with(|| LearningProgress::new(user_id));
        progress.apply_session(session, recorded_at);
        progress
    }

    /// Per-user fetches for this user fail with a transient error
    pub fn mark_unavailable(&mut self, user_id: &str) -> &mut Self {
        self.unavailable_users.insert(user_id.to_string());
        self
    }

    /// Every fetch fails with a transient error while offline
    pub fn set_offline(&mut self, offline: bool) -> &mut Self {
        self.offline = offline;
        self
    }

    fn check_online(&self) -> Result<()> {
        if self.offline {
            return Err(Error::Unavailable("memory store is offline".to_string()));
        }
        Ok(())
    }

    fn check_user(&self, user_id: &str) -> Result<()> {
        self.check_online()?;
        if self.unavailable_users.contains(user_id) {
            return Err(Error::Unavailable(format!("records of user '{user_id}' are unreachable")));
        }
        Ok(())
    }
}

impl EventStore for MemoryEventStore {
    fn fetch_submissions(&self, user_id: Option<&str>) -> Result<Vec<ChallengeSubmission>> {
        match user_id {
            Some(user_id) => {
                self.check_user(user_id)?;
                Ok(self
                    .submissions
                    .iter()
                    .filter(|s| s.user_id == user_id)
                    .cloned()
                    .collect())
            }
            None => {
                self.check_online()?;
                Ok(self.submissions.clone())
            }
        }
    }

    fn fetch_users_by_role(&self, role: Role) -> Result<Vec<UserIdentity>> {
        self.check_online()?;
        Ok(self.users.iter().filter(|u| u.role == role).cloned().collect())
    }

    fn fetch_learning_progress(&self, user_id: &str) -> Result<LearningProgress> {
        self.check_user(user_id)?;
        Ok(self
            .progress
            .get(user_id)
            .cloned()
            .unwrap_or_else(|| LearningProgress::new(user_id)))
    }

    fn fetch_user(&self, user_id: &str) -> Result<Option<UserIdentity>> {
        self.check_user(user_id)?;
        Ok(self.users.iter().find(|u| u.user_id == user_id).cloned())
    }

    fn fetch_challenge(&self, challenge_id: &str) -> Result<Option<Challenge>> {
        self.check_online()?;
        Ok(self.challenges.get(challenge_id).cloned())
    }

    fn fetch_challenge_submissions(&self, challenge_id: &str) -> Result<Vec<ChallengeSubmission>> {
        self.check_online()?;
        Ok(self
            .submissions
            .iter()
            .filter(|s| s.challenge_id == challenge_id)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_filter_and_replacement() {
        let mut store = MemoryEventStore::new();
        store
            .add_user(UserIdentity::new("u1", "Ana", "ana@school.test", Role::Student))
            .add_user(UserIdentity::new("t1", "Mr. Gray", "gray@school.test", Role::Teacher))
            .add_user(UserIdentity::new("u1", "Ana María", "ana@school.test", Role::Student));

        let students = store.fetch_users_by_role(Role::Student).unwrap();
        assert_eq!(students.len(), 1);
        assert_eq!(students[0].display_name, "Ana María");
    }

    #[test]
    fn test_unavailable_user_fails_transiently() {
        let mut store = MemoryEventStore::new();
        store.mark_unavailable("u2");

        assert!(store.fetch_submissions(Some("u1")).unwrap().is_empty());
        let err = store.fetch_submissions(Some("u2")).unwrap_err();
        assert!(err.is_transient());
        assert!(store.fetch_learning_progress("u2").unwrap_err().is_transient());
    }

    #[test]
    fn test_offline_store_fails_everything() {
        let mut store = MemoryEventStore::new();
        store.set_offline(true);
        assert!(store.fetch_users_by_role(Role::Student).is_err());
        assert!(store.fetch_submissions(None).is_err());
        store.set_offline(false);
        assert!(store.fetch_users_by_role(Role::Student).is_ok());
    }
}
