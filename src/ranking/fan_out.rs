use crate::error::{Error, Result};
use crate::model::UserIdentity;
use log::{error, warn};
use serde::Serialize;
use std::thread;

/// Outcome of a per-user step whose transient failures were set aside
pub struct Gathered<T> {
    pub values: Vec<T>,
    pub skipped: Vec<SkippedUser>,
}

/// A user left out of a result because their records could not be fetched
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedUser {
    pub user_id: String,
    pub reason: String,
}

/// Run `work` for every user on at most `max_concurrency` scoped threads.
///
/// Results come back in roster order whatever the scheduling was.
pub fn run_per_user<T, F>(users: &[UserIdentity], max_concurrency: usize, work: F) -> Vec<Result<T>>
where
    T: Send,
    F: Fn(&UserIdentity) -> Result<T> + Sync,
{
    if users.is_empty() {
        return Vec::new();
    }

    let workers = max_concurrency.clamp(1, users.len());
    if workers == 1 {
        return users.iter().map(&work).collect();
    }

    let chunk_size = users.len().div_ceil(workers);
    let work = &work;
    thread::scope(|scope| {
        let handles: Vec<_> = users
            .chunks(chunk_size)
            .map(|chunk| (chunk, scope.spawn(move || chunk.iter().map(work).collect::<Vec<_>>())))
            .collect();

        handles
            .into_iter()
            .flat_map(|(chunk, handle)| match handle.join() {
                Ok(results) => results,
                Err(_) => {
                    error!("Worker panicked while processing {} users", chunk.len());
                    chunk
                        .iter()
                        .map(|user| {
                            Err(Error::Unavailable(format!("worker for user '{}' panicked", user.user_id)))
                        })
                        .collect()
                }
            })
            .collect()
    })
}

/// Fan `work` out over the roster, skip users whose fetch failed transiently
/// and abort on the first other error.
///
/// `work` returns `None` for users that should be left out without counting
/// as skipped.
pub fn gather_per_user<T, F>(users: &[UserIdentity], max_concurrency: usize, work: F) -> Result<Gathered<T>>
where
    T: Send,
    F: Fn(&UserIdentity) -> Result<Option<T>> + Sync,
{
    let mut gathered = Gathered {
        values: Vec::with_capacity(users.len()),
        skipped: Vec::new(),
    };

    for (user, result) in users.iter().zip(run_per_user(users, max_concurrency, work)) {
        match result {
            Ok(Some(value)) => gathered.values.push(value),
            Ok(None) => {}
            Err(err) if err.is_transient() => {
                warn!("Skipping user {}: {err}", user.user_id);
                gathered.skipped.push(SkippedUser {
                    user_id: user.user_id.clone(),
                    reason: err.to_string(),
                });
            }
            Err(err) => return Err(err),
        }
    }

    Ok(gathered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Role;

    fn roster(n: usize) -> Vec<UserIdentity> {
        (0..n)
            .map(|i| UserIdentity::new(&format!("u{i}"), &format!("User {i}"), "", Role::Student))
            .collect()
    }

    #[test]
    fn test_results_keep_roster_order() {
        let users = roster(9);
        for concurrency in [1, 2, 4, 16] {
            let ids: Vec<String> = run_per_user(&users, concurrency, |u| Ok(u.user_id.clone()))
                .into_iter()
                .map(|r| r.unwrap())
                .collect();
            let expected: Vec<String> = users.iter().map(|u| u.user_id.clone()).collect();
            assert_eq!(ids, expected, "concurrency {concurrency}");
        }
    }

    #[test]
    fn test_empty_roster() {
        let results: Vec<Result<u32>> = run_per_user(&[], 4, |_| Ok(1));
        assert!(results.is_empty());
    }

    #[test]
    fn test_transient_failures_are_skipped() {
        let users = roster(4);
        let gathered = gather_per_user(&users, 2, |u| {
            if u.user_id == "u2" {
                Err(Error::Unavailable("timed out".to_string()))
            } else if u.user_id == "u3" {
                Ok(None)
            } else {
                Ok(Some(u.user_id.clone()))
            }
        })
        .unwrap();

        assert_eq!(gathered.values, vec!["u0", "u1"]);
        assert_eq!(gathered.skipped.len(), 1);
        assert_eq!(gathered.skipped[0].user_id, "u2");
    }

    #[test]
    fn test_non_transient_failure_aborts() {
        let users = roster(3);
        let result = gather_per_user(&users, 3, |u| {
            if u.user_id == "u1" {
                Err(Error::malformed("submission", "42", "bad timestamp"))
            } else {
                Ok(Some(()))
            }
        });
        assert!(matches!(result, Err(Error::Malformed { .. })));
    }

    #[test]
    fn test_panicking_worker_becomes_unavailable() {
        let users = roster(4);
        let results = run_per_user(&users, 4, |u| {
            if u.user_id == "u3" {
                panic!("boom");
            }
            Ok(())
        });
        assert!(results[0].is_ok());
        assert!(results[3].as_ref().unwrap_err().is_transient());
    }
}
