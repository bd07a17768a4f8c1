use super::fan_out::{SkippedUser, gather_per_user};
use crate::error::Result;
use crate::metrics::compute_challenge_metrics;
use crate::model::{Role, StudentLeaderboardEntry, UserIdentity};
use crate::store::EventStore;
use log::{debug, info};
use serde::Serialize;
use std::cmp::Ordering;

pub const DEFAULT_LEADERBOARD_LIMIT: usize = 10;

/// Ranked students plus the ones whose records could not be fetched.
///
/// Empty `entries` with empty `skipped` means "no data yet"; a non-empty
/// `skipped` marks a partial result.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Leaderboard {
    pub entries: Vec<StudentLeaderboardEntry>,
    pub skipped: Vec<SkippedUser>,
}

impl Leaderboard {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_partial(&self) -> bool {
        !self.skipped.is_empty()
    }
}

/// Points descending, then correct answers descending, then average time
/// ascending
pub fn compare_entries(a: &StudentLeaderboardEntry, b: &StudentLeaderboardEntry) -> Ordering {
    b.total_points
        .cmp(&a.total_points)
        .then_with(|| b.correct_answers.cmp(&a.correct_answers))
        .then_with(|| a.average_time.total_cmp(&b.average_time))
}

/// Stable sort, so fully tied entries keep roster order
pub fn rank_entries(entries: &mut [StudentLeaderboardEntry]) {
    entries.sort_by(compare_entries);
}

/// Build the leaderboard row of one student, `None` if they never submitted
pub fn leaderboard_entry<S>(store: &S, user: &UserIdentity) -> Result<Option<StudentLeaderboardEntry>>
where
    S: EventStore + ?Sized,
{
    let submissions = store.fetch_submissions(Some(&user.user_id))?;
    debug!("Student {} has {} challenge submissions", user.user_id, submissions.len());

    let metrics = compute_challenge_metrics(&submissions);
    let Some(last_activity) = metrics.last_activity else {
        return Ok(None);
    };

    Ok(Some(StudentLeaderboardEntry {
        user_id: user.user_id.clone(),
        display_name: user.display_name.clone(),
        email: user.email.clone(),
        photo_url: user.photo_url.clone(),
        total_points: metrics.total_points,
        total_challenges: metrics.total_challenges,
        correct_answers: metrics.correct_answers,
        average_time: metrics.average_time,
        win_streak: metrics.win_streak,
        last_activity,
    }))
}

/// Rank every student with at least one submission and keep the top `limit`.
///
/// A student whose submissions cannot be fetched (transient failure) is left
/// out and reported in `skipped`. Failing to list the roster, or a malformed
/// record, fails the whole request.
pub fn build_leaderboard<S>(store: &S, limit: usize, max_concurrency: usize) -> Result<Leaderboard>
where
    S: EventStore + ?Sized,
{
    let students = store.fetch_users_by_role(Role::Student)?;
    debug!("Found {} students in roster", students.len());

    let gathered = gather_per_user(&students, max_concurrency, |user| leaderboard_entry(store, user))?;

    let mut entries = gathered.values;
    rank_entries(&mut entries);
    entries.truncate(limit);

    info!(
        "Leaderboard: {} entries, {} skipped",
        entries.len(),
        gathered.skipped.len()
    );
    Ok(Leaderboard {
        entries,
        skipped: gathered.skipped,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::model::ChallengeSubmission;
    use crate::store::MemoryEventStore;
    use chrono::{DateTime, Duration, NaiveDate, Utc};

    fn base() -> DateTime<Utc> {
        NaiveDate::from_ymd_opt(2025, 9, 1)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap()
            .and_utc()
    }

    fn submit(store: &mut MemoryEventStore, user: &str, minute: i64, correct: bool, points: u32, time: u32) {
        store.add_submission(ChallengeSubmission {
            user_id: user.to_string(),
            challenge_id: format!("c{minute}"),
            is_correct: correct,
            points_earned: points,
            time_spent: time,
            hints_used: 0,
            submitted_at: base() + Duration::minutes(minute),
        });
    }

    fn student(store: &mut MemoryEventStore, id: &str, name: &str) {
        store.add_user(UserIdentity::new(id, name, &format!("{id}@school.test"), Role::Student));
    }

    fn entry(points: u64, correct: u32, time: f64) -> StudentLeaderboardEntry {
        StudentLeaderboardEntry {
            user_id: format!("{points}-{correct}-{time}"),
            display_name: String::new(),
            email: String::new(),
            photo_url: None,
            total_points: points,
            total_challenges: correct,
            correct_answers: correct,
            average_time: time,
            win_streak: 0,
            last_activity: base(),
        }
    }

    #[test]
    fn test_three_student_scenario() {
        let mut store = MemoryEventStore::new();
        student(&mut store, "U1", "Uma");
        student(&mut store, "U2", "Ugo");
        student(&mut store, "U3", "Ula");
        submit(&mut store, "U1", 0, true, 10, 30);
        submit(&mut store, "U1", 1, true, 20, 30);
        submit(&mut store, "U1", 2, false, 0, 30);
        submit(&mut store, "U2", 0, true, 50, 45);

        let board = build_leaderboard(&store, 10, 2).unwrap();
        let ids: Vec<_> = board.entries.iter().map(|e| e.user_id.as_str()).collect();

        assert_eq!(ids, vec!["U2", "U1"]);
        assert_eq!(board.entries[0].total_points, 50);
        assert_eq!(board.entries[0].correct_answers, 1);
        assert_eq!(board.entries[1].total_points, 30);
        assert_eq!(board.entries[1].correct_answers, 2);
        assert_eq!(board.entries[1].win_streak, 0);
        assert!(!board.is_partial());
    }

    #[test]
    fn test_teachers_are_not_ranked() {
        let mut store = MemoryEventStore::new();
        store.add_user(UserIdentity::new("t1", "Ms. Lee", "", Role::Teacher));
        submit(&mut store, "t1", 0, true, 100, 5);

        let board = build_leaderboard(&store, 10, 4).unwrap();
        assert!(board.is_empty());
    }

    #[test]
    fn test_ties_broken_by_correct_then_time() {
        let mut entries = vec![entry(100, 3, 20.0), entry(100, 4, 50.0), entry(100, 4, 10.0), entry(120, 1, 99.0)];
        rank_entries(&mut entries);
        let order: Vec<_> = entries
            .iter()
            .map(|e| (e.total_points, e.correct_answers, e.average_time))
            .collect();
        assert_eq!(order, vec![(120, 1, 99.0), (100, 4, 10.0), (100, 4, 50.0), (100, 3, 20.0)]);
    }

    #[test]
    fn test_limit_truncates() {
        let mut store = MemoryEventStore::new();
        for i in 0..5 {
            let id = format!("s{i}");
            student(&mut store, &id, "Kid");
            submit(&mut store, &id, i, true, 10 * (i as u32 + 1), 20);
        }

        let board = build_leaderboard(&store, 3, 4).unwrap();
        assert_eq!(board.entries.len(), 3);
        assert_eq!(board.entries[0].user_id, "s4");

        let board = build_leaderboard(&store, 0, 4).unwrap();
        assert!(board.entries.is_empty());
    }

    #[test]
    fn test_unavailable_student_is_skipped() {
        let mut store = MemoryEventStore::new();
        student(&mut store, "a", "Ann");
        student(&mut store, "b", "Ben");
        submit(&mut store, "a", 0, true, 10, 10);
        submit(&mut store, "b", 0, true, 20, 10);
        store.mark_unavailable("b");

        let board = build_leaderboard(&store, 10, 2).unwrap();
        assert_eq!(board.entries.len(), 1);
        assert_eq!(board.entries[0].user_id, "a");
        assert!(board.is_partial());
        assert_eq!(board.skipped[0].user_id, "b");
    }

    #[test]
    fn test_offline_store_fails_request() {
        let mut store = MemoryEventStore::new();
        store.set_offline(true);
        assert!(matches!(build_leaderboard(&store, 10, 4), Err(Error::Unavailable(_))));
    }

    #[test]
    fn test_last_activity_is_latest_submission() {
        let mut store = MemoryEventStore::new();
        student(&mut store, "a", "Ann");
        submit(&mut store, "a", 30, true, 10, 10);
        submit(&mut store, "a", 5, true, 10, 10);

        let board = build_leaderboard(&store, 10, 1).unwrap();
        assert_eq!(board.entries[0].last_activity, base() + Duration::minutes(30));
        assert_eq!(board.entries[0].win_streak, 2);
    }
}
