use chrono::{DateTime, Duration, NaiveDate, Utc};
use classroom_insights::config::{StoreConfig, StoreFactory};
use classroom_insights::error::Error;
use classroom_insights::model::{Challenge, ChallengeSubmission, Difficulty, Role, UserIdentity};
use classroom_insights::ranking::{
    ChallengeLevel, build_challenge_leaderboard, build_leaderboard, compare_entries,
};
use classroom_insights::store::{EventStore, MemoryEventStore, SqliteEventStore};
use std::cmp::Ordering;

fn base() -> DateTime<Utc> {
    NaiveDate::from_ymd_opt(2025, 10, 6)
        .unwrap()
        .and_hms_opt(9, 0, 0)
        .unwrap()
        .and_utc()
}

fn submission(user: &str, minute: i64, is_correct: bool, points: u32, time: u32) -> ChallengeSubmission {
    ChallengeSubmission {
        user_id: user.to_string(),
        challenge_id: "riddle-1".to_string(),
        is_correct,
        points_earned: points,
        time_spent: time,
        hints_used: 0,
        submitted_at: base() + Duration::minutes(minute),
    }
}

fn create_test_store() -> SqliteEventStore {
    let config = StoreConfig::builder().test_mode().build().unwrap();
    StoreFactory::create(&config).expect("Failed to create test store")
}

fn three_student_store() -> SqliteEventStore {
    let store = create_test_store();
    for id in ["U1", "U2", "U3"] {
        store
            .insert_user(&UserIdentity::new(id, &format!("Student {id}"), "", Role::Student))
            .unwrap();
    }
    // inserted out of chronological order on purpose
    store.insert_submission(&submission("U1", 2, false, 0, 40)).unwrap();
    store.insert_submission(&submission("U1", 0, true, 10, 20)).unwrap();
    store.insert_submission(&submission("U1", 1, true, 20, 30)).unwrap();
    store.insert_submission(&submission("U2", 0, true, 50, 45)).unwrap();
    store
}

#[test]
fn test_three_student_scenario_over_sqlite() {
    let store = three_student_store();

    let board = build_leaderboard(&store, 10, 4).unwrap();

    let ids: Vec<_> = board.entries.iter().map(|e| e.user_id.as_str()).collect();
    assert_eq!(ids, vec!["U2", "U1"]);

    let u2 = &board.entries[0];
    assert_eq!((u2.total_points, u2.correct_answers, u2.win_streak), (50, 1, 1));

    let u1 = &board.entries[1];
    assert_eq!(u1.total_points, 30);
    assert_eq!(u1.correct_answers, 2);
    assert_eq!(u1.total_challenges, 3);
    assert_eq!(u1.average_time, 30.0);
    assert_eq!(u1.win_streak, 0);
    assert_eq!(u1.last_activity, base() + Duration::minutes(2));
    assert!(board.skipped.is_empty());
}

#[test]
fn test_leaderboard_is_idempotent() {
    let store = three_student_store();
    let first = build_leaderboard(&store, 10, 3).unwrap();
    let second = build_leaderboard(&store, 10, 1).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_length_is_min_of_limit_and_eligible() {
    let mut store = MemoryEventStore::new();
    for i in 0..7u32 {
        let id = format!("s{i}");
        store.add_user(UserIdentity::new(&id, "Kid", "", Role::Student));
        // every third student never submits
        if i % 3 != 0 {
            store.add_submission(submission(&id, i64::from(i), true, 5 * i, 10));
        }
    }
    let eligible = 4;

    for limit in [0, 1, 3, 4, 10] {
        let board = build_leaderboard(&store, limit, 3).unwrap();
        assert_eq!(board.entries.len(), limit.min(eligible), "limit {limit}");
        assert!(board.entries.iter().all(|e| e.total_challenges > 0));
    }
}

#[test]
fn test_output_is_sorted_pairwise() {
    let mut store = MemoryEventStore::new();
    let profiles = [
        ("a", vec![(true, 30, 40), (false, 0, 10)]),
        ("b", vec![(true, 30, 20)]),
        ("c", vec![(true, 15, 5), (true, 15, 50)]),
        ("d", vec![(true, 15, 7), (true, 15, 9)]),
        ("e", vec![(false, 0, 1)]),
    ];
    for (id, attempts) in profiles {
        store.add_user(UserIdentity::new(id, id, "", Role::Student));
        for (minute, (correct, points, time)) in attempts.into_iter().enumerate() {
            store.add_submission(submission(id, minute as i64, correct, points, time));
        }
    }

    let board = build_leaderboard(&store, 10, 2).unwrap();
    assert_eq!(board.entries.len(), 5);
    for pair in board.entries.windows(2) {
        assert_ne!(compare_entries(&pair[0], &pair[1]), Ordering::Greater);
    }
    let ids: Vec<_> = board.entries.iter().map(|e| e.user_id.as_str()).collect();
    assert_eq!(ids, vec!["d", "c", "b", "a", "e"]);
}

#[test]
fn test_partial_result_when_one_student_is_unreachable() {
    let mut store = MemoryEventStore::new();
    for id in ["a", "b", "c"] {
        store.add_user(UserIdentity::new(id, id, "", Role::Student));
        store.add_submission(submission(id, 0, true, 10, 10));
    }
    store.mark_unavailable("b");

    let board = build_leaderboard(&store, 10, 3).unwrap();
    assert_eq!(board.entries.len(), 2);
    assert!(board.is_partial());
    assert_eq!(board.skipped[0].user_id, "b");
}

#[test]
fn test_malformed_row_aborts_request() {
    let file = tempfile::NamedTempFile::new().unwrap();
    let path = file.path().to_str().unwrap().to_string();

    let store = SqliteEventStore::open(&path).unwrap();
    store
        .insert_user(&UserIdentity::new("u1", "Uma", "", Role::Student))
        .unwrap();
    drop(store);

    let conn = rusqlite::Connection::open(&path).unwrap();
    conn.execute(
        "INSERT INTO challenge_submissions
            (user_id, challenge_id, is_correct, points_earned, time_spent, hints_used, submitted_at)
         VALUES ('u1', 'c1', 1, -10, 5, 0, '2025-10-06T09:00:00+00:00')",
        [],
    )
    .unwrap();
    drop(conn);

    let store = SqliteEventStore::open(&path).unwrap();
    let err = build_leaderboard(&store, 10, 2).unwrap_err();
    assert!(matches!(err, Error::Malformed { record: "submission", .. }), "{err:?}");
}

#[test]
fn test_challenge_board_over_sqlite() {
    let store = three_student_store();
    store
        .insert_challenge(&Challenge {
            challenge_id: "riddle-1".to_string(),
            title: "The Sphinx".to_string(),
            challenge_type: "riddle".to_string(),
            difficulty: Difficulty::Easy,
            points: 10,
            category: "logic".to_string(),
            created_at: base(),
            is_active: true,
        })
        .unwrap();

    let board = build_challenge_leaderboard(&store, "riddle-1", 2).unwrap().unwrap();
    let rows: Vec<_> = board
        .top_submissions
        .iter()
        .map(|s| (s.user_id.as_str(), s.points_earned))
        .collect();
    assert_eq!(rows, vec![("U2", 50), ("U1", 20)]);
    assert_eq!(board.top_submissions[0].display_name, "Student U2");

    assert!(build_challenge_leaderboard(&store, "missing", 2).unwrap().is_none());
}

#[test]
fn test_levels_follow_leaderboard_points() {
    let store = three_student_store();
    let board = build_leaderboard(&store, 10, 1).unwrap();
    let levels: Vec<_> = board
        .entries
        .iter()
        .map(|e| ChallengeLevel::for_points(e.total_points))
        .collect();
    assert_eq!(levels, vec![ChallengeLevel::Beginner, ChallengeLevel::Beginner]);
    assert_eq!(ChallengeLevel::points_to_next(board.entries[0].total_points), Some(50));
}

#[test]
fn test_roster_listing_excludes_teachers() {
    let store = three_student_store();
    store
        .insert_user(&UserIdentity::new("t1", "Teacher", "t@school.test", Role::Teacher))
        .unwrap();
    assert_eq!(store.fetch_users_by_role(Role::Student).unwrap().len(), 3);
    assert_eq!(store.fetch_users_by_role(Role::Teacher).unwrap().len(), 1);
}

#[test]
fn test_file_backed_fan_out_matches_sequential_run() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fan_out.db");
    let store = SqliteEventStore::open(path.to_str().unwrap()).unwrap();
    for i in 0..8u32 {
        let id = format!("kid{i}");
        store
            .insert_user(&UserIdentity::new(&id, "Kid", "", Role::Student))
            .unwrap();
        store
            .insert_submission(&submission(&id, i64::from(i), i % 2 == 0, 10 * (i % 3), 5 + i))
            .unwrap();
    }

    let parallel = build_leaderboard(&store, 10, 4).unwrap();
    let sequential = build_leaderboard(&store, 10, 1).unwrap();

    assert_eq!(parallel, sequential);
    assert_eq!(parallel.entries.len(), 8);
    // one reader per worker at most, all returned afterwards
    assert!((1..=4).contains(&store.idle_reader_count()));
}
