use crate::model::ChallengeSubmission;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Scalar challenge metrics for one user
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeMetrics {
    pub total_points: u64,
    pub total_challenges: u32,
    pub correct_answers: u32,
    /// Mean seconds per submission, 0 when there are none
    pub average_time: f64,
    pub win_streak: u32,
    pub last_activity: Option<DateTime<Utc>>,
}

impl ChallengeMetrics {
    pub fn accuracy_percentage(&self) -> f64 {
        if self.total_challenges == 0 {
            0.0
        } else {
            f64::from(self.correct_answers) / f64::from(self.total_challenges) * 100.0
        }
    }
}

/// Derive totals, average time and the trailing win streak from one user's
/// submissions. Input order does not matter.
pub fn compute_challenge_metrics(submissions: &[ChallengeSubmission]) -> ChallengeMetrics {
    let total_challenges = u32::try_from(submissions.len()).unwrap_or(u32::MAX);
    let correct_answers =
        u32::try_from(submissions.iter().filter(|s| s.is_correct).count()).unwrap_or(u32::MAX);
    let total_points: u64 = submissions.iter().map(|s| u64::from(s.points_earned)).sum();
    let total_time: u64 = submissions.iter().map(|s| u64::from(s.time_spent)).sum();

    let average_time = if submissions.is_empty() {
        0.0
    } else {
        total_time as f64 / submissions.len() as f64
    };

    ChallengeMetrics {
        total_points,
        total_challenges,
        correct_answers,
        average_time,
        win_streak: compute_win_streak(submissions),
        last_activity: submissions.iter().map(|s| s.submitted_at).max(),
    }
}

/// Length of the run of correct answers at the end of the user's history.
///
/// Submissions are ordered by `submitted_at` with a stable sort, so equal
/// timestamps keep their input order.
pub fn compute_win_streak(submissions: &[ChallengeSubmission]) -> u32 {
    let mut ordered: Vec<&ChallengeSubmission> = submissions.iter().collect();
    ordered.sort_by_key(|s| s.submitted_at);

    let streak = ordered.iter().rev().take_while(|s| s.is_correct).count();
    u32::try_from(streak).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn base() -> DateTime<Utc> {
        NaiveDate::from_ymd_opt(2025, 2, 1)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
            .and_utc()
    }

    fn submission(minutes: i64, is_correct: bool, points: u32, time: u32) -> ChallengeSubmission {
        ChallengeSubmission {
            user_id: "u1".to_string(),
            challenge_id: format!("c{minutes}"),
            is_correct,
            points_earned: points,
            time_spent: time,
            hints_used: 0,
            submitted_at: base() + Duration::minutes(minutes),
        }
    }

    #[test]
    fn test_empty_submissions_have_zero_average() {
        let metrics = compute_challenge_metrics(&[]);
        assert_eq!(metrics.total_challenges, 0);
        assert_eq!(metrics.average_time, 0.0);
        assert_eq!(metrics.win_streak, 0);
        assert_eq!(metrics.last_activity, None);
        assert_eq!(metrics.accuracy_percentage(), 0.0);
    }

    #[test]
    fn test_totals_and_average() {
        let subs = vec![
            submission(0, true, 10, 30),
            submission(1, true, 20, 60),
            submission(2, false, 0, 90),
        ];
        let metrics = compute_challenge_metrics(&subs);

        assert_eq!(metrics.total_points, 30);
        assert_eq!(metrics.total_challenges, 3);
        assert_eq!(metrics.correct_answers, 2);
        assert_eq!(metrics.average_time, 60.0);
        assert_eq!(metrics.last_activity, Some(base() + Duration::minutes(2)));
        assert!((metrics.accuracy_percentage() - 66.666).abs() < 0.01);
    }

    #[test]
    fn test_last_incorrect_zeroes_streak() {
        let subs = vec![
            submission(0, true, 10, 5),
            submission(1, true, 10, 5),
            submission(2, true, 10, 5),
            submission(3, false, 0, 5),
        ];
        assert_eq!(compute_win_streak(&subs), 0);
    }

    #[test]
    fn test_streak_counts_trailing_correct_after_sorting() {
        // stored newest first, as a store might return them
        let subs = vec![
            submission(4, true, 10, 5),
            submission(3, true, 10, 5),
            submission(2, false, 0, 5),
            submission(1, true, 10, 5),
        ];
        assert_eq!(compute_win_streak(&subs), 2);
    }

    #[test]
    fn test_all_correct_streak_is_full_length() {
        let subs: Vec<_> = (0..5).map(|i| submission(i, true, 10, 5)).collect();
        assert_eq!(compute_win_streak(&subs), 5);
    }

    #[test]
    fn test_equal_timestamps_keep_input_order() {
        let mut first = submission(0, false, 0, 5);
        let mut second = submission(0, true, 10, 5);
        first.challenge_id = "first".to_string();
        second.challenge_id = "second".to_string();

        // stable: the later element in input order is treated as more recent
        assert_eq!(compute_win_streak(&[first.clone(), second.clone()]), 1);
        assert_eq!(compute_win_streak(&[second, first]), 0);
    }
}
