use crate::error::Result;
use crate::metrics::{ChallengeMetrics, compute_challenge_metrics};
use crate::model::{ChallengeSubmission, UserIdentity};
use crate::store::EventStore;
use chrono::{DateTime, Utc};
use log::debug;
use serde::Serialize;

/// One correct answer on a challenge's board
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeTopSubmission {
    pub user_id: String,
    pub display_name: String,
    pub email: String,
    #[serde(rename = "photoURL", skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    pub points_earned: u32,
    pub time_spent: u32,
    pub submitted_at: DateTime<Utc>,
    pub hints_used: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeLeaderboard {
    pub challenge_id: String,
    pub challenge_title: String,
    pub top_submissions: Vec<ChallengeTopSubmission>,
}

/// Best correct submissions of one challenge: points descending, then time
/// ascending. `None` when the challenge does not exist.
pub fn build_challenge_leaderboard<S>(
    store: &S,
    challenge_id: &str,
    limit: usize,
) -> Result<Option<ChallengeLeaderboard>>
where
    S: EventStore + ?Sized,
{
    let Some(challenge) = store.fetch_challenge(challenge_id)? else {
        debug!("Challenge {challenge_id} not found");
        return Ok(None);
    };

    let mut correct: Vec<ChallengeSubmission> = store
        .fetch_challenge_submissions(challenge_id)?
        .into_iter()
        .filter(|s| s.is_correct)
        .collect();
    correct.sort_by(|a, b| {
        b.points_earned
            .cmp(&a.points_earned)
            .then_with(|| a.time_spent.cmp(&b.time_spent))
    });
    correct.truncate(limit);

    let mut top_submissions = Vec::with_capacity(correct.len());
    for submission in correct {
        let user = store
            .fetch_user(&submission.user_id)?
            .unwrap_or_else(|| UserIdentity::unknown(&submission.user_id));
        top_submissions.push(ChallengeTopSubmission {
            user_id: submission.user_id,
            display_name: user.display_name,
            email: user.email,
            photo_url: user.photo_url,
            points_earned: submission.points_earned,
            time_spent: submission.time_spent,
            submitted_at: submission.submitted_at,
            hints_used: submission.hints_used,
        });
    }

    Ok(Some(ChallengeLeaderboard {
        challenge_id: challenge.challenge_id,
        challenge_title: challenge.title,
        top_submissions,
    }))
}

/// Challenge metrics of a single user
pub fn user_challenge_stats<S>(store: &S, user_id: &str) -> Result<ChallengeMetrics>
where
    S: EventStore + ?Sized,
{
    let submissions = store.fetch_submissions(Some(user_id))?;
    Ok(compute_challenge_metrics(&submissions))
}
