use serde::Serialize;
use std::fmt;

/// Challenge arena tier reached by accumulated points
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChallengeLevel {
    Beginner,
    Intermediate,
    Advanced,
    Expert,
    Master,
}

impl ChallengeLevel {
    pub const ALL: [ChallengeLevel; 5] = [
        ChallengeLevel::Beginner,
        ChallengeLevel::Intermediate,
        ChallengeLevel::Advanced,
        ChallengeLevel::Expert,
        ChallengeLevel::Master,
    ];

    pub fn required_points(&self) -> u64 {
        match self {
            ChallengeLevel::Beginner => 0,
            ChallengeLevel::Intermediate => 100,
            ChallengeLevel::Advanced => 300,
            ChallengeLevel::Expert => 600,
            ChallengeLevel::Master => 1000,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ChallengeLevel::Beginner => "Beginner",
            ChallengeLevel::Intermediate => "Intermediate",
            ChallengeLevel::Advanced => "Advanced",
            ChallengeLevel::Expert => "Expert",
            ChallengeLevel::Master => "Master",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            ChallengeLevel::Beginner => "🌱",
            ChallengeLevel::Intermediate => "📚",
            ChallengeLevel::Advanced => "🎯",
            ChallengeLevel::Expert => "🏆",
            ChallengeLevel::Master => "👑",
        }
    }

    /// Highest level whose threshold `points` reaches
    pub fn for_points(points: u64) -> Self {
        Self::ALL
            .into_iter()
            .rev()
            .find(|level| points >= level.required_points())
            .unwrap_or(ChallengeLevel::Beginner)
    }

    /// First level still out of reach, `None` once at the top
    pub fn next(points: u64) -> Option<Self> {
        Self::ALL.into_iter().find(|level| level.required_points() > points)
    }

    pub fn points_to_next(points: u64) -> Option<u64> {
        Self::next(points).map(|level| level.required_points() - points)
    }
}

impl fmt::Display for ChallengeLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.icon(), self.name())
    }
}
