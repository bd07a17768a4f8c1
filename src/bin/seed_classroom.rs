use chrono::{Duration, Utc};
use classroom_insights::model::{Challenge, ChallengeSubmission, Difficulty, Role, UserIdentity};
use classroom_insights::session::StudySession;
use classroom_insights::store::SqliteEventStore;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::env;

const STUDENTS: [(&str, &str); 6] = [
    ("alice", "Alice Johnson"),
    ("bob", "Bob Smith"),
    ("charlie", "Charlie Brown"),
    ("diana", "Diana Prince"),
    ("emil", "Emil Novak"),
    ("farah", "Farah Haddad"),
];

const CHALLENGES: [(&str, &str, &str, Difficulty); 5] = [
    ("riddle-sphinx", "The Sphinx", "riddle", Difficulty::Easy),
    ("logic-bridges", "Seven Bridges", "logic_puzzle", Difficulty::Hard),
    ("words-anagram", "Anagram Hunt", "word_hunt", Difficulty::Medium),
    ("math-primes", "Prime Sprint", "math_challenge", Difficulty::Medium),
    ("trivia-planets", "Planet Trivia", "trivia", Difficulty::Easy),
];

const TOPICS: [&str; 8] = [
    "fractions",
    "photosynthesis",
    "world war ii",
    "poetry",
    "algebra",
    "ecology",
    "grammar",
    "probability",
];

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 || args.len() > 3 {
        eprintln!("Usage: {} <database_file> [seed]", args[0]);
        eprintln!();
        eprintln!("Writes a random demo classroom (students, challenges, submissions and");
        eprintln!("study sessions) into the database.");
        eprintln!();
        eprintln!("Example: {} classroom_insights.db 42", args[0]);
        std::process::exit(1);
    }

    let mut rng = match args.get(2) {
        Some(seed) => match seed.parse::<u64>() {
            Ok(seed) => StdRng::seed_from_u64(seed),
            Err(_) => {
                eprintln!("Error: seed must be a non-negative integer");
                std::process::exit(1);
            }
        },
        None => StdRng::from_entropy(),
    };

    let store = match SqliteEventStore::open(&args[1]) {
        Ok(store) => store,
        Err(e) => {
            eprintln!("Error opening database: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = seed(&store, &mut rng) {
        eprintln!("Error seeding database: {}", e);
        std::process::exit(1);
    }

    println!(
        "Seeded {} students, {} challenges into {}",
        STUDENTS.len(),
        CHALLENGES.len(),
        args[1]
    );
}

fn seed(store: &SqliteEventStore, rng: &mut StdRng) -> classroom_insights::error::Result<()> {
    let now = Utc::now();

    store.insert_user(&UserIdentity::new("teacher", "Ms. Rivera", "rivera@school.test", Role::Teacher))?;
    for (user_id, name) in STUDENTS {
        store.insert_user(&UserIdentity::new(user_id, name, &format!("{user_id}@school.test"), Role::Student))?;
    }

    for (challenge_id, title, challenge_type, difficulty) in CHALLENGES {
        store.insert_challenge(&Challenge {
            challenge_id: challenge_id.to_string(),
            title: title.to_string(),
            challenge_type: challenge_type.to_string(),
            difficulty,
            points: difficulty.default_points(),
            category: challenge_type.to_string(),
            created_at: now - Duration::days(30),
            is_active: true,
        })?;
    }

    for (user_id, _) in STUDENTS {
        // some students never take a challenge
        let attempts = rng.gen_range(0..=8);
        for _ in 0..attempts {
            let Some(&(challenge_id, _, _, difficulty)) = CHALLENGES.choose(rng) else {
                continue;
            };
            let is_correct = rng.gen_bool(0.7);
            let limit_secs = difficulty.time_limit_minutes() * 60;
            store.insert_submission(&ChallengeSubmission {
                user_id: user_id.to_string(),
                challenge_id: challenge_id.to_string(),
                is_correct,
                points_earned: if is_correct { difficulty.default_points() } else { 0 },
                time_spent: rng.gen_range(10..limit_secs),
                hints_used: rng.gen_range(0..=2),
                submitted_at: now - Duration::minutes(rng.gen_range(0..60 * 24 * 20)),
            })?;
        }

        let sessions = rng.gen_range(0..=12);
        for index in (0..sessions).rev() {
            let started_at = now - Duration::days(index) - Duration::hours(rng.gen_range(1..6));
            let mut session = StudySession::start(user_id, &format!("{user_id}-{index}"), started_at);
            for _ in 0..rng.gen_range(3..20) {
                session.record_message();
            }
            let topic_count = rng.gen_range(1..=3);
            for topic in TOPICS.choose_multiple(rng, topic_count) {
                session.add_topic(topic);
            }
            session.add_key_learning("Worked through guided examples");
            session.add_next_step("Practice with a harder set");
            let ended_at = started_at + Duration::minutes(rng.gen_range(10..90));
            store.record_session(user_id, session.finish(ended_at))?;
        }
    }

    Ok(())
}
