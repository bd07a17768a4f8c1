use crate::model::SessionSummary;
use serde::Serialize;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopicCount {
    pub topic: String,
    pub count: u32,
}

/// Topic tally with the minutes of the sessions that covered it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopicStat {
    pub topic: String,
    pub count: u32,
    pub time: u64,
}

/// Most frequent topics, highest count first. Ties keep first-encountered
/// order.
pub fn compute_top_topics<'a, I>(sessions: I, limit: usize) -> Vec<TopicCount>
where
    I: IntoIterator<Item = &'a SessionSummary>,
{
    compute_topic_stats(sessions, limit)
        .into_iter()
        .map(|stat| TopicCount {
            topic: stat.topic,
            count: stat.count,
        })
        .collect()
}

/// Like [`compute_top_topics`] but also sums session minutes per topic
pub fn compute_topic_stats<'a, I>(sessions: I, limit: usize) -> Vec<TopicStat>
where
    I: IntoIterator<Item = &'a SessionSummary>,
{
    let mut stats: Vec<TopicStat> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for session in sessions {
        for topic in &session.topics {
            let slot = *index.entry(topic.as_str()).or_insert_with(|| {
                stats.push(TopicStat {
                    topic: topic.clone(),
                    count: 0,
                    time: 0,
                });
                stats.len() - 1
            });
            stats[slot].count += 1;
            stats[slot].time += u64::from(session.duration);
        }
    }

    // sort_by is stable, which gives the first-encountered tie-break
    stats.sort_by(|a, b| b.count.cmp(&a.count));
    stats.truncate(limit);
    stats
}

/// Number of distinct topics across the sessions
pub fn count_distinct_topics<'a, I>(sessions: I) -> usize
where
    I: IntoIterator<Item = &'a SessionSummary>,
{
    sessions
        .into_iter()
        .flat_map(|session| session.topics.iter())
        .collect::<HashSet<_>>()
        .len()
}
