// src/pedagogy.rs

//! Adaptive quiz ordering.
//!
//! Quiz questions are graded strictly right/wrong, so they get no bucket or
//! due date. Instead the cumulative wrong-answer count per question drives a
//! weakest-first ordering, and per-topic accuracy drives the weak-topic list
//! and the overall mastery percentage.

use crate::constants::WEAK_TOPIC_LIMIT;
use crate::models::ItemIndex;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// --- Wrong Counts ---

/// Cumulative wrong answers per question. Persisted as `{ "<index>": count }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WrongCounts(BTreeMap<ItemIndex, u32>);

impl WrongCounts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts a wrong answer; correct answers leave the tally alone.
    pub fn record(&mut self, index: ItemIndex, correct: bool) -> u32 {
        let count = self.0.entry(index).or_insert(0);
        if !correct {
            *count = count.saturating_add(1);
        }
        *count
    }

    pub fn get(&self, index: ItemIndex) -> u32 {
        self.0.get(&index).copied().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.0.values().all(|&c| c == 0)
    }
}

impl FromIterator<(ItemIndex, u32)> for WrongCounts {
    fn from_iter<I: IntoIterator<Item = (ItemIndex, u32)>>(iter: I) -> Self {
        WrongCounts(iter.into_iter().collect())
    }
}

/// Orders `0..item_count` by descending wrong count. Ties keep their original
/// relative order; indices with no entry count as zero.
pub fn rank_by_weakness(item_count: usize, wrong_counts: &WrongCounts) -> Vec<ItemIndex> {
    let mut order: Vec<ItemIndex> = (0..item_count).collect();
    // sort_by_key is stable
    order.sort_by_key(|&i| std::cmp::Reverse(wrong_counts.get(i)));
    debug!("[Quiz Rank] {} items, head: {:?}", item_count, order.first());
    order
}

/// Stable partition placing items whose topic is in `weak` first.
pub fn prioritize_topics<S: AsRef<str>>(item_topics: &[Option<S>], weak: &[String]) -> Vec<ItemIndex> {
    let is_weak = |i: &ItemIndex| {
        item_topics[*i].as_ref().is_some_and(|t| {
            let t: &str = t.as_ref();
            weak.iter().any(|w| w == t)
        })
    };
    let (mut first, rest): (Vec<ItemIndex>, Vec<ItemIndex>) =
        (0..item_topics.len()).partition(is_weak);
    first.extend(rest);
    first
}

// --- Topic Statistics ---

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicStat {
    pub correct: u32,
    pub total: u32,
}

impl TopicStat {
    pub fn accuracy(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.correct as f64 / self.total as f64
        }
    }
}

/// Per-topic correct/total tallies for one collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicStats {
    #[serde(default)]
    pub topics: BTreeMap<String, TopicStat>,
    #[serde(default)]
    pub total: u32,
}

impl TopicStats {
    pub fn record(&mut self, topic: &str, correct: bool) {
        let stat = self.topics.entry(topic.to_string()).or_default();
        stat.total += 1;
        if correct {
            stat.correct += 1;
        }
        self.total += 1;
        debug!(
            "[Topic Stats] {}: {}/{} (overall answers: {})",
            topic, stat.correct, stat.total, self.total
        );
    }

    /// Topics with the lowest accuracy first, ties broken by name.
    ///
    /// Name order is used instead of first-recorded order: the persisted stats
    /// carry no insertion history, so name order is the one that survives a
    /// reload unchanged.
    pub fn weak_topics(&self, limit: usize) -> Vec<String> {
        let mut pairs: Vec<(&String, f64)> = self
            .topics
            .iter()
            .map(|(topic, stat)| (topic, stat.accuracy()))
            .collect();
        // BTreeMap iteration is already name-ordered; a stable sort keeps it for ties.
        pairs.sort_by(|a, b| a.1.total_cmp(&b.1));
        pairs
            .into_iter()
            .take(limit)
            .map(|(topic, _)| topic.clone())
            .collect()
    }

    pub fn default_weak_topics(&self) -> Vec<String> {
        self.weak_topics(WEAK_TOPIC_LIMIT)
    }

    /// Mean per-topic accuracy as a rounded percentage; 0 with no topics.
    pub fn mastery_percent(&self) -> u32 {
        if self.topics.is_empty() {
            return 0;
        }
        let sum: f64 = self.topics.values().map(TopicStat::accuracy).sum();
        (100.0 * sum / self.topics.len() as f64).round() as u32
    }
}
