// src/services/stats.rs
//! Scalar run statistics and the per-bot activity table.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

use crate::services::posts::EnrichedPost;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub total_posts: usize,
    pub bot_count: usize,
    pub duration_minutes: f64,
    pub avg_words_per_post: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BotActivity {
    pub bot_name: String,
    pub post_count: usize,
    pub avg_word_count: f64,
}

pub fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// Sorted, deduplicated bot names.
pub fn distinct_bots(posts: &[EnrichedPost]) -> Vec<String> {
    posts
        .iter()
        .map(|p| p.bot_name.as_str())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

pub fn summarize(posts: &[EnrichedPost]) -> RunSummary {
    let total_posts = posts.len();
    let duration_minutes = match (
        posts.iter().map(|p| p.timestamp).min(),
        posts.iter().map(|p| p.timestamp).max(),
    ) {
        (Some(first), Some(last)) => {
            let ms = (last - first).num_milliseconds().max(0);
            round2(ms as f64 / 60_000.0)
        }
        _ => 0.0,
    };
    let avg_words_per_post = if total_posts == 0 {
        0.0
    } else {
        let words: usize = posts.iter().map(|p| p.word_count).sum();
        round2(words as f64 / total_posts as f64)
    };

    RunSummary {
        total_posts,
        bot_count: distinct_bots(posts).len(),
        duration_minutes,
        avg_words_per_post,
    }
}

/// One row per bot, ordered by name.
pub fn bot_activity(posts: &[EnrichedPost]) -> Vec<BotActivity> {
    let mut groups: BTreeMap<&str, (usize, usize)> = BTreeMap::new();
    for p in posts {
        let entry = groups.entry(p.bot_name.as_str()).or_insert((0, 0));
        entry.0 += 1;
        entry.1 += p.word_count;
    }
    groups
        .into_iter()
        .map(|(name, (count, words))| BotActivity {
            bot_name: name.to_string(),
            post_count: count,
            avg_word_count: round2(words as f64 / count as f64),
        })
        .collect()
}
