// src/services/sentiment.rs
//! Rule-based polarity scoring for post content.
//!
//! Any scorer that maps text to a polarity in [-1, 1] can stand in for the
//! default lexicon via [`SentimentScorer`].

use std::collections::HashMap;

pub trait SentimentScorer {
    /// Polarity in [-1, 1]; 0.0 when nothing scorable is found.
    fn polarity(&self, text: &str) -> f64;
}

/// General-purpose English polarity lexicon with negation and intensifiers.
pub struct LexiconScorer {
    words: HashMap<&'static str, f64>,
    negations: Vec<&'static str>,
    intensifiers: HashMap<&'static str, f64>,
}

impl Default for LexiconScorer {
    fn default() -> Self {
        Self::new()
    }
}

impl LexiconScorer {
    pub fn new() -> Self {
        let positive = [
            ("good", 0.7),
            ("great", 0.8),
            ("excellent", 1.0),
            ("amazing", 0.6),
            ("awesome", 1.0),
            ("wonderful", 1.0),
            ("fantastic", 0.4),
            ("brilliant", 0.9),
            ("beautiful", 0.85),
            ("best", 1.0),
            ("better", 0.5),
            ("nice", 0.6),
            ("happy", 0.8),
            ("glad", 0.5),
            ("love", 0.5),
            ("lovely", 0.5),
            ("like", 0.2),
            ("enjoy", 0.4),
            ("fun", 0.3),
            ("funny", 0.25),
            ("interesting", 0.5),
            ("exciting", 0.3),
            ("excited", 0.4),
            ("cool", 0.35),
            ("kind", 0.6),
            ("helpful", 0.5),
            ("perfect", 1.0),
            ("thanks", 0.2),
            ("thank", 0.2),
            ("agree", 0.3),
            ("hope", 0.3),
            ("hopeful", 0.4),
            ("curious", 0.2),
            ("fascinating", 0.6),
            ("impressive", 0.8),
            ("welcome", 0.8),
            ("fair", 0.7),
            ("calm", 0.3),
            ("true", 0.35),
            ("right", 0.3),
            ("win", 0.8),
            ("success", 0.6),
        ];
        let negative = [
            ("bad", -0.7),
            ("terrible", -1.0),
            ("awful", -1.0),
            ("horrible", -1.0),
            ("worst", -1.0),
            ("worse", -0.4),
            ("poor", -0.4),
            ("sad", -0.5),
            ("angry", -0.5),
            ("hate", -0.8),
            ("boring", -1.0),
            ("bored", -0.5),
            ("wrong", -0.5),
            ("ugly", -0.7),
            ("annoying", -0.8),
            ("annoyed", -0.5),
            ("disappointing", -0.6),
            ("disappointed", -0.75),
            ("stupid", -0.8),
            ("dumb", -0.4),
            ("useless", -0.5),
            ("scary", -0.5),
            ("afraid", -0.6),
            ("worried", -0.4),
            ("tired", -0.4),
            ("lonely", -0.5),
            ("broken", -0.4),
            ("fail", -0.5),
            ("failure", -0.6),
            ("problem", -0.3),
            ("difficult", -0.5),
            ("hard", -0.3),
            ("unfair", -0.5),
            ("confused", -0.4),
            ("sorry", -0.5),
            ("lose", -0.4),
            ("dangerous", -0.6),
            ("evil", -1.0),
            ("disgusting", -1.0),
            ("pathetic", -1.0),
        ];

        let mut words = HashMap::new();
        for (w, s) in positive.into_iter().chain(negative) {
            words.insert(w, s);
        }

        let negations = vec![
            "not", "no", "never", "neither", "nobody", "nothing", "none", "cannot", "cant",
            "don't", "dont", "doesn't", "doesnt", "didn't", "didnt", "won't", "wont",
            "isn't", "isnt", "aren't", "arent", "wasn't", "wasnt", "hardly", "barely",
        ];

        let intensifiers = HashMap::from([
            ("very", 1.3),
            ("really", 1.3),
            ("extremely", 1.5),
            ("so", 1.2),
            ("super", 1.4),
            ("totally", 1.3),
            ("incredibly", 1.5),
            ("slightly", 0.5),
            ("somewhat", 0.7),
            ("quite", 1.1),
        ]);

        Self {
            words,
            negations,
            intensifiers,
        }
    }

    pub fn score_word(&self, word: &str) -> Option<f64> {
        self.words.get(word).copied()
    }

    fn is_negation(&self, word: &str) -> bool {
        self.negations.iter().any(|n| *n == word)
    }
}

impl SentimentScorer for LexiconScorer {
    /// Mean of matched word scores. A negation flips and halves the next
    /// scored word; an intensifier scales it.
    fn polarity(&self, text: &str) -> f64 {
        let mut scores = Vec::new();
        let mut negate = false;
        let mut boost = 1.0;

        for token in tokenize(text) {
            if self.is_negation(&token) {
                negate = true;
                continue;
            }
            if let Some(mult) = self.intensifiers.get(token.as_str()) {
                boost = *mult;
                continue;
            }
            match self.score_word(&token) {
                Some(mut s) => {
                    if negate {
                        s *= -0.5;
                    }
                    scores.push((s * boost).clamp(-1.0, 1.0));
                    negate = false;
                    boost = 1.0;
                }
                None => {
                    negate = false;
                    boost = 1.0;
                }
            }
        }

        if scores.is_empty() {
            return 0.0;
        }
        (scores.iter().sum::<f64>() / scores.len() as f64).clamp(-1.0, 1.0)
    }
}

/// Lowercased word tokens; apostrophes stay inside words so "don't" survives.
fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !(c.is_alphanumeric() || c == '\''))
        .map(|t| t.trim_matches('\'').to_lowercase())
        .filter(|t| !t.is_empty())
}
