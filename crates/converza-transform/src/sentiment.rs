use std::collections::HashSet;
use std::sync::LazyLock;

use converza_core::{SentimentLabel, SentimentResult};
use regex::Regex;

use crate::lexicon::{word_set, Lexicon};

/// How many preceding tokens can negate a keyword.
const NEGATION_WINDOW: usize = 2;
/// |score| must exceed this to leave neutral.
const POLARITY_THRESHOLD: f64 = 0.2;
/// Keyword hits at which confidence saturates.
const SATURATION_HITS: f64 = 20.0;

/// Word tokens. Apostrophes split words, so `it's` is `it` and `s`.
static TOKEN_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b\w+\b").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Polarity {
    Positive,
    Negative,
}

/// Lexicon + negation-window sentiment scorer.
#[derive(Debug, Clone)]
pub struct SentimentAnalyzer {
    positive: HashSet<String>,
    negative: HashSet<String>,
    negation: HashSet<String>,
}

impl SentimentAnalyzer {
    pub fn new(lexicon: &Lexicon) -> Self {
        Self {
            positive: word_set(&lexicon.positive_keywords),
            negative: word_set(&lexicon.negative_keywords),
            negation: word_set(&lexicon.negation_words),
        }
    }

    pub fn analyze(&self, transcript: &str) -> SentimentResult {
        if transcript.is_empty() {
            return SentimentResult::neutral();
        }

        let lowered = transcript.to_lowercase();
        let tokens: Vec<&str> = TOKEN_PATTERN
            .find_iter(&lowered)
            .map(|m| m.as_str())
            .collect();

        let mut positive_hits: u32 = 0;
        let mut negative_hits: u32 = 0;
        for (i, token) in tokens.iter().enumerate() {
            let polarity = if self.positive.contains(*token) {
                Polarity::Positive
            } else if self.negative.contains(*token) {
                Polarity::Negative
            } else {
                continue;
            };

            match (polarity, self.is_negated(&tokens, i)) {
                (Polarity::Positive, false) | (Polarity::Negative, true) => {
                    positive_hits = positive_hits.saturating_add(1)
                }
                (Polarity::Positive, true) | (Polarity::Negative, false) => {
                    negative_hits = negative_hits.saturating_add(1)
                }
            }
        }

        classify_counts(positive_hits, negative_hits)
    }

    fn is_negated(&self, tokens: &[&str], index: usize) -> bool {
        tokens[index.saturating_sub(NEGATION_WINDOW)..index]
            .iter()
            .any(|t| self.negation.contains(*t))
    }
}

/// Turn keyword hit counts into a label and confidence.
///
/// No hits at all is maximum uncertainty (neutral, 0.5), not zero confidence.
pub fn classify_counts(positive_hits: u32, negative_hits: u32) -> SentimentResult {
    let total = u64::from(positive_hits) + u64::from(negative_hits);
    if total == 0 {
        return SentimentResult::neutral();
    }

    let score = (f64::from(positive_hits) - f64::from(negative_hits)) / total as f64;
    let label = if score > POLARITY_THRESHOLD {
        SentimentLabel::Positive
    } else if score < -POLARITY_THRESHOLD {
        SentimentLabel::Negative
    } else {
        SentimentLabel::Neutral
    };

    SentimentResult {
        label,
        confidence: (total as f64 / SATURATION_HITS).min(1.0),
        positive_hits,
        negative_hits,
    }
}
