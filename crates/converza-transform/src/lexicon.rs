use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::TransformError;

const CONVERSION_PATTERNS: &[&str] = &[
    r"yes.*(?:book|appointment|schedule)",
    r"sign\s+me\s+up",
    r"(?:let's|lets)\s+(?:proceed|move\s+forward)",
    r"i(?:'ll|'d|'m)\s+(?:take|buy|purchase)",
    r"(?:sounds?|that's?)\s+(?:perfect|great|good).*(?:do\s+it|proceed)",
    r"i'm\s+(?:ready|interested|in)",
    r"count\s+me\s+in",
    r"let's\s+get\s+started",
    r"i\s+want\s+(?:to|it)",
    r"go\s+ahead",
];

const UPSELL_PATTERNS: &[&str] = &[
    r"(?:premium|deluxe|pro)\s+(?:package|version|tier|plan)",
    r"(?:extended|additional)\s+(?:warranty|coverage|protection)",
    r"(?:upgrade|add|include)\s+(?:to|the)",
    r"(?:extra|additional)\s+(?:features?|services?)",
    r"(?:express|priority)\s+(?:delivery|shipping|service)",
    r"(?:maintenance|support)\s+(?:plan|package)",
    r"insurance\s+(?:package|coverage)",
    r"installation\s+service",
];

const POSITIVE_KEYWORDS: &[&str] = &[
    "excellent", "fantastic", "great", "wonderful", "amazing",
    "perfect", "outstanding", "impressive", "satisfied", "happy",
    "helpful", "professional", "recommend", "pleased", "delighted",
    "love", "best", "awesome", "brilliant", "superb",
];

const NEGATIVE_KEYWORDS: &[&str] = &[
    "terrible", "horrible", "awful", "disappointed", "frustrated",
    "unacceptable", "poor", "bad", "worst", "angry",
    "upset", "unsatisfied", "ridiculous", "waste", "useless",
    "unprofessional", "rude", "incompetent", "disgusted", "pathetic",
];

const NEGATION_WORDS: &[&str] = &[
    "not", "no", "never", "neither", "nor",
    "don't", "doesn't", "didn't", "won't", "wouldn't",
    "shouldn't", "couldn't", "can't", "cannot",
];

/// Phrase patterns and word lists that drive every heuristic.
///
/// A lexicon is plain data; [`TranscriptAnalyzer`](crate::TranscriptAnalyzer)
/// compiles it once and never mutates it afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Lexicon {
    pub conversion_patterns: Vec<String>,
    pub upsell_patterns: Vec<String>,
    pub positive_keywords: Vec<String>,
    pub negative_keywords: Vec<String>,
    pub negation_words: Vec<String>,
}

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Lexicon {
    /// The call-center lexicon the pipeline ships with.
    pub fn builtin() -> Self {
        Self {
            conversion_patterns: owned(CONVERSION_PATTERNS),
            upsell_patterns: owned(UPSELL_PATTERNS),
            positive_keywords: owned(POSITIVE_KEYWORDS),
            negative_keywords: owned(NEGATIVE_KEYWORDS),
            negation_words: owned(NEGATION_WORDS),
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self, TransformError> {
        Ok(serde_json::from_str(json)?)
    }
}

impl Default for Lexicon {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Join alternatives into one case-insensitive regex, first alternative wins.
pub(crate) fn compile_alternation(
    kind: &'static str,
    patterns: &[String],
) -> Result<Regex, TransformError> {
    if patterns.is_empty() {
        return Err(TransformError::EmptyPatterns { kind });
    }
    Regex::new(&format!("(?i){}", patterns.join("|")))
        .map_err(|source| TransformError::Pattern { kind, source })
}

/// Lower-cased word set for token lookups.
pub(crate) fn word_set(words: &[String]) -> HashSet<String> {
    words.iter().map(|w| w.trim().to_lowercase()).collect()
}
