use converza_core::text::truncate_chars;
use converza_core::{ConversionResult, MAX_PHRASE_CHARS};
use regex::Regex;

use crate::error::TransformError;
use crate::lexicon::{compile_alternation, Lexicon};

/// Confidence floor for any matched commitment phrase.
const BASE_CONFIDENCE: f64 = 0.7;
/// Extra confidence earned by a match at the very end of the call.
const POSITION_WEIGHT: f64 = 0.3;

/// Detects affirmative commitment language ("sign me up", "go ahead", ...).
#[derive(Debug, Clone)]
pub struct ConversionDetector {
    pattern: Regex,
}

impl ConversionDetector {
    pub fn new(lexicon: &Lexicon) -> Result<Self, TransformError> {
        Ok(Self {
            pattern: compile_alternation("conversion", &lexicon.conversion_patterns)?,
        })
    }

    /// First match wins. Later matches score higher: a commitment made after
    /// the agent's pitch is a stronger signal than an early "yes".
    pub fn detect(&self, transcript: &str) -> ConversionResult {
        if transcript.is_empty() {
            return ConversionResult::none();
        }

        let lowered = transcript.to_lowercase();
        let Some(m) = self.pattern.find(&lowered) else {
            return ConversionResult::none();
        };

        let total_chars = transcript.chars().count();
        let start_chars = lowered[..m.start()].chars().count();
        let position_ratio = start_chars as f64 / total_chars as f64;
        let confidence = (BASE_CONFIDENCE + position_ratio * POSITION_WEIGHT).min(1.0);

        ConversionResult {
            is_conversion: true,
            matched_phrase: Some(truncate_chars(m.as_str(), MAX_PHRASE_CHARS)),
            confidence,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detector() -> ConversionDetector {
        ConversionDetector::new(&Lexicon::builtin()).unwrap()
    }

    #[test]
    fn empty_transcript_is_not_a_conversion() {
        let r = detector().detect("");
        assert!(!r.is_conversion);
        assert!(r.matched_phrase.is_none());
        assert_eq!(r.confidence, 0.0);
    }

    #[test]
    fn match_at_start_has_base_confidence() {
        let r = detector().detect("Sign me up, please.");
        assert!(r.is_conversion);
        assert_eq!(r.matched_phrase.as_deref(), Some("sign me up"));
        assert!((r.confidence - 0.7).abs() < 1e-9);
    }

    #[test]
    fn later_match_scores_higher() {
        let early = detector().detect("Go ahead. I have a lot of other questions first.");
        let late = detector().detect("I have a lot of other questions first. Go ahead.");
        assert!(late.confidence > early.confidence);
        assert!(late.confidence <= 1.0);
    }

    #[test]
    fn confidence_uses_character_offsets() {
        // "count me in" starts at char 10 of a 21-char transcript.
        let r = detector().detect("ééééééééé count me in");
        assert!(r.is_conversion);
        let expected = 0.7 + 0.3 * (10.0 / 21.0);
        assert!((r.confidence - expected).abs() < 1e-9);
    }

    #[test]
    fn matching_is_case_insensitive() {
        let r = detector().detect("Customer: LET'S GET STARTED");
        assert!(r.is_conversion);
        assert_eq!(r.matched_phrase.as_deref(), Some("let's get started"));
    }

    #[test]
    fn yes_pattern_spans_to_booking_word() {
        let r = detector().detect("Yes, I'll book that appointment.");
        assert_eq!(r.matched_phrase.as_deref(), Some("yes, i'll book that appointment"));
    }

    #[test]
    fn unrelated_text_is_not_a_conversion() {
        let r = detector().detect("Hello, what time is it?");
        assert_eq!(r, ConversionResult::none());
    }

    #[test]
    fn matched_phrase_is_truncated() {
        let filler = "x".repeat(400);
        let text = format!("yes {filler} book");
        let r = detector().detect(&text);
        assert!(r.is_conversion);
        assert_eq!(r.matched_phrase.unwrap().chars().count(), 255);
    }
}
