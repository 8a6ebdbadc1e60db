use converza_core::{CallRecord, ConversionResult, EnrichedRecord, SentimentResult, UpsellResult};

use crate::conversion::ConversionDetector;
use crate::error::TransformError;
use crate::lexicon::Lexicon;
use crate::sentiment::SentimentAnalyzer;
use crate::upsell::UpsellExtractor;

const CHARS_PER_WORD: f64 = 5.0;
const WORDS_PER_MINUTE: f64 = 150.0;
/// Pauses, hold time, and thinking between turns.
const PAUSE_BUFFER: f64 = 1.2;

/// The transformation engine: compiled once, then shared read-only.
#[derive(Debug, Clone)]
pub struct TranscriptAnalyzer {
    conversion: ConversionDetector,
    upsell: UpsellExtractor,
    sentiment: SentimentAnalyzer,
}

impl TranscriptAnalyzer {
    /// Analyzer over the built-in call-center lexicon.
    pub fn new() -> Self {
        Self::with_lexicon(&Lexicon::builtin()).expect("built-in lexicon compiles")
    }

    pub fn with_lexicon(lexicon: &Lexicon) -> Result<Self, TransformError> {
        Ok(Self {
            conversion: ConversionDetector::new(lexicon)?,
            upsell: UpsellExtractor::new(lexicon)?,
            sentiment: SentimentAnalyzer::new(lexicon),
        })
    }

    pub fn detect_conversion(&self, transcript: &str) -> ConversionResult {
        self.conversion.detect(transcript)
    }

    pub fn extract_upsell(&self, transcript: &str) -> UpsellResult {
        self.upsell.extract(transcript)
    }

    pub fn analyze_sentiment(&self, transcript: &str) -> SentimentResult {
        self.sentiment.analyze(transcript)
    }

    /// Run all three analyses and flatten them with the call's identity.
    ///
    /// An empty transcript yields the empty-input defaults of each analysis.
    pub fn transform_call_record(&self, call: &CallRecord) -> EnrichedRecord {
        let transcript = call.transcript_text.as_str();
        let conversion = self.detect_conversion(transcript);
        let upsell = self.extract_upsell(transcript);
        let sentiment = self.analyze_sentiment(transcript);

        let length = transcript.chars().count();
        EnrichedRecord::from_parts(
            call,
            conversion,
            upsell,
            sentiment,
            u32::try_from(length).unwrap_or(u32::MAX),
            estimate_call_duration(length),
        )
    }
}

impl Default for TranscriptAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

/// Heuristic call length in seconds from transcript length in characters.
pub fn estimate_call_duration(transcript_chars: usize) -> u32 {
    let words = transcript_chars as f64 / CHARS_PER_WORD;
    let seconds = (words / WORDS_PER_MINUTE * 60.0).floor();
    (seconds * PAUSE_BUFFER) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use converza_core::{Amount, SentimentLabel};

    const SCENARIO: &str = "Customer: Yes, I'll book that appointment. This is fantastic. \
                            I'll take the premium package for an extra $50.";

    fn call(transcript: &str) -> CallRecord {
        CallRecord {
            call_id: "CALL_TEST0001".into(),
            agent_name: "Sarah Johnson".into(),
            timestamp: "2026-03-01T09:30:00".into(),
            transcript_text: transcript.into(),
        }
    }

    #[test]
    fn analyzer_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<TranscriptAnalyzer>();
    }

    #[test]
    fn booking_scenario() {
        let engine = TranscriptAnalyzer::new();

        let conv = engine.detect_conversion(SCENARIO);
        assert!(conv.is_conversion);
        assert!(conv.confidence > 0.7 && conv.confidence <= 1.0);

        let upsell = engine.extract_upsell(SCENARIO);
        assert!(upsell.has_upsell);
        assert_eq!(upsell.amount, Amount::from_cents(5000));
        assert!(upsell.product_name.unwrap().starts_with("Premium Package"));

        let sentiment = engine.analyze_sentiment(SCENARIO);
        assert_eq!(sentiment.label, SentimentLabel::Positive);
        assert_eq!((sentiment.positive_hits, sentiment.negative_hits), (1, 0));
    }

    #[test]
    fn no_keywords_scenario() {
        let rec = TranscriptAnalyzer::new().transform_call_record(&call("Hello, what time is it?"));
        assert!(!rec.is_conversion);
        assert!(rec.upsell_amount.is_zero());
        assert!(rec.upsell_product.is_none());
        assert_eq!(rec.sentiment, SentimentLabel::Neutral);
        assert_eq!(rec.sentiment_confidence, 0.5);
    }

    #[test]
    fn empty_transcript_degrades_to_defaults() {
        let rec = TranscriptAnalyzer::new().transform_call_record(&call(""));
        assert_eq!(rec.call_id, "CALL_TEST0001");
        assert!(!rec.is_conversion);
        assert_eq!(rec.conversion_confidence, 0.0);
        assert!(rec.upsell_amount.is_zero());
        assert_eq!(rec.sentiment, SentimentLabel::Neutral);
        assert_eq!(rec.sentiment_confidence, 0.5);
        assert_eq!(rec.transcript_length, 0);
        assert_eq!(rec.call_duration_seconds, 0);
    }

    #[test]
    fn record_carries_identity_and_metrics() {
        let rec = TranscriptAnalyzer::new().transform_call_record(&call(SCENARIO));
        assert_eq!(rec.agent_name, "Sarah Johnson");
        assert_eq!(rec.call_timestamp, "2026-03-01T09:30:00");
        assert!(rec.is_conversion);
        assert_eq!(rec.upsell_amount.to_string(), "50.00");
        assert_eq!(rec.upsell_product.as_deref(), Some("Premium Package"));
        assert_eq!(rec.positive_keywords_count, 1);
        assert_eq!(rec.transcript_length as usize, SCENARIO.chars().count());
    }

    #[test]
    fn analyses_are_idempotent() {
        let engine = TranscriptAnalyzer::new();
        for text in [SCENARIO, "", "not excellent", "ümlaut ñ 日本語 $5 premium plan"] {
            assert_eq!(engine.detect_conversion(text), engine.detect_conversion(text));
            assert_eq!(engine.extract_upsell(text), engine.extract_upsell(text));
            assert_eq!(engine.analyze_sentiment(text), engine.analyze_sentiment(text));
        }
    }

    #[test]
    fn confidences_stay_in_unit_interval() {
        let engine = TranscriptAnalyzer::new();
        let long_tail = format!("{} go ahead", "wonderful ".repeat(50));
        for text in [
            SCENARIO,
            "go ahead",
            "İİİİİİİİİİ go ahead",
            long_tail.as_str(),
            "terrible awful horrible bad worst",
        ] {
            let c = engine.detect_conversion(text).confidence;
            let s = engine.analyze_sentiment(text).confidence;
            assert!((0.0..=1.0).contains(&c), "conversion confidence {c} for {text:?}");
            assert!((0.0..=1.0).contains(&s), "sentiment confidence {s} for {text:?}");
        }
    }

    #[test]
    fn concurrent_callers_agree() {
        let engine = TranscriptAnalyzer::new();
        let expected = engine.transform_call_record(&call(SCENARIO));
        std::thread::scope(|scope| {
            let handles: Vec<_> = (0..4)
                .map(|_| scope.spawn(|| engine.transform_call_record(&call(SCENARIO))))
                .collect();
            for h in handles {
                assert_eq!(h.join().unwrap(), expected);
            }
        });
    }

    #[test]
    fn custom_lexicon_changes_behaviour() {
        let mut lexicon = Lexicon::builtin();
        lexicon.positive_keywords.push("stellar".into());
        let engine = TranscriptAnalyzer::with_lexicon(&lexicon).unwrap();
        assert_eq!(
            engine.analyze_sentiment("a stellar call").label,
            SentimentLabel::Positive
        );

        lexicon.conversion_patterns.clear();
        assert!(TranscriptAnalyzer::with_lexicon(&lexicon).is_err());
    }

    #[test]
    fn duration_estimate() {
        assert_eq!(estimate_call_duration(0), 0);
        // 750 chars = 150 words = 60 s, plus 20% buffer.
        assert_eq!(estimate_call_duration(750), 72);
        // 100 chars = 20 words = 8 s -> 9.6 truncated.
        assert_eq!(estimate_call_duration(100), 9);
    }
}
