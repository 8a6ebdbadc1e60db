//! Transcript analytics engine.
//!
//! Three independent heuristics (conversion phrases, upsell amounts, and
//! negation-aware keyword sentiment) plus a façade that folds them into one
//! [`EnrichedRecord`](converza_core::EnrichedRecord). Everything here is pure:
//! no I/O, no shared mutable state, safe to call from any number of threads.

mod analyzer;
mod conversion;
mod error;
mod lexicon;
mod sentiment;
mod upsell;

pub use analyzer::{estimate_call_duration, TranscriptAnalyzer};
pub use conversion::ConversionDetector;
pub use error::TransformError;
pub use lexicon::Lexicon;
pub use sentiment::{classify_counts, SentimentAnalyzer};
pub use upsell::UpsellExtractor;
