use std::sync::LazyLock;

use converza_core::text::{title_case_words, truncate_chars};
use converza_core::{Amount, AmountParseError, UpsellResult, MAX_PHRASE_CHARS};
use regex::Regex;

use crate::error::TransformError;
use crate::lexicon::{compile_alternation, Lexicon};

/// Characters of context searched for a price on each side of the keyword.
const CONTEXT_CHARS: usize = 100;

/// `$1,299.99`, `$ 50`, `75`: optional dollar sign, thousands groups, cents.
static AMOUNT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$?\s*(\d+(?:,\d{3})*(?:\.\d{2})?)").unwrap());

/// Finds a priced add-on ("premium package ... $50") in a transcript.
#[derive(Debug, Clone)]
pub struct UpsellExtractor {
    pattern: Regex,
}

impl UpsellExtractor {
    pub fn new(lexicon: &Lexicon) -> Result<Self, TransformError> {
        Ok(Self {
            pattern: compile_alternation("upsell", &lexicon.upsell_patterns)?,
        })
    }

    /// Only the first keyword hit is considered, and it only counts when a
    /// monetary amount appears within the surrounding window.
    pub fn extract(&self, transcript: &str) -> UpsellResult {
        if transcript.is_empty() {
            return UpsellResult::none();
        }

        let lowered = transcript.to_lowercase();
        let Some(m) = self.pattern.find(&lowered) else {
            return UpsellResult::none();
        };

        let start = lowered[..m.start()].chars().count();
        let end = start + m.as_str().chars().count();
        let context = char_window(
            transcript,
            start.saturating_sub(CONTEXT_CHARS),
            end.saturating_add(CONTEXT_CHARS),
        );

        let Some(caps) = AMOUNT_PATTERN.captures(context) else {
            return UpsellResult::none();
        };

        // A token the decimal parser rejects still marks the call as upsold.
        let amount = match caps[1].parse::<Amount>() {
            Ok(amount) => amount,
            Err(AmountParseError::Overflow) => Amount::MAX,
            Err(err) => {
                tracing::debug!(token = &caps[1], error = %err, "unparseable upsell amount");
                Amount::ZERO
            }
        };

        let product = truncate_chars(&title_case_words(m.as_str()), MAX_PHRASE_CHARS);

        UpsellResult {
            has_upsell: true,
            amount,
            product_name: (!product.is_empty()).then_some(product),
        }
    }
}

/// Slice `text` by character positions `[from, to)`, clipped to its bounds.
fn char_window(text: &str, from: usize, to: usize) -> &str {
    let byte_at = |n: usize| text.char_indices().nth(n).map_or(text.len(), |(i, _)| i);
    let start = byte_at(from);
    let end = byte_at(to).max(start);
    &text[start..end]
}
