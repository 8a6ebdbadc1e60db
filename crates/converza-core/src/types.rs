use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::amount::Amount;

/// Maximum stored length of matched phrases and product names.
pub const MAX_PHRASE_CHARS: usize = 255;

/// Call ID format: `CALL_<8 uppercase alphanumerics>` for generated data,
/// opaque otherwise.
pub type CallId = String;

/// One call as handed to the transformation engine.
///
/// Identity fields are passed through untouched; only `transcript_text`
/// is analysed.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CallRecord {
    pub call_id: CallId,
    pub agent_name: String,
    pub timestamp: String,
    #[serde(default)]
    pub transcript_text: String,
}

/// A cleaned call as stored in the silver layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SilverRecord {
    pub call_id: CallId,
    pub agent_name: String,
    /// Normalized `YYYY-MM-DDTHH:MM:SS`.
    pub call_timestamp: String,
    pub transcript_text: String,
    pub transcript_length: u32,
    pub call_duration_seconds: u32,
}

impl SilverRecord {
    /// The engine input for this call.
    pub fn to_call_record(&self) -> CallRecord {
        CallRecord {
            call_id: self.call_id.clone(),
            agent_name: self.agent_name.clone(),
            timestamp: self.call_timestamp.clone(),
            transcript_text: self.transcript_text.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ConversionResult {
    pub is_conversion: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matched_phrase: Option<String>,
    pub confidence: f64,
}

impl ConversionResult {
    pub fn none() -> Self {
        Self::default()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct UpsellResult {
    pub has_upsell: bool,
    pub amount: Amount,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_name: Option<String>,
}

impl UpsellResult {
    pub fn none() -> Self {
        Self::default()
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SentimentLabel {
    Positive,
    Negative,
    #[default]
    Neutral,
}

impl SentimentLabel {
    pub fn as_str(self) -> &'static str {
        match self {
            SentimentLabel::Positive => "positive",
            SentimentLabel::Negative => "negative",
            SentimentLabel::Neutral => "neutral",
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown sentiment label: {0}")]
pub struct UnknownSentimentLabel(pub String);

impl FromStr for SentimentLabel {
    type Err = UnknownSentimentLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "positive" => Ok(SentimentLabel::Positive),
            "negative" => Ok(SentimentLabel::Negative),
            "neutral" => Ok(SentimentLabel::Neutral),
            _ => Err(UnknownSentimentLabel(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SentimentResult {
    pub label: SentimentLabel,
    pub confidence: f64,
    pub positive_hits: u32,
    pub negative_hits: u32,
}

impl SentimentResult {
    /// Baseline for transcripts without any sentiment-bearing words.
    pub const NEUTRAL_CONFIDENCE: f64 = 0.5;

    pub fn neutral() -> Self {
        Self {
            label: SentimentLabel::Neutral,
            confidence: Self::NEUTRAL_CONFIDENCE,
            positive_hits: 0,
            negative_hits: 0,
        }
    }
}

impl Default for SentimentResult {
    fn default() -> Self {
        Self::neutral()
    }
}

/// Gold-layer row: identity plus the flattened metric results.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EnrichedRecord {
    pub call_id: CallId,
    pub agent_name: String,
    pub call_timestamp: String,
    pub is_conversion: bool,
    #[serde(default)]
    pub conversion_phrase: Option<String>,
    pub conversion_confidence: f64,
    pub upsell_amount: Amount,
    #[serde(default)]
    pub upsell_product: Option<String>,
    pub sentiment: SentimentLabel,
    pub sentiment_confidence: f64,
    pub positive_keywords_count: u32,
    pub negative_keywords_count: u32,
    pub transcript_length: u32,
    pub call_duration_seconds: u32,
}

impl EnrichedRecord {
    /// Assemble a record from identity fields and the three analysis results.
    pub fn from_parts(
        call: &CallRecord,
        conversion: ConversionResult,
        upsell: UpsellResult,
        sentiment: SentimentResult,
        transcript_length: u32,
        call_duration_seconds: u32,
    ) -> Self {
        Self {
            call_id: call.call_id.clone(),
            agent_name: call.agent_name.clone(),
            call_timestamp: call.timestamp.clone(),
            is_conversion: conversion.is_conversion,
            conversion_phrase: conversion.matched_phrase,
            conversion_confidence: conversion.confidence,
            upsell_amount: upsell.amount,
            upsell_product: upsell.product_name,
            sentiment: sentiment.label,
            sentiment_confidence: sentiment.confidence,
            positive_keywords_count: sentiment.positive_hits,
            negative_keywords_count: sentiment.negative_hits,
            transcript_length,
            call_duration_seconds,
        }
    }
}
