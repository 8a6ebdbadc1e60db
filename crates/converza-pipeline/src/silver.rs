//! Silver layer: cleaned, normalized calls.

use std::sync::LazyLock;

use converza_core::text::{title_case_words, truncate_chars};
use converza_core::{CallRecord, SilverRecord};
use converza_store::SqliteStore;
use regex::Regex;
use time::{format_description, PrimitiveDateTime};

pub const MAX_CALL_ID_CHARS: usize = 50;
pub const MAX_AGENT_NAME_CHARS: usize = 100;
pub const UNKNOWN_AGENT: &str = "Unknown Agent";

const WORDS_PER_MINUTE: f64 = 150.0;
/// Customer turns and pauses on top of the spoken words.
const TURN_BUFFER: f64 = 1.3;

/// Accepted input timestamp layouts, tried in order.
const TIMESTAMP_FORMATS: [&str; 4] = [
    "[year]-[month]-[day]T[hour]:[minute]:[second]",
    "[year]-[month]-[day] [hour]:[minute]:[second]",
    "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond]",
    "[year]-[month]-[day] [hour]:[minute]:[second].[subsecond]",
];
const STORED_TIMESTAMP_FORMAT: &str = "[year]-[month]-[day]T[hour]:[minute]:[second]";

static WHITESPACE_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
static CONTROL_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\x00-\x1f\x7f-\x9f]").unwrap());

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RejectReason {
    #[error("record has no call_id")]
    MissingCallId,
    #[error("call {call_id}: unparseable timestamp {raw:?}")]
    InvalidTimestamp { call_id: String, raw: String },
    #[error("call {call_id}: empty transcript")]
    EmptyTranscript { call_id: String },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SilverOutcome {
    pub inserted: usize,
    pub rejected: usize,
}

/// Collapse whitespace, drop control characters, straighten curly quotes, trim.
pub fn clean_text(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    let collapsed = WHITESPACE_RUN.replace_all(text, " ");
    let stripped = CONTROL_CHARS.replace_all(&collapsed, "");
    stripped
        .replace(['\u{201C}', '\u{201D}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'")
        .trim()
        .to_string()
}

pub fn normalize_agent_name(raw: &str) -> String {
    let cleaned = clean_text(raw);
    if cleaned.is_empty() {
        return UNKNOWN_AGENT.to_string();
    }
    title_case_words(&cleaned)
}

/// Parse any of the accepted layouts. Fractional seconds are kept.
pub fn parse_timestamp(raw: &str) -> Option<PrimitiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    TIMESTAMP_FORMATS.iter().find_map(|layout| {
        let format = format_description::parse(layout).ok()?;
        PrimitiveDateTime::parse(raw, &format).ok()
    })
}

/// `YYYY-MM-DDTHH:MM:SS`, the sortable form stored in silver and gold.
pub fn format_timestamp(ts: PrimitiveDateTime) -> Option<String> {
    let format = format_description::parse(STORED_TIMESTAMP_FORMAT).ok()?;
    ts.format(&format).ok()
}

/// Call length in seconds from the transcript's word count.
pub fn estimate_call_duration(transcript: &str) -> u32 {
    let words = transcript.split_whitespace().count() as f64;
    (words / WORDS_PER_MINUTE * TURN_BUFFER * 60.0) as u32
}

/// Clean one bronze call into a silver row.
pub fn clean_record(raw: &CallRecord) -> Result<SilverRecord, RejectReason> {
    let call_id = raw.call_id.trim();
    if call_id.is_empty() {
        return Err(RejectReason::MissingCallId);
    }
    let call_id = truncate_chars(call_id, MAX_CALL_ID_CHARS);

    let agent_name = truncate_chars(&normalize_agent_name(&raw.agent_name), MAX_AGENT_NAME_CHARS);

    let call_timestamp = parse_timestamp(&raw.timestamp)
        .and_then(format_timestamp)
        .ok_or_else(|| RejectReason::InvalidTimestamp {
            call_id: call_id.clone(),
            raw: raw.timestamp.clone(),
        })?;

    let transcript_text = clean_text(&raw.transcript_text);
    if transcript_text.is_empty() {
        return Err(RejectReason::EmptyTranscript { call_id });
    }

    let transcript_length = u32::try_from(transcript_text.chars().count()).unwrap_or(u32::MAX);
    let call_duration_seconds = estimate_call_duration(&transcript_text);

    Ok(SilverRecord {
        call_id,
        agent_name,
        call_timestamp,
        transcript_text,
        transcript_length,
        call_duration_seconds,
    })
}

/// Clean `records` and insert them `chunk_size` at a time.
///
/// Rejected records are logged and counted; they never abort the batch.
pub fn process_batch(
    store: &mut SqliteStore,
    records: &[CallRecord],
    chunk_size: usize,
) -> anyhow::Result<SilverOutcome> {
    let mut outcome = SilverOutcome::default();
    for chunk in records.chunks(chunk_size.max(1)) {
        let mut cleaned = Vec::with_capacity(chunk.len());
        for raw in chunk {
            match clean_record(raw) {
                Ok(rec) => cleaned.push(rec),
                Err(reason) => {
                    tracing::warn!(%reason, "silver: rejected record");
                    outcome.rejected += 1;
                }
            }
        }
        if !cleaned.is_empty() {
            let inserted = store.insert_silver_batch(&cleaned)?;
            tracing::debug!(inserted, offered = cleaned.len(), "silver: chunk stored");
            outcome.inserted += inserted;
        }
    }
    Ok(outcome)
}
