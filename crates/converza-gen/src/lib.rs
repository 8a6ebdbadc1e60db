//! Synthetic call transcripts for exercising the pipeline end to end.
//!
//! Roughly 30% of calls convert and 15% of those carry a priced upsell.
//! Customer mood is skewed by outcome, so the gold aggregates come out with
//! a realistic spread.

mod phrases;

use std::path::Path;

use converza_core::CallRecord;
use rand::distributions::WeightedIndex;
use rand::prelude::*;
use rand::rngs::StdRng;
use time::{Duration, OffsetDateTime};

pub use phrases::AGENTS;

const CONVERSION_RATE: f64 = 0.30;
const UPSELL_RATE: f64 = 0.15;
/// Chance that a customer turn opens with a mood phrase.
const MOOD_PHRASE_RATE: f64 = 0.4;
const LOOKBACK_DAYS: i64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mood {
    Positive,
    Neutral,
    Negative,
}

const MOODS: [Mood; 3] = [Mood::Positive, Mood::Neutral, Mood::Negative];
const CONVERTING_WEIGHTS: [f64; 3] = [0.7, 0.25, 0.05];
const BROWSING_WEIGHTS: [f64; 3] = [0.2, 0.5, 0.3];

/// Seedable generator of landing-zone call records.
pub struct CallGenerator {
    rng: StdRng,
    now: OffsetDateTime,
}

impl CallGenerator {
    /// Same `seed` and `now` give the same calls.
    pub fn new(seed: Option<u64>, now: OffsetDateTime) -> Self {
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };
        Self { rng, now }
    }

    pub fn generate_call(&mut self) -> CallRecord {
        CallRecord {
            call_id: self.call_id(),
            agent_name: pick(&mut self.rng, AGENTS).to_string(),
            timestamp: self.timestamp(),
            transcript_text: self.transcript(),
        }
    }

    pub fn generate_batch(&mut self, count: usize) -> Vec<CallRecord> {
        (0..count).map(|_| self.generate_call()).collect()
    }

    /// `CALL_` plus the last 8 characters of a ULID (its random part).
    fn call_id(&mut self) -> String {
        let millis = (self.now.unix_timestamp_nanos() / 1_000_000).max(0) as u64;
        let ulid = ulid::Ulid::from_parts(millis, self.rng.gen::<u128>()).to_string();
        format!("CALL_{}", &ulid[ulid.len() - 8..])
    }

    fn timestamp(&mut self) -> String {
        let back = self.rng.gen_range(0..LOOKBACK_DAYS * 24 * 3600);
        let ts = self.now - Duration::seconds(back);
        format!(
            "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}",
            ts.year(),
            u8::from(ts.month()),
            ts.day(),
            ts.hour(),
            ts.minute(),
            ts.second()
        )
    }

    fn transcript(&mut self) -> String {
        let rng = &mut self.rng;
        let converts = rng.gen_bool(CONVERSION_RATE);
        let upsells = converts && rng.gen_bool(UPSELL_RATE);
        let weights = if converts {
            CONVERTING_WEIGHTS
        } else {
            BROWSING_WEIGHTS
        };
        let mood = match WeightedIndex::new(weights) {
            Ok(dist) => MOODS[dist.sample(rng)],
            Err(_) => Mood::Neutral,
        };

        let mut parts = vec![
            "Agent: Hello, thank you for calling. How can I help you today?".to_string(),
            format!("Customer: {} your services.", pick(rng, phrases::OPENERS)),
        ];

        let exchanges = rng.gen_range(3..=6);
        for i in 0..exchanges {
            if i == 0 {
                parts.push(
                    "Agent: I'd be happy to help you with that. Let me explain our options."
                        .to_string(),
                );
                parts.push(
                    "Customer: That sounds interesting. Tell me more about the features."
                        .to_string(),
                );
                continue;
            }
            parts.push(format!("Agent: {}", pick(rng, phrases::FILLER)));
            let mood_phrases = match mood {
                Mood::Positive => Some(phrases::POSITIVE),
                Mood::Negative => Some(phrases::NEGATIVE),
                Mood::Neutral => None,
            };
            let filler = pick(rng, phrases::FILLER);
            match mood_phrases {
                Some(list) if rng.gen_bool(MOOD_PHRASE_RATE) => {
                    parts.push(format!("Customer: {}. {filler}", pick(rng, list)));
                }
                _ => parts.push(format!("Customer: {filler}")),
            }
        }

        if converts {
            parts.push("Agent: Great! So would you like to proceed?".to_string());
            parts.push(format!("Customer: {}.", pick(rng, phrases::CONVERSION)));
            if upsells {
                parts.push(
                    "Agent: Excellent! I also have some additional options that might interest you."
                        .to_string(),
                );
                parts.push(format!("Customer: {}.", pick(rng, phrases::UPSELL)));
                parts.push("Agent: Perfect! I'll add that to your order.".to_string());
            }
        } else {
            parts.push("Agent: Is there anything else I can help you with today?".to_string());
            parts.push("Customer: Let me think about it and get back to you.".to_string());
        }

        parts.push("Agent: Thank you for your time. Have a great day!".to_string());
        parts.push("Customer: Thank you, goodbye.".to_string());
        parts.join(" ")
    }
}

fn pick<'a>(rng: &mut StdRng, items: &[&'a str]) -> &'a str {
    items.choose(rng).copied().unwrap_or_default()
}

/// Write each call as `<call_id>.json` under `raw_dir`. Returns files written.
pub fn write_landing_files(raw_dir: &Path, calls: &[CallRecord]) -> anyhow::Result<usize> {
    for call in calls {
        let path = raw_dir.join(format!("{}.json", call.call_id));
        let json = serde_json::to_string_pretty(call)?;
        converza_store::write_atomic(&path, json.as_bytes())?;
    }
    tracing::info!(count = calls.len(), dir = %raw_dir.display(), "landing files written");
    Ok(calls.len())
}
