//! Gold layer: enriched call analytics and their aggregates.

use converza_store::SqliteStore;
use converza_transform::TranscriptAnalyzer;

/// Enrich up to `limit` silver rows that have no gold row yet, then refresh
/// the per-agent and per-day aggregates. Returns gold rows created.
pub fn process_unprocessed(
    store: &mut SqliteStore,
    analyzer: &TranscriptAnalyzer,
    limit: usize,
) -> anyhow::Result<usize> {
    let pending = store.unprocessed_silver(limit)?;
    if pending.is_empty() {
        tracing::info!("gold: no new silver records");
        return Ok(0);
    }

    let enriched: Vec<_> = pending
        .iter()
        .map(|row| analyzer.transform_call_record(&row.to_call_record()))
        .collect();
    let conversions = enriched.iter().filter(|r| r.is_conversion).count();

    let created = store.insert_gold_batch(&enriched)?;
    store.refresh_aggregates()?;
    tracing::info!(created, conversions, "gold: analytics stored, aggregates refreshed");
    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use converza_core::{SentimentLabel, SilverRecord};

    fn silver(call_id: &str, agent: &str, transcript: &str) -> SilverRecord {
        SilverRecord {
            call_id: call_id.into(),
            agent_name: agent.into(),
            call_timestamp: "2026-04-01T12:00:00".into(),
            transcript_text: transcript.into(),
            transcript_length: transcript.chars().count() as u32,
            call_duration_seconds: 1,
        }
    }

    #[test]
    fn enriches_pending_rows_once() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        store
            .insert_silver_batch(&[
                silver("C1", "Ana", "Yes, sign me up. Add the extended warranty for $25. Excellent."),
                silver("C2", "Ana", "Let me think about it."),
            ])
            .unwrap();
        let analyzer = TranscriptAnalyzer::new();

        assert_eq!(process_unprocessed(&mut store, &analyzer, 10).unwrap(), 2);
        assert_eq!(process_unprocessed(&mut store, &analyzer, 10).unwrap(), 0);

        let c1 = store.gold_record("C1").unwrap().unwrap();
        assert!(c1.is_conversion);
        assert_eq!(c1.upsell_amount.to_string(), "25.00");
        assert_eq!(c1.sentiment, SentimentLabel::Positive);

        let agents = store.agent_performance(0, None).unwrap();
        assert_eq!(agents.len(), 1);
        assert_eq!(agents[0].total_calls, 2);
        assert_eq!(agents[0].conversion_rate, 50.0);
    }

    #[test]
    fn limit_caps_one_pass() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let rows: Vec<_> = (0..5).map(|i| silver(&format!("C{i}"), "Ben", "hello")).collect();
        store.insert_silver_batch(&rows).unwrap();

        let analyzer = TranscriptAnalyzer::new();
        assert_eq!(process_unprocessed(&mut store, &analyzer, 3).unwrap(), 3);
        assert_eq!(process_unprocessed(&mut store, &analyzer, 3).unwrap(), 2);
    }
}
