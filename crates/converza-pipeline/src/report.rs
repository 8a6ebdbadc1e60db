use std::path::Path;

use converza_store::{
    write_atomic, AgentPerformance, ConversionMetrics, DailyMetrics, SentimentShare, SqliteStore,
};
use serde::Serialize;

use crate::etl::PipelineStats;

/// Contents of `performance_report.json`.
#[derive(Debug, Clone, Serialize)]
pub struct PerformanceReport {
    pub report_generated_at: String,
    pub pipeline_summary: PipelineStats,
    pub overall_kpis: ConversionMetrics,
    pub sentiment_distribution: Vec<SentimentShare>,
    /// Every agent, best conversion rate first.
    pub agent_performance: Vec<AgentPerformance>,
    /// Agents over the minimum call count, capped at `top`.
    pub top_performers: Vec<AgentPerformance>,
    pub daily_metrics: Vec<DailyMetrics>,
}

pub fn build_report(
    store: &SqliteStore,
    stats: &PipelineStats,
    min_calls: u32,
    top: usize,
) -> anyhow::Result<PerformanceReport> {
    let now = time::OffsetDateTime::now_utc();
    Ok(PerformanceReport {
        report_generated_at: now.format(&time::format_description::well_known::Rfc3339)?,
        pipeline_summary: stats.clone(),
        overall_kpis: store.conversion_metrics()?,
        sentiment_distribution: store.sentiment_distribution()?,
        agent_performance: store.agent_performance(0, None)?,
        top_performers: store.top_performers(min_calls, top)?,
        daily_metrics: store.daily_metrics()?,
    })
}

pub fn write_report(path: &Path, report: &PerformanceReport) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    write_atomic(path, json.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use converza_core::{Amount, EnrichedRecord, SentimentLabel};

    fn gold(call_id: &str, agent: &str, conv: bool) -> EnrichedRecord {
        EnrichedRecord {
            call_id: call_id.into(),
            agent_name: agent.into(),
            call_timestamp: "2026-05-01T09:00:00".into(),
            is_conversion: conv,
            conversion_phrase: None,
            conversion_confidence: 0.0,
            upsell_amount: Amount::ZERO,
            upsell_product: None,
            sentiment: SentimentLabel::Neutral,
            sentiment_confidence: 0.5,
            positive_keywords_count: 0,
            negative_keywords_count: 0,
            transcript_length: 10,
            call_duration_seconds: 1,
        }
    }

    #[test]
    fn report_sections_and_file() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let mut rows: Vec<_> = (0..5).map(|i| gold(&format!("A{i}"), "Ana", i < 2)).collect();
        rows.push(gold("B0", "Ben", true));
        store.insert_gold_batch(&rows).unwrap();
        store.refresh_aggregates().unwrap();

        let stats = PipelineStats {
            gold_records_created: 6,
            ..Default::default()
        };
        let report = build_report(&store, &stats, 5, 10).unwrap();
        assert_eq!(report.overall_kpis.total_calls, 6);
        assert_eq!(report.agent_performance.len(), 2);
        assert_eq!(report.top_performers.len(), 1);
        assert_eq!(report.top_performers[0].agent_name, "Ana");
        assert_eq!(report.daily_metrics.len(), 1);

        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("performance_report.json");
        write_report(&path, &report).unwrap();
        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json["pipeline_summary"]["gold_records_created"], 6);
        assert_eq!(json["overall_kpis"]["conversions"], 3);
        assert_eq!(json["overall_kpis"]["total_upsell_revenue"], "0.00");
        assert!(json["report_generated_at"].as_str().unwrap().ends_with('Z'));
    }
}
