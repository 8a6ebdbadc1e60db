use std::fs;

use converza_core::{Amount, SentimentLabel};
use converza_pipeline::Pipeline;
use converza_store::{ConverzaPaths, PipelineConfig};

fn land(paths: &ConverzaPaths, call_id: &str, agent: &str, ts: &str, transcript: &str) {
    let body = serde_json::json!({
        "call_id": call_id,
        "agent_name": agent,
        "timestamp": ts,
        "transcript_text": transcript,
    });
    fs::write(paths.raw_file(call_id), body.to_string()).unwrap();
}

fn workspace() -> (tempfile::TempDir, ConverzaPaths) {
    let tmp = tempfile::tempdir().unwrap();
    let paths = ConverzaPaths::discover(tmp.path());
    paths.ensure_layout().unwrap();
    (tmp, paths)
}

#[test]
fn full_run_populates_every_layer() {
    let (_tmp, paths) = workspace();
    land(
        &paths,
        "CALL_00000001",
        "sarah johnson",
        "2026-03-01 09:30:00",
        "Agent: Hello!\nCustomer: Yes, I'll book that appointment. This is fantastic. \
         I'll take the premium package for an extra $50.",
    );
    land(
        &paths,
        "CALL_00000002",
        "Sarah Johnson",
        "2026-03-01T14:00:00.250",
        "Customer: This is terrible, not good at all, I am not happy.",
    );
    land(
        &paths,
        "CALL_00000003",
        "michael chen",
        "2026-03-02T10:00:00",
        "Customer: Hello, what time is it?",
    );
    // Rejected in silver: bad timestamp.
    land(&paths, "CALL_00000004", "michael chen", "last tuesday", "go ahead");
    // Rejected in bronze: not JSON.
    fs::write(paths.raw_dir.join("CALL_00000005.json"), "{").unwrap();
    // Ignored: does not match the glob.
    fs::write(paths.raw_dir.join("README.txt"), "notes").unwrap();

    let mut pipeline = Pipeline::open(&paths, PipelineConfig::default()).unwrap();
    let stats = pipeline.run_full(None).unwrap();
    assert_eq!(stats.bronze_records_fetched, 4);
    assert_eq!(stats.silver_records_processed, 3);
    assert_eq!(stats.gold_records_created, 3);
    assert_eq!(stats.errors, 2);

    let store = pipeline.store();
    let counts = store.layer_counts().unwrap();
    assert_eq!((counts.bronze, counts.silver, counts.gold), (4, 3, 3));

    let booked = store.gold_record("CALL_00000001").unwrap().unwrap();
    assert_eq!(booked.agent_name, "Sarah Johnson");
    assert!(booked.is_conversion);
    assert!(booked.conversion_confidence > 0.7 && booked.conversion_confidence <= 1.0);
    assert_eq!(booked.upsell_amount, Amount::from_cents(5000));
    assert!(booked
        .upsell_product
        .as_deref()
        .unwrap()
        .starts_with("Premium Package"));
    assert_eq!(booked.sentiment, SentimentLabel::Positive);

    let unhappy = store.gold_record("CALL_00000002").unwrap().unwrap();
    assert_eq!(unhappy.call_timestamp, "2026-03-01T14:00:00");
    assert_eq!(unhappy.sentiment, SentimentLabel::Negative);

    let neutral = store.gold_record("CALL_00000003").unwrap().unwrap();
    assert!(!neutral.is_conversion);
    assert_eq!(neutral.sentiment, SentimentLabel::Neutral);
    assert_eq!(neutral.sentiment_confidence, 0.5);

    let kpis = store.conversion_metrics().unwrap();
    assert_eq!(kpis.total_calls, 3);
    assert_eq!(kpis.conversions, 1);
    assert_eq!(kpis.conversion_rate, 33.33);
    assert_eq!(kpis.total_upsell_revenue.to_string(), "50.00");

    let days = store.daily_metrics().unwrap();
    assert_eq!(days.len(), 2);
    assert_eq!(days[0].metric_date, "2026-03-01");
    assert_eq!(days[0].total_calls, 2);

    let report = pipeline.write_report(&stats, 10).unwrap();
    assert_eq!(report.agent_performance.len(), 2);
    // Nobody has five calls yet.
    assert!(report.top_performers.is_empty());
    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&paths.report_json).unwrap()).unwrap();
    assert_eq!(json["overall_kpis"]["total_upsell_revenue"], "50.00");
    assert_eq!(json["pipeline_summary"]["silver_records_processed"], 3);
}

#[test]
fn rerun_is_idempotent() {
    let (_tmp, paths) = workspace();
    land(&paths, "CALL_A", "ana", "2026-01-01T10:00:00", "Sign me up, excellent.");

    let mut pipeline = Pipeline::open(&paths, PipelineConfig::default()).unwrap();
    let first = pipeline.run_full(None).unwrap();
    assert_eq!(first.gold_records_created, 1);

    let second = pipeline.run_full(None).unwrap();
    assert_eq!(second.bronze_records_fetched, 0);
    assert_eq!(second.silver_records_processed, 0);
    assert_eq!(second.gold_records_created, 0);

    let counts = pipeline.store().layer_counts().unwrap();
    assert_eq!((counts.bronze, counts.silver, counts.gold), (1, 1, 1));
}

#[test]
fn batch_size_and_incremental_limit() {
    let (_tmp, paths) = workspace();
    for i in 0..6 {
        land(
            &paths,
            &format!("CALL_{i:08}"),
            "ben",
            &format!("2026-02-0{}T08:00:00", i + 1),
            "Customer: go ahead.",
        );
    }
    let config = PipelineConfig {
        gold_limit: 2,
        incremental_limit: 3,
        ..Default::default()
    };
    let mut pipeline = Pipeline::open(&paths, config).unwrap();

    let stats = pipeline.run_full(Some(5)).unwrap();
    assert_eq!(stats.bronze_records_fetched, 5);
    assert_eq!(stats.silver_records_processed, 5);
    assert_eq!(stats.gold_records_created, 2);

    let inc = pipeline.run_incremental().unwrap();
    assert_eq!(inc.gold_records_created, 3);
    assert_eq!(inc.bronze_records_fetched, 0);

    let inc = pipeline.run_incremental().unwrap();
    assert_eq!(inc.gold_records_created, 0);

    let agents = pipeline.store().top_performers(5, 10).unwrap();
    assert_eq!(agents.len(), 1);
    assert_eq!(agents[0].agent_name, "Ben");
    assert_eq!(agents[0].total_calls, 5);
    assert_eq!(agents[0].conversion_rate, 100.0);
}

#[test]
fn landing_files_past_the_batch_cap_are_ingested_later() {
    let (_tmp, paths) = workspace();
    for i in 0..6 {
        land(
            &paths,
            &format!("CALL_{i:08}"),
            "cara",
            &format!("2026-04-0{}T08:00:00", i + 1),
            "Customer: go ahead.",
        );
    }
    let mut pipeline = Pipeline::open(&paths, PipelineConfig::default()).unwrap();

    let first = pipeline.run_full(Some(5)).unwrap();
    assert_eq!(first.bronze_records_fetched, 5);

    let second = pipeline.run_full(Some(5)).unwrap();
    assert_eq!(second.bronze_records_fetched, 1);
    assert_eq!(second.silver_records_processed, 1);
    assert_eq!(second.gold_records_created, 1);

    let third = pipeline.run_full(Some(5)).unwrap();
    assert_eq!(third.bronze_records_fetched, 0);

    let counts = pipeline.store().layer_counts().unwrap();
    assert_eq!((counts.bronze, counts.silver, counts.gold), (6, 6, 6));
}
