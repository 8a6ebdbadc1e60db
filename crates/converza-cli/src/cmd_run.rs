use converza_pipeline::{Pipeline, PipelineStats};
use std::path::Path;

const REPORT_TOP_PERFORMERS: usize = 5;

/// `converza run`
pub fn full(repo_root: &Path, batch_size: Option<usize>) -> anyhow::Result<()> {
    let (paths, config) = crate::load_workspace(repo_root)?;
    let mut pipeline = Pipeline::open(&paths, config)?;
    let stats = pipeline.run_full(batch_size)?;
    let report = pipeline.write_report(&stats, REPORT_TOP_PERFORMERS)?;

    println!("Pipeline run complete");
    print_stats(&stats);

    let kpis = &report.overall_kpis;
    println!();
    println!("Business metrics:");
    println!("  Conversion rate:      {:.2}%", kpis.conversion_rate);
    println!("  Total upsell revenue: ${}", kpis.total_upsell_revenue);
    if !report.sentiment_distribution.is_empty() {
        println!();
        println!("Sentiment:");
        for share in &report.sentiment_distribution {
            println!("  {:<9} {:>6.2}% ({})", share.label.as_str(), share.percentage, share.count);
        }
    }
    println!();
    println!("Report written to {}", paths.report_json.display());
    Ok(())
}

/// `converza update`
pub fn incremental(repo_root: &Path) -> anyhow::Result<()> {
    let (paths, config) = crate::load_workspace(repo_root)?;
    let mut pipeline = Pipeline::open(&paths, config)?;
    let stats = pipeline.run_incremental()?;
    if stats.gold_records_created == 0 {
        println!("No new records to process");
    } else {
        println!("Incremental update: {} new gold records", stats.gold_records_created);
    }
    println!("  Duration: {:.2}s", stats.duration_seconds);
    Ok(())
}

fn print_stats(stats: &PipelineStats) {
    println!("  Bronze: {} records", stats.bronze_records_fetched);
    println!("  Silver: {} records", stats.silver_records_processed);
    println!("  Gold:   {} records", stats.gold_records_created);
    println!("  Errors: {}", stats.errors);
    println!("  Duration: {:.2}s", stats.duration_seconds);
}
