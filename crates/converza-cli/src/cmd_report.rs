use converza_store::{
    AgentPerformance, ConversionMetrics, DailyMetrics, SentimentShare, SqliteStore,
};
use serde::Serialize;
use std::path::Path;

/// Live view of the gold layer (no pipeline summary).
#[derive(Serialize)]
struct GoldSnapshot {
    overall_kpis: ConversionMetrics,
    sentiment_distribution: Vec<SentimentShare>,
    top_performers: Vec<AgentPerformance>,
    daily_metrics: Vec<DailyMetrics>,
}

/// `converza report`
pub fn execute(repo_root: &Path, json: bool, top: usize) -> anyhow::Result<()> {
    let (paths, config) = crate::load_workspace(repo_root)?;
    let store = SqliteStore::open_or_create(&paths.db_path)?;
    let snapshot = GoldSnapshot {
        overall_kpis: store.conversion_metrics()?,
        sentiment_distribution: store.sentiment_distribution()?,
        top_performers: store.top_performers(config.top_performers_min_calls, top)?,
        daily_metrics: store.daily_metrics()?,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
        return Ok(());
    }

    let k = &snapshot.overall_kpis;
    println!("Calls analyzed:   {}", k.total_calls);
    println!("Conversions:      {} ({:.2}%)", k.conversions, k.conversion_rate);
    println!(
        "Upsells:          {} (${} total, ${:.2} per call)",
        k.upsells, k.total_upsell_revenue, k.avg_upsell_amount
    );

    println!();
    println!("Sentiment:");
    if snapshot.sentiment_distribution.is_empty() {
        println!("  (no data)");
    }
    for share in &snapshot.sentiment_distribution {
        println!(
            "  {:<9} {:>6.2}% ({})",
            share.label.as_str(),
            share.percentage,
            share.count
        );
    }

    println!();
    println!(
        "Top performers (min {} calls):",
        config.top_performers_min_calls
    );
    if snapshot.top_performers.is_empty() {
        println!("  (none yet)");
    }
    for (i, agent) in snapshot.top_performers.iter().enumerate() {
        println!(
            "  {}. {:<20} {:>6.2}%  {:>3} calls  ${} upsell  {:.0}% positive",
            i + 1,
            agent.agent_name,
            agent.conversion_rate,
            agent.total_calls,
            agent.total_upsell_amount,
            agent.positive_sentiment_pct
        );
    }

    if !snapshot.daily_metrics.is_empty() {
        println!();
        println!("Daily:");
        for day in &snapshot.daily_metrics {
            println!(
                "  {}  {:>3} calls  {:>6.2}% converted  +{} / ={} / -{}",
                day.metric_date,
                day.total_calls,
                day.conversion_rate,
                day.positive_calls,
                day.neutral_calls,
                day.negative_calls
            );
        }
    }
    Ok(())
}
