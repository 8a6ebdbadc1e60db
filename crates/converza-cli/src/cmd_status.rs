use converza_pipeline::bronze::{list_landing_files, pending_landing_files};
use converza_store::SqliteStore;
use std::path::Path;

pub fn execute(repo_root: &Path) -> anyhow::Result<()> {
    let (paths, config) = crate::load_workspace(repo_root)?;
    let store = SqliteStore::open_or_create(&paths.db_path)?;
    let landing = list_landing_files(&paths.raw_dir, &config.raw_glob, usize::MAX)?;
    let pending = pending_landing_files(
        &paths.raw_dir,
        &config.raw_glob,
        &store.ingested_source_files()?,
        usize::MAX,
    )?;
    let counts = store.layer_counts()?;
    let silver = store.silver_stats()?;

    println!("Workspace: {}", paths.converza_dir.display());
    println!("Schema version: {}", store.schema_version()?);
    println!("Landing files: {} ({} not yet ingested)", landing.len(), pending.len());
    println!("Bronze: {}", counts.bronze);
    println!("Silver: {}", counts.silver);
    println!("Gold:   {}", counts.gold);
    println!("Pending gold: {}", counts.silver.saturating_sub(counts.gold));

    if silver.total_records > 0 {
        println!();
        println!("Silver agents: {}", silver.unique_agents);
        println!(
            "Calls from {} to {}",
            silver.earliest_call.as_deref().unwrap_or("-"),
            silver.latest_call.as_deref().unwrap_or("-")
        );
        println!(
            "Avg transcript: {:.2} chars, {:.2}s",
            silver.avg_transcript_length, silver.avg_call_duration_seconds
        );
    }
    Ok(())
}
