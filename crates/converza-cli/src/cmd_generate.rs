use converza_gen::{write_landing_files, CallGenerator};
use std::path::Path;

pub fn execute(repo_root: &Path, count: usize, seed: Option<u64>) -> anyhow::Result<()> {
    let paths = crate::workspace_paths(repo_root)?;

    let mut generator = CallGenerator::new(seed, time::OffsetDateTime::now_utc());
    let calls = generator.generate_batch(count);
    let written = write_landing_files(&paths.raw_dir, &calls)?;

    println!("Wrote {written} call records to {}", paths.raw_dir.display());
    if let Some(first) = calls.first() {
        println!("Sample: {} ({}, {})", first.call_id, first.agent_name, first.timestamp);
    }
    Ok(())
}
