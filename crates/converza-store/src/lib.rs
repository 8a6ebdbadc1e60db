mod config;
mod paths;
mod sqlite_store;

pub use config::{parse_value, read_config_map, write_config_map, PipelineConfig};
pub use paths::ConverzaPaths;
pub use sqlite_store::{
    AgentPerformance, ConversionMetrics, DailyMetrics, LayerCounts, SentimentShare, SilverStats,
    SqliteStore,
};

use fs2::FileExt;
use std::fs;
use std::io::Write;
use std::path::Path;

/// Atomic write: write to temp file in same dir, then rename.
pub fn write_atomic(path: &Path, data: &[u8]) -> anyhow::Result<()> {
    let parent = path
        .parent()
        .ok_or_else(|| anyhow::anyhow!("no parent dir for {}", path.display()))?;
    fs::create_dir_all(parent)?;
    let mut tmp = tempfile::NamedTempFile::new_in(parent)?;
    tmp.write_all(data)?;
    tmp.flush()?;
    tmp.persist(path)?;
    Ok(())
}

/// Held for the duration of a pipeline run; released on drop.
pub struct RunLock {
    _file: fs::File,
}

/// Take the workspace run lock, failing fast if another run holds it.
pub fn try_lock_run(path: &Path) -> anyhow::Result<RunLock> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = fs::OpenOptions::new()
        .create(true)
        .truncate(false)
        .write(true)
        .open(path)?;
    file.try_lock_exclusive().map_err(|e| {
        anyhow::anyhow!(
            "another pipeline run holds {} ({e})",
            path.display()
        )
    })?;
    Ok(RunLock { _file: file })
}
