use converza_store::{write_config_map, ConverzaPaths, PipelineConfig, SqliteStore};
use std::path::Path;

pub fn execute(repo_root: &Path) -> anyhow::Result<()> {
    let paths = ConverzaPaths::discover(repo_root);
    let already = paths.is_initialized();

    paths.ensure_layout()?;
    SqliteStore::open_or_create(&paths.db_path)?;

    if !paths.config_json.exists() {
        let defaults = match serde_json::to_value(PipelineConfig::default())? {
            serde_json::Value::Object(map) => map,
            _ => serde_json::Map::new(),
        };
        write_config_map(&paths.config_json, &defaults)?;
    }

    if already {
        println!("Already initialized at {}", paths.converza_dir.display());
    } else {
        println!("Initialized .converza/ at {}", paths.converza_dir.display());
        println!("  landing dir: {}", paths.raw_dir.display());
        println!("  database:    {}", paths.db_path.display());
    }
    Ok(())
}
