use clap::Subcommand;
use converza_store::{parse_value, read_config_map, write_config_map, PipelineConfig};
use std::path::Path;

// ── CLI Schema ──

#[derive(Subcommand)]
pub enum ConfigCmd {
    /// Set a config value
    Set {
        /// Config key (e.g. gold_limit)
        key: String,
        /// Config value (true/false/number/string)
        value: String,
    },
    /// Get a config value
    Get {
        /// Config key
        key: String,
    },
    /// List all config values
    List,
}

// ── Dispatch ──

pub fn run(cmd: ConfigCmd, repo_root: &Path) -> anyhow::Result<()> {
    match cmd {
        ConfigCmd::Set { key, value } => set(repo_root, &key, &value),
        ConfigCmd::Get { key } => get(repo_root, &key),
        ConfigCmd::List => list(repo_root),
    }
}

// ── Command Implementations ──

/// Keys `PipelineConfig` understands.
fn known_keys() -> Vec<String> {
    match serde_json::to_value(PipelineConfig::default()) {
        Ok(serde_json::Value::Object(map)) => map.keys().cloned().collect(),
        _ => Vec::new(),
    }
}

/// `converza config set <key> <value>`
pub fn set(repo_root: &Path, key: &str, value: &str) -> anyhow::Result<()> {
    let paths = crate::workspace_paths(repo_root)?;
    if !known_keys().iter().any(|k| k == key) {
        anyhow::bail!("unknown config key `{key}` (known: {})", known_keys().join(", "));
    }

    let mut config = read_config_map(&paths.config_json)?;
    config.insert(key.to_string(), parse_value(value));

    // Reject values the pipeline would refuse to load.
    let candidate: PipelineConfig =
        serde_json::from_value(serde_json::Value::Object(config.clone()))
            .map_err(|e| anyhow::anyhow!("invalid value for `{key}`: {e}"))?;
    candidate.validate()?;

    write_config_map(&paths.config_json, &config)?;
    println!("{key} = {value}");
    Ok(())
}

/// `converza config get <key>`
pub fn get(repo_root: &Path, key: &str) -> anyhow::Result<()> {
    let paths = crate::workspace_paths(repo_root)?;
    let config = read_config_map(&paths.config_json)?;
    match config.get(key) {
        Some(val) => println!("{val}"),
        None => match serde_json::to_value(PipelineConfig::default())?.get(key) {
            Some(default) => println!("{default} (default)"),
            None => println!("(not set)"),
        },
    }
    Ok(())
}

/// `converza config list`
pub fn list(repo_root: &Path) -> anyhow::Result<()> {
    let paths = crate::workspace_paths(repo_root)?;
    let config = read_config_map(&paths.config_json)?;
    if config.is_empty() {
        println!("(no config set)");
    } else {
        for (k, v) in &config {
            println!("{k} = {v}");
        }
    }
    Ok(())
}
