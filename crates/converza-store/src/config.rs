use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Pipeline settings read from `.converza/config.json`.
///
/// Every field has a default, so an absent or partial file is valid.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PipelineConfig {
    /// Maximum landing files ingested per run.
    pub batch_size: usize,
    /// Records cleaned and inserted per silver transaction.
    pub silver_chunk_size: usize,
    /// Unprocessed silver rows enriched by a full run.
    pub gold_limit: usize,
    /// Unprocessed silver rows enriched by an incremental update.
    pub incremental_limit: usize,
    pub top_performers_min_calls: u32,
    /// Glob selecting landing files inside the raw directory.
    pub raw_glob: String,
    pub log_level: String,
    /// Optional JSON lexicon replacing the built-in keyword lists.
    pub lexicon_path: Option<PathBuf>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            batch_size: 100,
            silver_chunk_size: 50,
            gold_limit: 100,
            incremental_limit: 50,
            top_performers_min_calls: 5,
            raw_glob: "*.json".to_string(),
            log_level: "info".to_string(),
            lexicon_path: None,
        }
    }
}

impl PipelineConfig {
    /// Load from `path` (defaults if missing) and apply environment overrides.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let map = read_config_map(path)?;
        let mut config: PipelineConfig = serde_json::from_value(serde_json::Value::Object(map))
            .map_err(|e| anyhow::anyhow!("invalid config {}: {e}", path.display()))?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        let Ok(raw) = std::env::var("CONVERZA_BATCH_SIZE") else {
            return;
        };
        match raw.parse() {
            Ok(n) => {
                tracing::debug!(batch_size = n, "batch size from CONVERZA_BATCH_SIZE");
                self.batch_size = n;
            }
            Err(_) => tracing::warn!(value = %raw, "ignoring non-numeric CONVERZA_BATCH_SIZE"),
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        for (key, value) in [
            ("batch_size", self.batch_size),
            ("silver_chunk_size", self.silver_chunk_size),
            ("gold_limit", self.gold_limit),
            ("incremental_limit", self.incremental_limit),
        ] {
            if value == 0 {
                anyhow::bail!("config `{key}` must be at least 1");
            }
        }
        Ok(())
    }
}

/// Read config as a raw JSON object. Returns empty map if file doesn't exist.
pub fn read_config_map(path: &Path) -> anyhow::Result<serde_json::Map<String, serde_json::Value>> {
    if !path.exists() {
        return Ok(serde_json::Map::new());
    }
    let content = std::fs::read_to_string(path)?;
    let val: serde_json::Value = serde_json::from_str(&content)?;
    match val {
        serde_json::Value::Object(map) => Ok(map),
        _ => Ok(serde_json::Map::new()),
    }
}

pub fn write_config_map(
    path: &Path,
    config: &serde_json::Map<String, serde_json::Value>,
) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(&config)?;
    crate::write_atomic(path, json.as_bytes())
}

/// Parse a string value into an appropriate JSON value (bool/number/string).
pub fn parse_value(s: &str) -> serde_json::Value {
    match s {
        "true" => serde_json::Value::Bool(true),
        "false" => serde_json::Value::Bool(false),
        _ => {
            if let Ok(n) = s.parse::<i64>() {
                serde_json::Value::Number(n.into())
            } else if let Ok(f) = s.parse::<f64>() {
                serde_json::json!(f)
            } else {
                serde_json::Value::String(s.to_string())
            }
        }
    }
}
