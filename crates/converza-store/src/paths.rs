use std::path::{Path, PathBuf};

/// All well-known paths under `.converza/`.
#[derive(Debug, Clone)]
pub struct ConverzaPaths {
    pub root: PathBuf,
    pub converza_dir: PathBuf,
    /// Bronze landing zone: one JSON call record per file.
    pub raw_dir: PathBuf,
    pub db_path: PathBuf,
    pub config_json: PathBuf,
    pub lock_file: PathBuf,
    pub report_json: PathBuf,
}

impl ConverzaPaths {
    /// Derive all paths from a project root. Pure computation, no I/O.
    pub fn discover(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let converza_dir = root.join(".converza");
        Self {
            raw_dir: converza_dir.join("raw"),
            db_path: converza_dir.join("converza.db"),
            config_json: converza_dir.join("config.json"),
            lock_file: converza_dir.join("LOCK"),
            report_json: converza_dir.join("performance_report.json"),
            converza_dir,
            root,
        }
    }

    /// Create all required directories. Idempotent.
    pub fn ensure_layout(&self) -> anyhow::Result<()> {
        for dir in [&self.converza_dir, &self.raw_dir] {
            std::fs::create_dir_all(dir)?;
        }
        Ok(())
    }

    /// Check whether `.converza/` exists.
    pub fn is_initialized(&self) -> bool {
        self.converza_dir.is_dir()
    }

    /// Path of a landing file for `call_id`.
    pub fn raw_file(&self, call_id: &str) -> PathBuf {
        self.raw_dir.join(format!("{call_id}.json"))
    }

    /// Resolve a possibly relative path against the project root.
    pub fn resolve(&self, p: &Path) -> PathBuf {
        if p.is_absolute() {
            p.to_path_buf()
        } else {
            self.root.join(p)
        }
    }
}
