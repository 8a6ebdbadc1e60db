//! Bronze layer: raw landing files, read without transformation.

use converza_core::CallRecord;
use globset::Glob;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Fields every landing record must carry (non-null).
pub const REQUIRED_FIELDS: [&str; 4] = ["call_id", "agent_name", "timestamp", "transcript_text"];

#[derive(Debug, thiserror::Error)]
pub enum BronzeError {
    #[error("invalid raw glob `{pattern}`: {source}")]
    Glob {
        pattern: String,
        #[source]
        source: globset::Error,
    },
    #[error("cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid call record in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("{}: missing required field `{field}`", path.display())]
    MissingField { path: PathBuf, field: &'static str },
}

/// A validated raw call and the landing file it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct LandedCall {
    pub record: CallRecord,
    pub source_file: String,
}

#[derive(Debug, Default)]
pub struct BronzeBatch {
    pub calls: Vec<LandedCall>,
    /// Files that could not be read, parsed, or validated.
    pub errors: usize,
}

/// Landing files whose name matches `glob`, sorted, at most `max_files`.
///
/// A missing landing directory is treated as empty.
pub fn list_landing_files(
    raw_dir: &Path,
    glob: &str,
    max_files: usize,
) -> Result<Vec<PathBuf>, BronzeError> {
    let matcher = Glob::new(glob)
        .map_err(|source| BronzeError::Glob {
            pattern: glob.to_string(),
            source,
        })?
        .compile_matcher();

    let entries = match fs::read_dir(raw_dir) {
        Ok(e) => e,
        Err(_) => return Ok(vec![]),
    };
    let mut files: Vec<PathBuf> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .filter(|path| {
            path.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|name| matcher.is_match(name))
        })
        .collect();
    files.sort();
    files.truncate(max_files);
    Ok(files)
}

/// Check that every required field is present and not null.
pub fn validate_record(value: &serde_json::Value) -> Result<(), &'static str> {
    for field in REQUIRED_FIELDS {
        if matches!(value.get(field), None | Some(serde_json::Value::Null)) {
            return Err(field);
        }
    }
    Ok(())
}

/// Read one landing file into a [`CallRecord`].
pub fn read_landing_file(path: &Path) -> Result<CallRecord, BronzeError> {
    let content = fs::read_to_string(path).map_err(|source| BronzeError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let json_err = |source| BronzeError::Json {
        path: path.to_path_buf(),
        source,
    };
    let value: serde_json::Value = serde_json::from_str(&content).map_err(json_err)?;
    validate_record(&value).map_err(|field| BronzeError::MissingField {
        path: path.to_path_buf(),
        field,
    })?;
    serde_json::from_value(value).map_err(json_err)
}

fn file_name(path: &Path) -> &str {
    path.file_name().and_then(|n| n.to_str()).unwrap_or_default()
}

/// Landing files not named in `ingested`, sorted, at most `max_files`.
pub fn pending_landing_files(
    raw_dir: &Path,
    glob: &str,
    ingested: &HashSet<String>,
    max_files: usize,
) -> Result<Vec<PathBuf>, BronzeError> {
    let mut files = list_landing_files(raw_dir, glob, usize::MAX)?;
    files.retain(|path| !ingested.contains(file_name(path)));
    files.truncate(max_files);
    Ok(files)
}

/// Read up to `batch_size` landing files not yet in `ingested`.
/// Bad files are logged and counted.
pub fn fetch_batch(
    raw_dir: &Path,
    glob: &str,
    ingested: &HashSet<String>,
    batch_size: usize,
) -> Result<BronzeBatch, BronzeError> {
    let files = pending_landing_files(raw_dir, glob, ingested, batch_size)?;
    tracing::info!(files = files.len(), dir = %raw_dir.display(), "bronze: listed pending landing files");

    let mut batch = BronzeBatch::default();
    for path in files {
        match read_landing_file(&path) {
            Ok(record) => batch.calls.push(LandedCall {
                record,
                source_file: file_name(&path).to_string(),
            }),
            Err(e) => {
                tracing::warn!(error = %e, "bronze: skipping landing file");
                batch.errors += 1;
            }
        }
    }
    Ok(batch)
}
