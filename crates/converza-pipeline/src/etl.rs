use std::path::Path;
use std::time::Instant;

use converza_core::CallRecord;
use converza_store::{try_lock_run, ConverzaPaths, PipelineConfig, SqliteStore};
use converza_transform::{Lexicon, TranscriptAnalyzer};
use serde::{Deserialize, Serialize};

use crate::report::{build_report, write_report, PerformanceReport};
use crate::{bronze, gold, silver};

/// Counters for one pipeline invocation.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PipelineStats {
    pub bronze_records_fetched: usize,
    pub silver_records_processed: usize,
    pub gold_records_created: usize,
    /// Landing files and records skipped as invalid.
    pub errors: usize,
    pub duration_seconds: f64,
}

impl PipelineStats {
    fn log_summary(&self, mode: &str) {
        tracing::info!(
            mode,
            bronze = self.bronze_records_fetched,
            silver = self.silver_records_processed,
            gold = self.gold_records_created,
            errors = self.errors,
            duration_seconds = self.duration_seconds,
            "pipeline run finished"
        );
    }
}

/// Built-in lexicon, or the JSON lexicon at `path`.
pub fn load_lexicon(path: Option<&Path>) -> anyhow::Result<Lexicon> {
    let Some(path) = path else {
        return Ok(Lexicon::builtin());
    };
    let content = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("cannot read lexicon {}: {e}", path.display()))?;
    let lexicon = Lexicon::from_json_str(&content)
        .map_err(|e| anyhow::anyhow!("invalid lexicon {}: {e}", path.display()))?;
    tracing::info!(path = %path.display(), "loaded custom lexicon");
    Ok(lexicon)
}

/// One workspace's pipeline: store, compiled analyzer, and settings.
pub struct Pipeline {
    paths: ConverzaPaths,
    config: PipelineConfig,
    store: SqliteStore,
    analyzer: TranscriptAnalyzer,
}

impl Pipeline {
    pub fn open(paths: &ConverzaPaths, config: PipelineConfig) -> anyhow::Result<Self> {
        paths.ensure_layout()?;
        let store = SqliteStore::open_or_create(&paths.db_path)?;
        let lexicon_path = config.lexicon_path.as_deref().map(|p| paths.resolve(p));
        let lexicon = load_lexicon(lexicon_path.as_deref())?;
        let analyzer = TranscriptAnalyzer::with_lexicon(&lexicon)?;
        Ok(Self {
            paths: paths.clone(),
            config,
            store,
            analyzer,
        })
    }

    pub fn store(&self) -> &SqliteStore {
        &self.store
    }

    pub fn analyzer(&self) -> &TranscriptAnalyzer {
        &self.analyzer
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Bronze ingest, silver cleaning, gold enrichment.
    ///
    /// `batch_size` caps landing files read, counting only files not yet in
    /// bronze; `None` uses the configured size.
    pub fn run_full(&mut self, batch_size: Option<usize>) -> anyhow::Result<PipelineStats> {
        let _lock = try_lock_run(&self.paths.lock_file)?;
        let started = Instant::now();
        let batch_size = batch_size.unwrap_or(self.config.batch_size).max(1);
        tracing::info!(batch_size, "starting full pipeline run");

        let mut stats = PipelineStats::default();

        let records = self.ingest_bronze(batch_size, &mut stats)?;

        if records.is_empty() {
            tracing::warn!("silver: no records to process");
        } else {
            let outcome =
                silver::process_batch(&mut self.store, &records, self.config.silver_chunk_size)?;
            stats.silver_records_processed = outcome.inserted;
            stats.errors += outcome.rejected;
            tracing::info!(
                inserted = outcome.inserted,
                rejected = outcome.rejected,
                "silver: batch processed"
            );
        }

        stats.gold_records_created =
            gold::process_unprocessed(&mut self.store, &self.analyzer, self.config.gold_limit)?;

        stats.duration_seconds = started.elapsed().as_secs_f64();
        stats.log_summary("full");
        Ok(stats)
    }

    /// Enrich silver rows not yet in gold, without reading landing files.
    pub fn run_incremental(&mut self) -> anyhow::Result<PipelineStats> {
        let _lock = try_lock_run(&self.paths.lock_file)?;
        let started = Instant::now();
        tracing::info!(limit = self.config.incremental_limit, "starting incremental update");

        let mut stats = PipelineStats {
            gold_records_created: gold::process_unprocessed(
                &mut self.store,
                &self.analyzer,
                self.config.incremental_limit,
            )?,
            ..Default::default()
        };

        stats.duration_seconds = started.elapsed().as_secs_f64();
        stats.log_summary("incremental");
        Ok(stats)
    }

    /// Build the performance report for `stats` and write it atomically.
    pub fn write_report(&self, stats: &PipelineStats, top: usize) -> anyhow::Result<PerformanceReport> {
        let report = build_report(&self.store, stats, self.config.top_performers_min_calls, top)?;
        write_report(&self.paths.report_json, &report)?;
        tracing::info!(path = %self.paths.report_json.display(), "performance report written");
        Ok(report)
    }

    fn ingest_bronze(
        &mut self,
        batch_size: usize,
        stats: &mut PipelineStats,
    ) -> anyhow::Result<Vec<CallRecord>> {
        let ingested = self.store.ingested_source_files()?;
        let batch = bronze::fetch_batch(
            &self.paths.raw_dir,
            &self.config.raw_glob,
            &ingested,
            batch_size,
        )?;
        stats.errors += batch.errors;
        stats.bronze_records_fetched = batch.calls.len();

        let mut fresh = 0;
        for call in &batch.calls {
            if self.store.insert_bronze(&call.record, Some(&call.source_file))? {
                fresh += 1;
            }
        }
        tracing::info!(
            fetched = batch.calls.len(),
            new = fresh,
            invalid = batch.errors,
            "bronze: landing files ingested"
        );

        Ok(batch.calls.into_iter().map(|c| c.record).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_lexicon_file_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let err = load_lexicon(Some(&tmp.path().join("lex.json"))).unwrap_err();
        assert!(err.to_string().contains("cannot read lexicon"));
    }

    #[test]
    fn custom_lexicon_is_used() {
        let tmp = tempfile::tempdir().unwrap();
        let mut lexicon = Lexicon::builtin();
        lexicon.conversion_patterns = vec!["deal".into()];
        std::fs::write(
            tmp.path().join("lex.json"),
            serde_json::to_string(&lexicon).unwrap(),
        )
        .unwrap();

        let paths = ConverzaPaths::discover(tmp.path());
        let config = PipelineConfig {
            lexicon_path: Some("lex.json".into()),
            ..Default::default()
        };
        let pipeline = Pipeline::open(&paths, config).unwrap();
        assert!(pipeline.analyzer().detect_conversion("ok, deal").is_conversion);
        assert!(!pipeline.analyzer().detect_conversion("go ahead").is_conversion);
    }

    #[test]
    fn concurrent_run_is_refused() {
        let tmp = tempfile::tempdir().unwrap();
        let paths = ConverzaPaths::discover(tmp.path());
        let mut pipeline = Pipeline::open(&paths, PipelineConfig::default()).unwrap();
        let _held = try_lock_run(&paths.lock_file).unwrap();
        assert!(pipeline.run_full(None).is_err());
        assert!(pipeline.run_incremental().is_err());
    }

    #[test]
    fn empty_workspace_runs_clean() {
        let tmp = tempfile::tempdir().unwrap();
        let paths = ConverzaPaths::discover(tmp.path());
        let mut pipeline = Pipeline::open(&paths, PipelineConfig::default()).unwrap();
        let stats = pipeline.run_full(None).unwrap();
        assert_eq!(stats.bronze_records_fetched, 0);
        assert_eq!(stats.gold_records_created, 0);
        assert_eq!(stats.errors, 0);
    }
}
