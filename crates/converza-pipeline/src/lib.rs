//! Medallion ETL around the transcript engine.
//!
//! Landing files are ingested into bronze as-is, cleaned into silver, and
//! enriched into gold by [`converza_transform::TranscriptAnalyzer`]. The gold
//! aggregates feed the performance report.

pub mod bronze;
pub mod etl;
pub mod gold;
pub mod report;
pub mod silver;

pub use bronze::{BronzeBatch, BronzeError, LandedCall};
pub use etl::{load_lexicon, Pipeline, PipelineStats};
pub use report::{build_report, write_report, PerformanceReport};
pub use silver::{RejectReason, SilverOutcome};
