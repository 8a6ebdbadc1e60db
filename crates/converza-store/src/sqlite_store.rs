//! SQLite-backed storage for the bronze, silver, and gold layers.
//!
//! One `converza.db` file in WAL mode. Monetary values are stored as integer
//! cents; the aggregate tables are rebuilt from `gold_call_analytics` with
//! upserts after each gold batch.

use converza_core::{Amount, CallRecord, EnrichedRecord, SentimentLabel, SilverRecord};
use rusqlite::{params, Connection, OptionalExtension};
use serde::Serialize;
use std::collections::HashSet;
use std::path::Path;

const SCHEMA_VERSION: &str = "1";

const SCHEMA_SQL: &str = "
CREATE TABLE IF NOT EXISTS bronze_calls (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    call_id TEXT UNIQUE NOT NULL,
    agent_name TEXT NOT NULL,
    timestamp TEXT NOT NULL,
    transcript_text TEXT NOT NULL,
    source_file TEXT,
    ingested_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
);

CREATE TABLE IF NOT EXISTS silver_calls (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    call_id TEXT UNIQUE NOT NULL,
    agent_name TEXT NOT NULL,
    call_timestamp TEXT NOT NULL,
    transcript_text TEXT NOT NULL,
    transcript_length INTEGER NOT NULL,
    call_duration_seconds INTEGER NOT NULL,
    processed_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
);
CREATE INDEX IF NOT EXISTS idx_silver_ts ON silver_calls(call_timestamp);

CREATE TABLE IF NOT EXISTS gold_call_analytics (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    call_id TEXT UNIQUE NOT NULL,
    agent_name TEXT NOT NULL,
    call_timestamp TEXT NOT NULL,
    is_conversion INTEGER NOT NULL DEFAULT 0,
    conversion_phrase TEXT,
    conversion_confidence REAL NOT NULL DEFAULT 0,
    upsell_amount_cents INTEGER NOT NULL DEFAULT 0,
    upsell_product TEXT,
    sentiment TEXT NOT NULL,
    sentiment_confidence REAL NOT NULL,
    positive_keywords_count INTEGER NOT NULL DEFAULT 0,
    negative_keywords_count INTEGER NOT NULL DEFAULT 0,
    transcript_length INTEGER NOT NULL DEFAULT 0,
    call_duration_seconds INTEGER NOT NULL DEFAULT 0,
    processed_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
);
CREATE INDEX IF NOT EXISTS idx_gold_agent ON gold_call_analytics(agent_name);
CREATE INDEX IF NOT EXISTS idx_gold_ts ON gold_call_analytics(call_timestamp);

CREATE TABLE IF NOT EXISTS gold_agent_performance (
    agent_name TEXT PRIMARY KEY,
    total_calls INTEGER NOT NULL,
    total_conversions INTEGER NOT NULL,
    conversion_rate REAL NOT NULL,
    total_upsell_cents INTEGER NOT NULL,
    avg_upsell_per_call REAL NOT NULL,
    positive_sentiment_pct REAL NOT NULL,
    negative_sentiment_pct REAL NOT NULL,
    last_updated TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS gold_daily_metrics (
    metric_date TEXT PRIMARY KEY,
    total_calls INTEGER NOT NULL,
    total_conversions INTEGER NOT NULL,
    conversion_rate REAL NOT NULL,
    total_upsell_cents INTEGER NOT NULL,
    avg_sentiment_confidence REAL NOT NULL,
    positive_calls INTEGER NOT NULL,
    negative_calls INTEGER NOT NULL,
    neutral_calls INTEGER NOT NULL,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS schema_meta (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);
";

const REFRESH_AGENT_PERFORMANCE_SQL: &str = "
INSERT INTO gold_agent_performance (
    agent_name, total_calls, total_conversions, conversion_rate,
    total_upsell_cents, avg_upsell_per_call,
    positive_sentiment_pct, negative_sentiment_pct, last_updated
)
SELECT
    agent_name,
    COUNT(*),
    SUM(is_conversion),
    ROUND(100.0 * SUM(is_conversion) / COUNT(*), 2),
    SUM(upsell_amount_cents),
    ROUND(SUM(upsell_amount_cents) / 100.0 / COUNT(*), 2),
    ROUND(100.0 * SUM(CASE WHEN sentiment = 'positive' THEN 1 ELSE 0 END) / COUNT(*), 2),
    ROUND(100.0 * SUM(CASE WHEN sentiment = 'negative' THEN 1 ELSE 0 END) / COUNT(*), 2),
    strftime('%Y-%m-%dT%H:%M:%SZ', 'now')
FROM gold_call_analytics
WHERE true
GROUP BY agent_name
ON CONFLICT(agent_name) DO UPDATE SET
    total_calls = excluded.total_calls,
    total_conversions = excluded.total_conversions,
    conversion_rate = excluded.conversion_rate,
    total_upsell_cents = excluded.total_upsell_cents,
    avg_upsell_per_call = excluded.avg_upsell_per_call,
    positive_sentiment_pct = excluded.positive_sentiment_pct,
    negative_sentiment_pct = excluded.negative_sentiment_pct,
    last_updated = excluded.last_updated
";

const REFRESH_DAILY_METRICS_SQL: &str = "
INSERT INTO gold_daily_metrics (
    metric_date, total_calls, total_conversions, conversion_rate,
    total_upsell_cents, avg_sentiment_confidence,
    positive_calls, negative_calls, neutral_calls, created_at
)
SELECT
    date(call_timestamp),
    COUNT(*),
    SUM(is_conversion),
    ROUND(100.0 * SUM(is_conversion) / COUNT(*), 2),
    SUM(upsell_amount_cents),
    ROUND(AVG(sentiment_confidence), 2),
    SUM(CASE WHEN sentiment = 'positive' THEN 1 ELSE 0 END),
    SUM(CASE WHEN sentiment = 'negative' THEN 1 ELSE 0 END),
    SUM(CASE WHEN sentiment = 'neutral' THEN 1 ELSE 0 END),
    strftime('%Y-%m-%dT%H:%M:%SZ', 'now')
FROM gold_call_analytics
WHERE date(call_timestamp) IS NOT NULL
GROUP BY date(call_timestamp)
ON CONFLICT(metric_date) DO UPDATE SET
    total_calls = excluded.total_calls,
    total_conversions = excluded.total_conversions,
    conversion_rate = excluded.conversion_rate,
    total_upsell_cents = excluded.total_upsell_cents,
    avg_sentiment_confidence = excluded.avg_sentiment_confidence,
    positive_calls = excluded.positive_calls,
    negative_calls = excluded.negative_calls,
    neutral_calls = excluded.neutral_calls,
    created_at = excluded.created_at
";

/// A row from `gold_agent_performance`.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AgentPerformance {
    pub agent_name: String,
    pub total_calls: u32,
    pub total_conversions: u32,
    pub conversion_rate: f64,
    pub total_upsell_amount: Amount,
    pub avg_upsell_per_call: f64,
    pub positive_sentiment_pct: f64,
    pub negative_sentiment_pct: f64,
}

/// A row from `gold_daily_metrics`.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DailyMetrics {
    pub metric_date: String,
    pub total_calls: u32,
    pub total_conversions: u32,
    pub conversion_rate: f64,
    pub total_upsell_amount: Amount,
    pub avg_sentiment_confidence: f64,
    pub positive_calls: u32,
    pub negative_calls: u32,
    pub neutral_calls: u32,
}

/// Overall gold KPIs.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct ConversionMetrics {
    pub total_calls: u32,
    pub conversions: u32,
    pub conversion_rate: f64,
    pub upsells: u32,
    pub total_upsell_revenue: Amount,
    pub avg_upsell_amount: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SentimentShare {
    pub label: SentimentLabel,
    pub count: u32,
    pub percentage: f64,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct SilverStats {
    pub total_records: u32,
    pub unique_agents: u32,
    pub earliest_call: Option<String>,
    pub latest_call: Option<String>,
    pub avg_transcript_length: f64,
    pub avg_call_duration_seconds: f64,
}

#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct LayerCounts {
    pub bronze: u32,
    pub silver: u32,
    pub gold: u32,
}

/// Round to two decimals, the precision every percentage is reported with.
fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

fn percent(part: u32, whole: u32) -> f64 {
    if whole == 0 {
        0.0
    } else {
        round2(100.0 * f64::from(part) / f64::from(whole))
    }
}

/// Per-row ceiling for stored cents; keeps `SUM` over a million rows inside `i64`.
const MAX_STORED_CENTS: i64 = i64::MAX >> 20;

fn cents_to_sql(amount: Amount) -> i64 {
    i64::try_from(amount.cents()).map_or(MAX_STORED_CENTS, |c| c.min(MAX_STORED_CENTS))
}

fn cents_from_sql(cents: i64) -> Amount {
    Amount::from_cents(u128::try_from(cents).unwrap_or_default())
}

/// SQLite-backed layer store.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open or create the database with full schema.
    pub fn open_or_create(db_path: &Path) -> anyhow::Result<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(db_path)?;
        let store = Self { conn };
        store.apply_pragmas()?;
        store.apply_schema()?;
        Ok(store)
    }

    /// Private in-memory database, for tests and one-off analysis.
    pub fn open_in_memory() -> anyhow::Result<Self> {
        let store = Self {
            conn: Connection::open_in_memory()?,
        };
        store.apply_schema()?;
        Ok(store)
    }

    fn apply_pragmas(&self) -> anyhow::Result<()> {
        self.conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA busy_timeout = 5000;",
        )?;
        Ok(())
    }

    fn apply_schema(&self) -> anyhow::Result<()> {
        self.conn.execute_batch(SCHEMA_SQL)?;
        self.conn.execute(
            "INSERT OR IGNORE INTO schema_meta (key, value) VALUES ('version', ?1)",
            params![SCHEMA_VERSION],
        )?;
        Ok(())
    }

    pub fn schema_version(&self) -> anyhow::Result<String> {
        let v = self.conn.query_row(
            "SELECT value FROM schema_meta WHERE key = 'version'",
            [],
            |row| row.get(0),
        )?;
        Ok(v)
    }

    // ── Bronze ──

    /// Store a raw call. Returns `false` if the call id was already ingested.
    pub fn insert_bronze(&self, call: &CallRecord, source_file: Option<&str>) -> anyhow::Result<bool> {
        let changed = self.conn.execute(
            "INSERT OR IGNORE INTO bronze_calls
                 (call_id, agent_name, timestamp, transcript_text, source_file)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                call.call_id,
                call.agent_name,
                call.timestamp,
                call.transcript_text,
                source_file
            ],
        )?;
        Ok(changed == 1)
    }

    /// Landing file names already recorded in bronze.
    pub fn ingested_source_files(&self) -> anyhow::Result<HashSet<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT source_file FROM bronze_calls WHERE source_file IS NOT NULL")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        let mut files = HashSet::new();
        for row in rows {
            files.insert(row?);
        }
        Ok(files)
    }

    // ── Silver ──

    /// Insert cleaned calls in one transaction. Returns rows actually inserted.
    pub fn insert_silver_batch(&mut self, records: &[SilverRecord]) -> anyhow::Result<usize> {
        let tx = self.conn.transaction()?;
        let mut inserted = 0;
        {
            let mut stmt = tx.prepare(
                "INSERT OR IGNORE INTO silver_calls
                     (call_id, agent_name, call_timestamp, transcript_text,
                      transcript_length, call_duration_seconds)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )?;
            for r in records {
                inserted += stmt.execute(params![
                    r.call_id,
                    r.agent_name,
                    r.call_timestamp,
                    r.transcript_text,
                    r.transcript_length,
                    r.call_duration_seconds
                ])?;
            }
        }
        tx.commit()?;
        Ok(inserted)
    }

    /// Silver rows with no gold analytics yet, newest first.
    pub fn unprocessed_silver(&self, limit: usize) -> anyhow::Result<Vec<SilverRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT s.call_id, s.agent_name, s.call_timestamp, s.transcript_text,
                    s.transcript_length, s.call_duration_seconds
             FROM silver_calls s
             LEFT JOIN gold_call_analytics g ON s.call_id = g.call_id
             WHERE g.call_id IS NULL
             ORDER BY s.call_timestamp DESC
             LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![i64::try_from(limit).unwrap_or(i64::MAX)], |row| {
            Ok(SilverRecord {
                call_id: row.get(0)?,
                agent_name: row.get(1)?,
                call_timestamp: row.get(2)?,
                transcript_text: row.get(3)?,
                transcript_length: row.get(4)?,
                call_duration_seconds: row.get(5)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn silver_stats(&self) -> anyhow::Result<SilverStats> {
        let stats = self.conn.query_row(
            "SELECT COUNT(*), COUNT(DISTINCT agent_name),
                    MIN(call_timestamp), MAX(call_timestamp),
                    AVG(transcript_length), AVG(call_duration_seconds)
             FROM silver_calls",
            [],
            |row| {
                Ok(SilverStats {
                    total_records: row.get(0)?,
                    unique_agents: row.get(1)?,
                    earliest_call: row.get(2)?,
                    latest_call: row.get(3)?,
                    avg_transcript_length: round2(row.get::<_, Option<f64>>(4)?.unwrap_or(0.0)),
                    avg_call_duration_seconds: round2(
                        row.get::<_, Option<f64>>(5)?.unwrap_or(0.0),
                    ),
                })
            },
        )?;
        Ok(stats)
    }

    // ── Gold ──

    /// Insert enriched calls in one transaction. Returns rows actually inserted.
    pub fn insert_gold_batch(&mut self, records: &[EnrichedRecord]) -> anyhow::Result<usize> {
        let tx = self.conn.transaction()?;
        let mut inserted = 0;
        {
            let mut stmt = tx.prepare(
                "INSERT OR IGNORE INTO gold_call_analytics
                     (call_id, agent_name, call_timestamp, is_conversion, conversion_phrase,
                      conversion_confidence, upsell_amount_cents, upsell_product, sentiment,
                      sentiment_confidence, positive_keywords_count, negative_keywords_count,
                      transcript_length, call_duration_seconds)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
            )?;
            for r in records {
                inserted += stmt.execute(params![
                    r.call_id,
                    r.agent_name,
                    r.call_timestamp,
                    r.is_conversion,
                    r.conversion_phrase,
                    r.conversion_confidence,
                    cents_to_sql(r.upsell_amount),
                    r.upsell_product,
                    r.sentiment.as_str(),
                    r.sentiment_confidence,
                    r.positive_keywords_count,
                    r.negative_keywords_count,
                    r.transcript_length,
                    r.call_duration_seconds
                ])?;
            }
        }
        tx.commit()?;
        Ok(inserted)
    }

    pub fn gold_record(&self, call_id: &str) -> anyhow::Result<Option<EnrichedRecord>> {
        let row = self
            .conn
            .query_row(
                "SELECT call_id, agent_name, call_timestamp, is_conversion, conversion_phrase,
                        conversion_confidence, upsell_amount_cents, upsell_product, sentiment,
                        sentiment_confidence, positive_keywords_count, negative_keywords_count,
                        transcript_length, call_duration_seconds
                 FROM gold_call_analytics WHERE call_id = ?1",
                params![call_id],
                |row| {
                    Ok((
                        EnrichedRecord {
                            call_id: row.get(0)?,
                            agent_name: row.get(1)?,
                            call_timestamp: row.get(2)?,
                            is_conversion: row.get(3)?,
                            conversion_phrase: row.get(4)?,
                            conversion_confidence: row.get(5)?,
                            upsell_amount: cents_from_sql(row.get(6)?),
                            upsell_product: row.get(7)?,
                            sentiment: SentimentLabel::Neutral,
                            sentiment_confidence: row.get(9)?,
                            positive_keywords_count: row.get(10)?,
                            negative_keywords_count: row.get(11)?,
                            transcript_length: row.get(12)?,
                            call_duration_seconds: row.get(13)?,
                        },
                        row.get::<_, String>(8)?,
                    ))
                },
            )
            .optional()?;

        match row {
            Some((mut rec, label)) => {
                rec.sentiment = label.parse()?;
                Ok(Some(rec))
            }
            None => Ok(None),
        }
    }

    /// Rebuild both aggregate tables from `gold_call_analytics`.
    pub fn refresh_aggregates(&self) -> anyhow::Result<()> {
        self.conn.execute(REFRESH_AGENT_PERFORMANCE_SQL, [])?;
        self.conn.execute(REFRESH_DAILY_METRICS_SQL, [])?;
        Ok(())
    }

    pub fn conversion_metrics(&self) -> anyhow::Result<ConversionMetrics> {
        let (total_calls, conversions, upsells, revenue_cents): (u32, u32, u32, i64) =
            self.conn.query_row(
                "SELECT COUNT(*),
                        COALESCE(SUM(is_conversion), 0),
                        COALESCE(SUM(CASE WHEN upsell_amount_cents > 0 THEN 1 ELSE 0 END), 0),
                        COALESCE(SUM(upsell_amount_cents), 0)
                 FROM gold_call_analytics",
                [],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
            )?;

        let total_upsell_revenue = cents_from_sql(revenue_cents);
        let avg_upsell_amount = if total_calls == 0 {
            0.0
        } else {
            round2(total_upsell_revenue.as_f64() / f64::from(total_calls))
        };

        Ok(ConversionMetrics {
            total_calls,
            conversions,
            conversion_rate: percent(conversions, total_calls),
            upsells,
            total_upsell_revenue,
            avg_upsell_amount,
        })
    }

    /// Share of calls per sentiment label, most frequent first.
    pub fn sentiment_distribution(&self) -> anyhow::Result<Vec<SentimentShare>> {
        let mut stmt = self.conn.prepare(
            "SELECT sentiment, COUNT(*) AS n
             FROM gold_call_analytics
             GROUP BY sentiment
             ORDER BY n DESC, sentiment",
        )?;
        let rows = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, u32>(1)?)))?
            .collect::<Result<Vec<_>, _>>()?;

        let total: u32 = rows.iter().map(|(_, n)| n).sum();
        rows.into_iter()
            .map(|(label, count)| {
                Ok(SentimentShare {
                    label: label.parse()?,
                    count,
                    percentage: percent(count, total),
                })
            })
            .collect()
    }

    /// Agents with at least `min_calls` calls, best conversion rate first.
    pub fn agent_performance(
        &self,
        min_calls: u32,
        limit: Option<usize>,
    ) -> anyhow::Result<Vec<AgentPerformance>> {
        let limit = limit.map_or(-1, |n| i64::try_from(n).unwrap_or(i64::MAX));
        let mut stmt = self.conn.prepare(
            "SELECT agent_name, total_calls, total_conversions, conversion_rate,
                    total_upsell_cents, avg_upsell_per_call,
                    positive_sentiment_pct, negative_sentiment_pct
             FROM gold_agent_performance
             WHERE total_calls >= ?1
             ORDER BY conversion_rate DESC, total_upsell_cents DESC, agent_name
             LIMIT ?2",
        )?;
        let rows = stmt.query_map(params![min_calls, limit], |row| {
            Ok(AgentPerformance {
                agent_name: row.get(0)?,
                total_calls: row.get(1)?,
                total_conversions: row.get(2)?,
                conversion_rate: row.get(3)?,
                total_upsell_amount: cents_from_sql(row.get(4)?),
                avg_upsell_per_call: row.get(5)?,
                positive_sentiment_pct: row.get(6)?,
                negative_sentiment_pct: row.get(7)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn top_performers(&self, min_calls: u32, limit: usize) -> anyhow::Result<Vec<AgentPerformance>> {
        self.agent_performance(min_calls, Some(limit))
    }

    pub fn daily_metrics(&self) -> anyhow::Result<Vec<DailyMetrics>> {
        let mut stmt = self.conn.prepare(
            "SELECT metric_date, total_calls, total_conversions, conversion_rate,
                    total_upsell_cents, avg_sentiment_confidence,
                    positive_calls, negative_calls, neutral_calls
             FROM gold_daily_metrics
             ORDER BY metric_date",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(DailyMetrics {
                metric_date: row.get(0)?,
                total_calls: row.get(1)?,
                total_conversions: row.get(2)?,
                conversion_rate: row.get(3)?,
                total_upsell_amount: cents_from_sql(row.get(4)?),
                avg_sentiment_confidence: row.get(5)?,
                positive_calls: row.get(6)?,
                negative_calls: row.get(7)?,
                neutral_calls: row.get(8)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn layer_counts(&self) -> anyhow::Result<LayerCounts> {
        let count = |table: &str| -> anyhow::Result<u32> {
            let n = self
                .conn
                .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))?;
            Ok(n)
        };
        Ok(LayerCounts {
            bronze: count("bronze_calls")?,
            silver: count("silver_calls")?,
            gold: count("gold_call_analytics")?,
        })
    }
}
