pub mod files;

use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::{Context, Result};
use parking_lot::RwLock;
use review_core::AnalysisResult;
use serde::{Deserialize, Serialize};
use sqlx::{Row, SqlitePool};
use tracing::info;

pub use files::{
    read_records, write_results_csv, write_reviews_csv, write_reviews_jsonl, IngestError,
    InputFormat,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionCount {
    pub publish_decision: String,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentimentCount {
    pub sentiment: String,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HotelSummary {
    pub hotel_id: String,
    pub total_reviews: i64,
    pub publish_stats: Vec<DecisionCount>,
    pub sentiment_stats: Vec<SentimentCount>,
}

#[derive(Debug, Clone)]
pub struct StoredResult {
    pub run_id: String,
    pub result: AnalysisResult,
}

pub trait ResultSink: Send + Sync {
    async fn persist_results(&self, run_id: &str, results: &[AnalysisResult]) -> Result<u64>;
}

pub trait ReportRepository: Send + Sync {
    async fn hotel_summary(&self, hotel_id: &str) -> Result<HotelSummary>;
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    results: Arc<RwLock<Vec<StoredResult>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.results.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.read().is_empty()
    }
}

impl ResultSink for MemoryStore {
    async fn persist_results(&self, run_id: &str, results: &[AnalysisResult]) -> Result<u64> {
        let mut guard = self.results.write();
        guard.extend(results.iter().cloned().map(|result| StoredResult {
            run_id: run_id.to_string(),
            result,
        }));
        Ok(results.len() as u64)
    }
}

impl ReportRepository for MemoryStore {
    async fn hotel_summary(&self, hotel_id: &str) -> Result<HotelSummary> {
        let guard = self.results.read();
        let mut total = 0_i64;
        let mut decisions: BTreeMap<&'static str, i64> = BTreeMap::new();
        let mut sentiments: BTreeMap<&'static str, i64> = BTreeMap::new();

        for stored in guard.iter().filter(|stored| stored.result.hotel_id == hotel_id) {
            total += 1;
            *decisions
                .entry(stored.result.publish_decision.as_code())
                .or_default() += 1;
            *sentiments
                .entry(stored.result.sentiment.as_code())
                .or_default() += 1;
        }

        Ok(HotelSummary {
            hotel_id: hotel_id.to_string(),
            total_reviews: total,
            publish_stats: decisions
                .into_iter()
                .map(|(decision, count)| DecisionCount {
                    publish_decision: decision.to_string(),
                    count,
                })
                .collect(),
            sentiment_stats: sentiments
                .into_iter()
                .map(|(sentiment, count)| SentimentCount {
                    sentiment: sentiment.to_string(),
                    count,
                })
                .collect(),
        })
    }
}

#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = SqlitePool::connect(database_url)
            .await
            .with_context(|| format!("failed connecting to sqlite at {}", database_url))?;

        let store = Self { pool };
        store.ensure_schema().await?;
        Ok(store)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS reviews_enriched (
              id INTEGER PRIMARY KEY AUTOINCREMENT,
              run_id TEXT NOT NULL,
              review_id TEXT,
              hotel_id TEXT NOT NULL,
              rating INTEGER NOT NULL,
              review_text TEXT NOT NULL,
              publish_decision TEXT NOT NULL,
              rejection_reasons TEXT NOT NULL,
              flags TEXT NOT NULL,
              tags TEXT NOT NULL,
              sentiment TEXT NOT NULL,
              summary TEXT NOT NULL,
              detected_signals TEXT NOT NULL,
              analyzed_at TEXT NOT NULL,
              model_name TEXT NOT NULL,
              prompt_version TEXT NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_reviews_enriched_hotel ON reviews_enriched (hotel_id)",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

impl ResultSink for SqliteStore {
    async fn persist_results(&self, run_id: &str, results: &[AnalysisResult]) -> Result<u64> {
        let mut tx = self.pool.begin().await?;

        for result in results {
            sqlx::query(
                r#"
                INSERT INTO reviews_enriched
                  (run_id, review_id, hotel_id, rating, review_text, publish_decision,
                   rejection_reasons, flags, tags, sentiment, summary,
                   detected_signals, analyzed_at, model_name, prompt_version)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)
                "#,
            )
            .bind(run_id)
            .bind(&result.review_id)
            .bind(&result.hotel_id)
            .bind(result.rating)
            .bind(&result.review_text)
            .bind(result.publish_decision.as_code())
            .bind(serde_json::to_string(&result.rejection_reasons)?)
            .bind(serde_json::to_string(&result.flags)?)
            .bind(serde_json::to_string(&result.tags)?)
            .bind(result.sentiment.as_code())
            .bind(&result.summary)
            .bind(serde_json::to_string(&result.detected_signals)?)
            .bind(result.analyzed_at.to_rfc3339())
            .bind(&result.model_name)
            .bind(&result.prompt_version)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        info!(run_id = %run_id, rows = results.len(), "analysis results persisted");
        Ok(results.len() as u64)
    }
}

impl ReportRepository for SqliteStore {
    async fn hotel_summary(&self, hotel_id: &str) -> Result<HotelSummary> {
        let total: i64 =
            sqlx::query("SELECT COUNT(*) AS total FROM reviews_enriched WHERE hotel_id = ?1")
                .bind(hotel_id)
                .fetch_one(&self.pool)
                .await?
                .get("total");

        let publish_stats = sqlx::query(
            r#"
            SELECT publish_decision, COUNT(*) AS count
            FROM reviews_enriched
            WHERE hotel_id = ?1
            GROUP BY publish_decision
            ORDER BY publish_decision
            "#,
        )
        .bind(hotel_id)
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(|row| DecisionCount {
            publish_decision: row.get("publish_decision"),
            count: row.get("count"),
        })
        .collect();

        let sentiment_stats = sqlx::query(
            r#"
            SELECT sentiment, COUNT(*) AS count
            FROM reviews_enriched
            WHERE hotel_id = ?1
            GROUP BY sentiment
            ORDER BY sentiment
            "#,
        )
        .bind(hotel_id)
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(|row| SentimentCount {
            sentiment: row.get("sentiment"),
            count: row.get("count"),
        })
        .collect();

        Ok(HotelSummary {
            hotel_id: hotel_id.to_string(),
            total_reviews: total,
            publish_stats,
            sentiment_stats,
        })
    }
}

#[derive(Clone)]
pub enum Store {
    Memory(MemoryStore),
    Sqlite(SqliteStore),
}

impl Store {
    pub fn memory() -> Self {
        Self::Memory(MemoryStore::new())
    }

    pub async fn sqlite(database_url: &str) -> Result<Self> {
        let sqlite = SqliteStore::connect(database_url).await?;
        Ok(Self::Sqlite(sqlite))
    }

    pub async fn from_env() -> Result<Self> {
        match std::env::var("REVIEW_DATABASE_URL") {
            Ok(database_url) if !database_url.trim().is_empty() => {
                Self::sqlite(&database_url).await
            }
            _ => Ok(Self::memory()),
        }
    }
}

impl ResultSink for Store {
    async fn persist_results(&self, run_id: &str, results: &[AnalysisResult]) -> Result<u64> {
        match self {
            Store::Memory(store) => store.persist_results(run_id, results).await,
            Store::Sqlite(store) => store.persist_results(run_id, results).await,
        }
    }
}

impl ReportRepository for Store {
    async fn hotel_summary(&self, hotel_id: &str) -> Result<HotelSummary> {
        match self {
            Store::Memory(store) => store.hotel_summary(hotel_id).await,
            Store::Sqlite(store) => store.hotel_summary(hotel_id).await,
        }
    }
}
