use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use review_core::{AnalysisResult, Review, ReviewError};
use review_observability::AppMetrics;
use review_storage::{HotelSummary, ReportRepository, ResultSink};
use serde::Serialize;
use serde_json::Value;
use tracing::{error, info, instrument};
use uuid::Uuid;

use crate::analyzer::ReviewAnalyzer;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchFailure {
    pub index: usize,
    pub review_id: Option<String>,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub run_id: String,
    pub hotel_id: String,
    pub total_processed: usize,
    pub publish_count: usize,
    pub reject_count: usize,
    pub failed_count: usize,
    pub failures: Vec<BatchFailure>,
    #[serde(skip)]
    pub results: Vec<AnalysisResult>,
}

/// Request-boundary orchestration: validation, batching, persistence and metrics
/// around the analyzer.
#[derive(Clone)]
pub struct ReviewService<S>
where
    S: ResultSink + ReportRepository,
{
    analyzer: Arc<ReviewAnalyzer>,
    store: Arc<S>,
    metrics: Arc<AppMetrics>,
}

impl<S> ReviewService<S>
where
    S: ResultSink + ReportRepository,
{
    pub fn new(analyzer: Arc<ReviewAnalyzer>, store: Arc<S>, metrics: Arc<AppMetrics>) -> Self {
        Self {
            analyzer,
            store,
            metrics,
        }
    }

    pub fn analyzer(&self) -> &ReviewAnalyzer {
        &self.analyzer
    }

    pub fn metrics(&self) -> &AppMetrics {
        &self.metrics
    }

    /// Dry run: the single-review path is never persisted.
    pub fn analyze_one(&self, review: &Review) -> Result<AnalysisResult, ReviewError> {
        self.metrics.inc_request();
        review.validate()?;
        Ok(self.run_analysis(review))
    }

    #[instrument(skip(self, records), fields(records = records.len()))]
    pub async fn analyze_batch(&self, hotel_id: &str, records: Vec<Value>) -> Result<BatchReport> {
        self.metrics.inc_request();
        self.metrics.inc_batch();
        anyhow::ensure!(!hotel_id.trim().is_empty(), ReviewError::MissingHotelId);

        let run_id = Uuid::new_v4().to_string();
        let mut results = Vec::with_capacity(records.len());
        let mut failures = Vec::new();

        for (index, record) in records.into_iter().enumerate() {
            let review_id = record_id(&record);
            match decode_review(hotel_id, record) {
                Ok(review) => results.push(self.run_analysis(&review)),
                Err(message) => {
                    error!(index, review_id = ?review_id, error = %message, "review failed");
                    failures.push(BatchFailure {
                        index,
                        review_id,
                        message,
                    });
                }
            }
        }

        self.metrics.add_failed_items(failures.len());
        self.store.persist_results(&run_id, &results).await?;

        let publish_count = results.iter().filter(|result| result.is_published()).count();
        let report = BatchReport {
            run_id,
            hotel_id: hotel_id.to_string(),
            total_processed: results.len(),
            publish_count,
            reject_count: results.len() - publish_count,
            failed_count: failures.len(),
            failures,
            results,
        };

        info!(
            run_id = %report.run_id,
            hotel_id = %report.hotel_id,
            processed = report.total_processed,
            published = report.publish_count,
            rejected = report.reject_count,
            failed = report.failed_count,
            "batch analyzed"
        );

        Ok(report)
    }

    pub async fn summary(&self, hotel_id: &str) -> Result<HotelSummary> {
        self.metrics.inc_request();
        self.store.hotel_summary(hotel_id).await
    }

    fn run_analysis(&self, review: &Review) -> AnalysisResult {
        let started = Instant::now();
        let result = self.analyzer.analyze(review);
        self.metrics.observe_latency(started.elapsed());
        self.metrics.record_decision(result.is_published());
        result
    }
}

/// The batch-level hotel id always overrides whatever the record carries.
pub fn decode_review(hotel_id: &str, record: Value) -> Result<Review, String> {
    let Value::Object(mut object) = record else {
        return Err("record is not a json object".to_string());
    };

    object.insert("hotel_id".to_string(), Value::from(hotel_id));
    if let Some(Value::Number(id)) = object.get("review_id") {
        let id = id.to_string();
        object.insert("review_id".to_string(), Value::from(id));
    }

    let review: Review = serde_json::from_value(Value::Object(object))
        .map_err(|err| format!("invalid review record: {err}"))?;
    review.validate().map_err(|err| err.to_string())?;
    Ok(review)
}

fn record_id(record: &Value) -> Option<String> {
    match record.get("review_id")? {
        Value::String(id) => Some(id.clone()),
        Value::Number(id) => Some(id.to_string()),
        _ => None,
    }
}
