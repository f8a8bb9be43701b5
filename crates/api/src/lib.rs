use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Json, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use review_core::{AnalysisResult, Review};
use review_engine::{BatchFailure, ReviewAnalyzer, ReviewService};
use review_ml::ModelStack;
use review_observability::{AppMetrics, MetricsSnapshot};
use review_storage::{read_records, write_results_csv, InputFormat, Store};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

const MAX_BODY_BYTES: usize = 256 * 1024;
const EXPORT_FILE_NAME: &str = "reviews_enriched.csv";

#[derive(Clone)]
pub struct ApiState {
    pub service: Arc<ReviewService<Store>>,
    pub metrics: Arc<AppMetrics>,
    pub output_dir: Arc<PathBuf>,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    timestamp_utc: String,
    model_name: String,
    metrics: MetricsSnapshot,
}

#[derive(Debug, Deserialize)]
struct BulkQuery {
    hotel_id: String,
    input_format: String,
    input_path: String,
}

#[derive(Debug, Serialize)]
struct BulkResponse {
    run_id: String,
    hotel_id: String,
    total_processed: usize,
    publish_count: usize,
    reject_count: usize,
    failed_count: usize,
    failures: Vec<BatchFailure>,
    csv_output: String,
}

#[derive(Debug, Deserialize)]
struct SummaryQuery {
    hotel_id: String,
}

pub async fn build_app() -> Result<Router> {
    let stack = ModelStack::load_default()?;
    let store = Store::from_env().await?;
    let output_dir = env::var("REVIEW_OUTPUT_DIR").unwrap_or_else(|_| "output".to_string());

    build_app_with(stack, store, output_dir)
}

pub fn build_app_with(
    stack: ModelStack,
    store: Store,
    output_dir: impl Into<PathBuf>,
) -> Result<Router> {
    let metrics = AppMetrics::shared();
    let analyzer =
        ReviewAnalyzer::from_stack(&stack).context("failed to compile moderation patterns")?;
    let service = ReviewService::new(Arc::new(analyzer), Arc::new(store), metrics.clone());

    let state = ApiState {
        service: Arc::new(service),
        metrics,
        output_dir: Arc::new(output_dir.into()),
    };

    Ok(build_router(state))
}

pub fn build_router(state: ApiState) -> Router {
    Router::new()
        .route("/", get(health))
        .route("/health", get(health))
        .route("/reviews/analyze-one", post(analyze_one))
        .route("/reviews/analyze-bulk", post(analyze_bulk))
        .route("/reports/summary", get(report_summary))
        .layer(TraceLayer::new_for_http())
        // Set must wrap Propagate so the generated id reaches the response.
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .with_state(state)
}

async fn health(State(state): State<ApiState>) -> impl IntoResponse {
    let payload = HealthResponse {
        status: "ok",
        timestamp_utc: chrono::Utc::now().to_rfc3339(),
        model_name: state.service.analyzer().model_name().to_string(),
        metrics: state.metrics.snapshot(),
    };
    (StatusCode::OK, Json(payload))
}

async fn analyze_one(
    State(state): State<ApiState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Response {
    let Json(payload) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return rejection_response(rejection.status(), rejection.body_text()),
    };

    let review: Review = match serde_json::from_value(payload) {
        Ok(review) => review,
        Err(err) => {
            return error_response(StatusCode::BAD_REQUEST, "invalid_review", err.to_string())
        }
    };

    match state.service.analyze_one(&review) {
        Ok(result) => (StatusCode::OK, Json(result)).into_response(),
        Err(err) => error_response(StatusCode::BAD_REQUEST, "invalid_review", err.to_string()),
    }
}

async fn analyze_bulk(
    State(state): State<ApiState>,
    query: Result<Query<BulkQuery>, QueryRejection>,
) -> Response {
    let Query(query) = match query {
        Ok(query) => query,
        Err(rejection) => return rejection_response(rejection.status(), rejection.body_text()),
    };

    if query.hotel_id.trim().is_empty() {
        return error_response(
            StatusCode::BAD_REQUEST,
            "invalid_hotel_id",
            "hotel_id must not be blank".to_string(),
        );
    }

    let format = match query.input_format.parse::<InputFormat>() {
        Ok(format) => format,
        Err(err) => {
            return error_response(StatusCode::BAD_REQUEST, "unsupported_format", err.to_string())
        }
    };

    let input_path = PathBuf::from(&query.input_path);
    let records = match tokio::task::spawn_blocking(move || read_records(input_path, format)).await
    {
        Ok(Ok(records)) => records,
        Ok(Err(err)) => {
            warn!(input_path = %query.input_path, error = %err, "bulk input rejected");
            return error_response(StatusCode::BAD_REQUEST, "ingest_failed", err.to_string());
        }
        Err(err) => {
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "ingest_failed",
                err.to_string(),
            )
        }
    };

    let report = match state.service.analyze_batch(&query.hotel_id, records).await {
        Ok(report) => report,
        Err(err) => {
            error!(hotel_id = %query.hotel_id, error = %err, "bulk analysis failed");
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "analysis_failed",
                format!("{err:#}"),
            );
        }
    };

    let csv_output = export_path(&state.output_dir);
    if let Err(err) = export_results(csv_output.clone(), report.results).await {
        error!(path = %csv_output.display(), error = %err, "csv export failed");
        return error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "export_failed",
            format!("{err:#}"),
        );
    }
    info!(run_id = %report.run_id, csv_output = %csv_output.display(), "bulk export written");

    let response = BulkResponse {
        run_id: report.run_id,
        hotel_id: report.hotel_id,
        total_processed: report.total_processed,
        publish_count: report.publish_count,
        reject_count: report.reject_count,
        failed_count: report.failed_count,
        failures: report.failures,
        csv_output: csv_output.display().to_string(),
    };
    (StatusCode::OK, Json(response)).into_response()
}

async fn report_summary(
    State(state): State<ApiState>,
    query: Result<Query<SummaryQuery>, QueryRejection>,
) -> Response {
    let Query(query) = match query {
        Ok(query) => query,
        Err(rejection) => return rejection_response(rejection.status(), rejection.body_text()),
    };

    match state.service.summary(&query.hotel_id).await {
        Ok(summary) => (StatusCode::OK, Json(summary)).into_response(),
        Err(err) => error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "summary_failed",
            format!("{err:#}"),
        ),
    }
}

async fn export_results(path: PathBuf, results: Vec<AnalysisResult>) -> Result<()> {
    tokio::task::spawn_blocking(move || write_results_csv(&path, &results))
        .await
        .context("csv export task panicked")?
        .context("failed writing csv export")
}

/// Extractor failures get the same JSON error shape as handler errors.
fn rejection_response(status: StatusCode, message: String) -> Response {
    error_response(status, "invalid_request", message)
}

fn error_response(status: StatusCode, code: &str, message: String) -> Response {
    (
        status,
        Json(serde_json::json!({
            "error": code,
            "message": message
        })),
    )
        .into_response()
}

/// Bulk runs always overwrite the same export file under the output directory.
pub fn export_path(output_dir: &Path) -> PathBuf {
    output_dir.join(EXPORT_FILE_NAME)
}
