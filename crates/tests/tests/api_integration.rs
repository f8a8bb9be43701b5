use std::fs;
use std::path::Path;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use review_api::build_app_with;
use review_ml::ModelStack;
use review_storage::Store;
use serde_json::{json, Value};
use tower::ServiceExt;

fn app(output_dir: &Path) -> Router {
    build_app_with(ModelStack::default(), Store::memory(), output_dir).expect("app should build")
}

async fn read_json(response: axum::response::Response) -> Value {
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&body).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn health_reports_ok_with_request_id() {
    let dir = tempfile::tempdir().unwrap();

    for uri in ["/", "/health"] {
        let response = app(dir.path())
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
        let parsed = read_json(response).await;
        assert_eq!(parsed["status"], "ok");
        assert!(parsed["timestamp_utc"].is_string());
        assert!(parsed["metrics"].is_object());
    }
}

#[tokio::test]
async fn analyze_one_rejects_price_and_keeps_enrichment() {
    let dir = tempfile::tempdir().unwrap();
    let request = post_json(
        "/reviews/analyze-one",
        json!({
            "review_id": "R1",
            "hotel_id": "HOTEL_001",
            "rating": 4,
            "review_text": "I paid 6000 per night, room was clean"
        }),
    );

    let response = app(dir.path()).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let parsed = read_json(response).await;
    assert_eq!(parsed["review_id"], "R1");
    assert_eq!(parsed["publish_decision"], "REJECT");
    assert_eq!(parsed["rejection_reasons"], json!(["PRICE_MENTIONED"]));
    assert_eq!(parsed["sentiment"], "SENTIMENT_POSITIVE");
    assert_eq!(parsed["detected_signals"]["price"], true);
    assert_eq!(parsed["model_name"], "mock-llm-v1");
    assert_eq!(parsed["prompt_version"], "v1.0");
    let tags = parsed["tags"].as_array().unwrap();
    assert!(tags.contains(&json!("CLEANLINESS")));
    assert!(tags.contains(&json!("PRICE_MENTIONED")));
}

#[tokio::test]
async fn analyze_one_publishes_clean_review() {
    let dir = tempfile::tempdir().unwrap();
    let request = post_json(
        "/reviews/analyze-one",
        json!({
            "hotel_id": "HOTEL_001",
            "rating": 3,
            "review_text": "Hotel was okay, nothing special"
        }),
    );

    let response = app(dir.path()).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let parsed = read_json(response).await;
    assert_eq!(parsed["publish_decision"], "PUBLISH");
    assert_eq!(parsed["rejection_reasons"], json!([]));
    assert_eq!(parsed["sentiment"], "SENTIMENT_NEUTRAL");
    assert_eq!(parsed["review_id"], Value::Null);
}

#[tokio::test]
async fn analyze_one_refuses_invalid_reviews() {
    let dir = tempfile::tempdir().unwrap();
    let invalid = [
        json!({ "rating": 4, "review_text": "No hotel given" }),
        json!({ "hotel_id": "HOTEL_001", "rating": 9, "review_text": "Out of range" }),
        json!({ "hotel_id": "HOTEL_001", "rating": 4 }),
    ];

    for body in invalid {
        let response = app(dir.path())
            .oneshot(post_json("/reviews/analyze-one", body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let parsed = read_json(response).await;
        assert_eq!(parsed["error"], "invalid_review");
        assert!(parsed["message"].is_string());
    }
}

#[tokio::test]
async fn bulk_run_exports_csv_and_feeds_summary() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("reviews.jsonl");
    let lines = [
        json!({ "review_id": "R1", "hotel_id": "HOTEL_001", "rating": 5, "review_text": "Great stay, rooms were very clean and staff was polite" }),
        json!({ "review_id": "R2", "hotel_id": "HOTEL_001", "rating": 1, "review_text": "Worst stay ever, very dirty rooms. Call me at 9876543210" }),
        json!({ "review_id": "R3", "hotel_id": "HOTEL_001", "rating": 3 }),
        json!({ "review_id": "R4", "hotel_id": "HOTEL_001", "rating": 2, "review_text": "Bad experience, too much noise at night" }),
    ];
    let contents = lines
        .iter()
        .map(Value::to_string)
        .collect::<Vec<_>>()
        .join("\n");
    fs::write(&input, contents).unwrap();

    let app = app(&dir.path().join("out"));
    let uri = format!(
        "/reviews/analyze-bulk?hotel_id=HOTEL_001&input_format=jsonl&input_path={}",
        input.display()
    );
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let report = read_json(response).await;
    assert_eq!(report["hotel_id"], "HOTEL_001");
    assert_eq!(report["total_processed"], 3);
    assert_eq!(report["publish_count"], 2);
    assert_eq!(report["reject_count"], 1);
    assert_eq!(report["failed_count"], 1);
    assert_eq!(report["failures"][0]["review_id"], "R3");
    assert!(!report["run_id"].as_str().unwrap().is_empty());

    let csv_output = report["csv_output"].as_str().unwrap();
    let exported = fs::read_to_string(csv_output).unwrap();
    assert!(exported.starts_with("review_id,hotel_id,rating,review_text,publish_decision"));
    assert_eq!(exported.lines().count(), 4);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/reports/summary?hotel_id=HOTEL_001")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let summary = read_json(response).await;
    assert_eq!(summary["hotel_id"], "HOTEL_001");
    assert_eq!(summary["total_reviews"], 3);
    assert_eq!(
        summary["publish_stats"],
        json!([
            { "publish_decision": "PUBLISH", "count": 2 },
            { "publish_decision": "REJECT", "count": 1 }
        ])
    );
}

#[tokio::test]
async fn bulk_rejects_unknown_format_and_missing_file() {
    let dir = tempfile::tempdir().unwrap();

    let response = app(dir.path())
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/reviews/analyze-bulk?hotel_id=HOTEL_001&input_format=xml&input_path=reviews.xml")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(read_json(response).await["error"], "unsupported_format");

    let missing = dir.path().join("missing.jsonl");
    let response = app(dir.path())
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!(
                    "/reviews/analyze-bulk?hotel_id=HOTEL_001&input_format=jsonl&input_path={}",
                    missing.display()
                ))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(read_json(response).await["error"], "ingest_failed");
}

#[tokio::test]
async fn summary_for_unknown_hotel_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    let response = app(dir.path())
        .oneshot(
            Request::builder()
                .uri("/reports/summary?hotel_id=NOPE")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let summary = read_json(response).await;
    assert_eq!(summary["total_reviews"], 0);
    assert_eq!(summary["publish_stats"], json!([]));
    assert_eq!(summary["sentiment_stats"], json!([]));
}

#[tokio::test]
async fn malformed_body_gets_json_error() {
    let dir = tempfile::tempdir().unwrap();
    let request = Request::builder()
        .method("POST")
        .uri("/reviews/analyze-one")
        .header("content-type", "application/json")
        .body(Body::from("not json"))
        .unwrap();

    let response = app(dir.path()).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(response.headers()["content-type"], "application/json");
    let parsed = read_json(response).await;
    assert_eq!(parsed["error"], "invalid_request");
    assert!(parsed["message"].is_string());
}

#[tokio::test]
async fn missing_query_parameters_get_json_error() {
    let dir = tempfile::tempdir().unwrap();

    let response = app(dir.path())
        .oneshot(
            Request::builder()
                .uri("/reports/summary")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let parsed = read_json(response).await;
    assert_eq!(parsed["error"], "invalid_request");
    assert!(parsed["message"].as_str().unwrap().contains("hotel_id"));

    let response = app(dir.path())
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/reviews/analyze-bulk?input_format=jsonl")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(read_json(response).await["error"], "invalid_request");
}
