//! Integration tests: prediction serving + logging + report endpoints

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::Utc;
use polars::prelude::*;
use tower::ServiceExt;

use vinoml::artifacts::ArtifactLayout;
use vinoml::inference::{InferenceEngine, InferenceLog};
use vinoml::preprocessing::WinePreprocessor;
use vinoml::schema::{FEATURE_COLUMNS, TARGET_COLUMN};
use vinoml::server::{create_router, AppState, ServerConfig};
use vinoml::training::WineModel;

const VALID_BODY: &str = r#"{
    "fixed acidity": 7.4, "volatile acidity": 0.7, "citric acid": 0.0,
    "residual sugar": 1.9, "chlorides": 0.076,
    "free sulfur dioxide": 11.0, "total sulfur dioxide": 34.0,
    "density": 0.9978, "pH": 3.51, "sulphates": 0.56, "alcohol": 9.4
}"#;

/// Stand up a router over freshly written artifacts in a temp dir.
/// The TempDir must stay alive for the duration of the test.
fn serve_test_app() -> (axum::Router, Arc<AppState>, tempfile::TempDir) {
    let tmp = tempfile::tempdir().unwrap();
    let layout = ArtifactLayout::new(tmp.path());
    layout.ensure_dirs().unwrap();

    // Reference dataset: varied synthetic measurements plus a target
    let mut columns: Vec<Column> = FEATURE_COLUMNS
        .iter()
        .enumerate()
        .map(|(j, name)| {
            let values: Vec<f64> = (0..50)
                .map(|i| 0.5 + ((i * 7 + j * 13) % 23) as f64 * 0.21)
                .collect();
            Series::new((*name).into(), &values).into()
        })
        .collect();
    columns.push(Series::new(TARGET_COLUMN.into(), &vec![5.0; 50]).into());
    let mut reference = DataFrame::new(columns).unwrap();

    let mut file = std::fs::File::create(layout.reference_data()).unwrap();
    CsvWriter::new(&mut file).finish(&mut reference).unwrap();

    // Fit and persist the serving artifacts
    let features = reference.select(FEATURE_COLUMNS).unwrap();
    let mut preprocessor = WinePreprocessor::new(&FEATURE_COLUMNS);
    preprocessor.fit(&features).unwrap();
    preprocessor.save(&layout.preprocessor()).unwrap();

    let model = WineModel {
        coefficients: vec![0.2; 11],
        intercept: 5.5,
        alpha: 0.1,
        l1_ratio: 0.5,
        feature_names: FEATURE_COLUMNS.iter().map(|s| s.to_string()).collect(),
        trained_at: Utc::now(),
    };
    model.save(&layout.model()).unwrap();

    let engine = InferenceEngine::load(&layout).unwrap();
    let config = ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        artifact_dir: tmp.path().display().to_string(),
        metrics_addr: None,
    };
    let state = Arc::new(AppState::new(config, engine, layout));
    let app = create_router(state.clone());
    (app, state, tmp)
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 64)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn json_request(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

// ============================================================================
// Prediction Tests
// ============================================================================

#[tokio::test]
async fn test_valid_predict_returns_prediction_and_logs_one_row() {
    let (app, state, _tmp) = serve_test_app();

    let response = app.oneshot(json_request("/predict", VALID_BODY)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert!(json["prediction"].is_f64(), "body: {}", json);

    assert_eq!(state.log.record_count().unwrap(), 1);
    let contents = std::fs::read_to_string(state.log.path()).unwrap();
    let row = contents.lines().nth(1).unwrap();
    assert!(row.starts_with("7.4,0.7,0,1.9,0.076,11,34,0.9978,3.51,0.56,9.4,"));
}

#[tokio::test]
async fn test_predict_is_deterministic_across_requests() {
    let (app, _state, _tmp) = serve_test_app();

    let a = body_json(
        app.clone()
            .oneshot(json_request("/predict", VALID_BODY))
            .await
            .unwrap(),
    )
    .await;
    let b = body_json(app.oneshot(json_request("/predict", VALID_BODY)).await.unwrap()).await;
    assert_eq!(a["prediction"], b["prediction"]);
}

#[tokio::test]
async fn test_non_numeric_field_is_422_and_not_logged() {
    let (app, state, _tmp) = serve_test_app();

    let body = VALID_BODY.replace("7.4", "\"not_a_number\"");
    let response = app.oneshot(json_request("/predict", &body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let json = body_json(response).await;
    assert!(json["error"].is_string());
    assert_eq!(state.log.record_count().unwrap(), 0);
}

#[tokio::test]
async fn test_missing_field_is_422() {
    let (app, state, _tmp) = serve_test_app();

    let body = r#"{"fixed acidity": 7.4}"#;
    let response = app.oneshot(json_request("/predict", body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(state.log.record_count().unwrap(), 0);
}

#[tokio::test]
async fn test_extra_field_is_422() {
    let (app, state, _tmp) = serve_test_app();

    let body = VALID_BODY.replacen('{', r#"{"vintage": 1998,"#, 1);
    let response = app.oneshot(json_request("/predict", &body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(state.log.record_count().unwrap(), 0);
}

#[tokio::test]
async fn test_concurrent_predicts_append_exactly_n_rows() {
    let (app, state, _tmp) = serve_test_app();

    let n = 16;
    let handles: Vec<_> = (0..n)
        .map(|_| {
            let app = app.clone();
            tokio::spawn(async move {
                let response = app.oneshot(json_request("/predict", VALID_BODY)).await.unwrap();
                assert_eq!(response.status(), StatusCode::OK);
            })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap();
    }

    assert_eq!(state.log.record_count().unwrap(), n);
    let contents = std::fs::read_to_string(state.log.path()).unwrap();
    for row in contents.lines().skip(1) {
        assert_eq!(row.split(',').count(), 13, "torn row: {}", row);
    }
}

#[tokio::test]
async fn test_form_predict_renders_html() {
    let (app, state, _tmp) = serve_test_app();

    let form = "fixed_acidity=7.4&volatile_acidity=0.7&citric_acid=0.0&residual_sugar=1.9\
                &chlorides=0.076&free_sulfur_dioxide=11.0&total_sulfur_dioxide=34.0\
                &density=0.9978&pH=3.51&sulphates=0.56&alcohol=9.4";
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/predict_web")
                .header("content-type", "application/x-www-form-urlencoded")
                .body(Body::from(form))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 64).await.unwrap();
    let html = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(html.contains("Predicted quality"));
    assert_eq!(state.log.record_count().unwrap(), 1);
}

// ============================================================================
// Report Endpoint Tests
// ============================================================================

#[tokio::test]
async fn test_drift_report_404_before_any_predictions() {
    let (app, state, _tmp) = serve_test_app();

    let response = app
        .oneshot(Request::builder().uri("/drift_report").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(!state.layout.drift_report().exists());
}

#[tokio::test]
async fn test_data_profiling_404_when_absent() {
    let (app, _state, _tmp) = serve_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/data_profiling")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_drift_report_served_after_monitor_runs() {
    let (app, state, _tmp) = serve_test_app();

    // Serve a prediction so the log exists, then run the monitor inline
    app.clone()
        .oneshot(json_request("/predict", VALID_BODY))
        .await
        .unwrap();
    vinoml::drift::DriftMonitor::new(state.layout.clone())
        .run()
        .unwrap()
        .expect("log exists");

    let response = app
        .oneshot(Request::builder().uri("/drift_report").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 256).await.unwrap();
    let html = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(html.contains("Data Drift Report"));
}

#[tokio::test]
async fn test_check_drift_acknowledges_immediately() {
    let (app, _state, _tmp) = serve_test_app();

    let response = app
        .oneshot(Request::builder().uri("/check_drift").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert!(json["message"].as_str().unwrap().contains("background"));
}

// ============================================================================
// System Endpoint Tests
// ============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let (app, _state, _tmp) = serve_test_app();

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn test_index_serves_prediction_form() {
    let (app, _state, _tmp) = serve_test_app();

    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 64).await.unwrap();
    let html = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(html.contains("/predict_web"));
    assert!(html.contains("volatile_acidity"));
}

#[tokio::test]
async fn test_stats_counts_predictions() {
    let (app, _state, _tmp) = serve_test_app();

    app.clone()
        .oneshot(json_request("/predict", VALID_BODY))
        .await
        .unwrap();
    let response = app
        .oneshot(Request::builder().uri("/stats").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let json = body_json(response).await;
    assert_eq!(json["total_predictions"], 1);
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let (app, _state, _tmp) = serve_test_app();

    let response = app
        .oneshot(Request::builder().uri("/nope").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ============================================================================
// Log Reuse Across Restarts
// ============================================================================

#[tokio::test]
async fn test_log_survives_engine_reload() {
    let (app, state, _tmp) = serve_test_app();

    app.clone()
        .oneshot(json_request("/predict", VALID_BODY))
        .await
        .unwrap();

    // A fresh log handle over the same path sees the existing record and
    // appends without rewriting the header
    let log = InferenceLog::new(state.layout.inference_log());
    assert_eq!(log.record_count().unwrap(), 1);

    app.oneshot(json_request("/predict", VALID_BODY)).await.unwrap();
    assert_eq!(log.record_count().unwrap(), 2);
    let contents = std::fs::read_to_string(log.path()).unwrap();
    assert_eq!(
        contents.lines().filter(|l| l.starts_with("fixed acidity")).count(),
        1
    );
}
