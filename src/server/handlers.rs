//! Request handlers

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Form, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Json,
};
use chrono::Utc;
use tracing::{error, info};

use crate::drift::DriftMonitor;
use crate::schema::WineFeatures;

use super::error::{Result, ServerError};
use super::state::AppState;

// ============================================================================
// Prediction Handlers
// ============================================================================

/// JSON prediction endpoint. Validation failures surface as 422 with the
/// serde field detail; the engine never sees a malformed payload.
pub async fn predict(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<WineFeatures>, JsonRejection>,
) -> Response {
    let Json(features) = match payload {
        Ok(json) => json,
        Err(rejection) => {
            return (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(serde_json::json!({ "error": rejection.body_text() })),
            )
                .into_response();
        }
    };

    match state.engine.predict(&features) {
        Ok(prediction) => {
            log_inference(&state, &features, prediction);
            Json(serde_json::json!({ "prediction": prediction })).into_response()
        }
        Err(e) => ServerError::from(e).into_response(),
    }
}

/// Form-encoded prediction endpoint backing the index page
pub async fn predict_web(
    State(state): State<Arc<AppState>>,
    Form(features): Form<WineFeatures>,
) -> Result<Html<String>> {
    let prediction = state.engine.predict(&features)?;
    log_inference(&state, &features, prediction);
    Ok(Html(render_result_page(prediction)))
}

/// Append to the inference log, swallowing failures: a lost audit row must
/// not fail a served prediction. Failures are reported to the log and the
/// failure counter instead.
fn log_inference(state: &AppState, features: &WineFeatures, prediction: f64) {
    if let Err(e) = state.log.append(features, prediction, Utc::now()) {
        error!(error = %e, "Failed to append inference log record");
        metrics::counter!("inference_log_failures").increment(1);
    }
}

// ============================================================================
// Drift Handlers
// ============================================================================

/// Fire-and-forget drift trigger: the check runs in the background and has
/// no response channel back to this caller.
pub async fn check_drift(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let monitor = DriftMonitor::new(state.layout.clone());
    tokio::task::spawn_blocking(move || match monitor.run() {
        Ok(Some(summary)) => {
            info!(share = summary.share, "Background drift check finished");
        }
        Ok(None) => {}
        Err(e) => {
            // Best-effort: a failed check skips the cycle, never the service
            error!(error = %e, "Background drift check failed");
        }
    });

    Json(serde_json::json!({
        "message": "Drift calculation started in background"
    }))
}

/// Serve the last rendered drift report, if the monitor has produced one
pub async fn drift_report(State(state): State<Arc<AppState>>) -> Response {
    serve_report_file(
        &state.layout.drift_report(),
        "No drift report yet. Run some predictions and trigger /check_drift first!",
    )
}

/// Serve the profiling report produced by the data validation stage
pub async fn data_profiling(State(state): State<Arc<AppState>>) -> Response {
    serve_report_file(
        &state.layout.profiling_report(),
        "Profiling report not found. Run the data validation pipeline first!",
    )
}

fn serve_report_file(path: &std::path::Path, missing_message: &str) -> Response {
    match std::fs::read_to_string(path) {
        Ok(html) => Html(html).into_response(),
        Err(_) => (
            StatusCode::NOT_FOUND,
            Html(format!("<h1>{}</h1>", missing_message)),
        )
            .into_response(),
    }
}

// ============================================================================
// System Handlers
// ============================================================================

pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

pub async fn get_stats(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(serde_json::json!(state.engine.stats()))
}

// ============================================================================
// UI Handler
// ============================================================================

pub async fn serve_index() -> Html<&'static str> {
    // Embedded HTML for portability
    Html(EMBEDDED_INDEX_HTML)
}

fn render_result_page(prediction: f64) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<title>Wine Quality Prediction</title>
<style>
body {{ font-family: system-ui, sans-serif; margin: 3rem auto; max-width: 32rem; color: #222; }}
.score {{ font-size: 3rem; font-weight: 700; color: #722f37; }}
a {{ color: #722f37; }}
</style>
</head>
<body>
<h1>Predicted quality</h1>
<div class="score">{:.2}</div>
<p><a href="/">Predict another sample</a></p>
</body>
</html>
"#,
        prediction
    )
}

const EMBEDDED_INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>Wine Quality Prediction</title>
<style>
body { font-family: system-ui, sans-serif; margin: 3rem auto; max-width: 40rem; color: #222; }
h1 { color: #722f37; }
form { display: grid; grid-template-columns: 1fr 1fr; gap: 0.75rem 1.5rem; }
label { display: flex; flex-direction: column; font-size: 0.9rem; gap: 0.25rem; }
input { padding: 0.4rem; border: 1px solid #bbb; border-radius: 4px; }
button { grid-column: span 2; padding: 0.6rem; background: #722f37; color: #fff; border: none; border-radius: 4px; font-size: 1rem; }
.links { margin-top: 2rem; font-size: 0.9rem; }
.links a { color: #722f37; margin-right: 1.5rem; }
</style>
</head>
<body>
<h1>Wine Quality Prediction</h1>
<form action="/predict_web" method="post">
<label>fixed acidity<input name="fixed_acidity" type="number" step="any" value="7.4" required></label>
<label>volatile acidity<input name="volatile_acidity" type="number" step="any" value="0.7" required></label>
<label>citric acid<input name="citric_acid" type="number" step="any" value="0.0" required></label>
<label>residual sugar<input name="residual_sugar" type="number" step="any" value="1.9" required></label>
<label>chlorides<input name="chlorides" type="number" step="any" value="0.076" required></label>
<label>free sulfur dioxide<input name="free_sulfur_dioxide" type="number" step="any" value="11.0" required></label>
<label>total sulfur dioxide<input name="total_sulfur_dioxide" type="number" step="any" value="34.0" required></label>
<label>density<input name="density" type="number" step="any" value="0.9978" required></label>
<label>pH<input name="pH" type="number" step="any" value="3.51" required></label>
<label>sulphates<input name="sulphates" type="number" step="any" value="0.56" required></label>
<label>alcohol<input name="alcohol" type="number" step="any" value="9.4" required></label>
<button type="submit">Predict quality</button>
</form>
<div class="links">
<a href="/drift_report">Drift report</a>
<a href="/data_profiling">Data profile</a>
<a href="/health">Health</a>
</div>
</body>
</html>
"#;
