//! HTTP request handlers

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    response::Html,
    Json,
};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::debug;

use super::error::Result;
use super::state::AppState;
use super::ui::INDEX_HTML;
use crate::inference::PatientFeatures;

/// Body of a successful prediction
#[derive(Debug, Serialize)]
pub struct PredictionResponse {
    pub prediction: &'static str,
}

// ============================================================================
// UI Handler
// ============================================================================

pub async fn serve_index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

// ============================================================================
// Inference Handlers
// ============================================================================

/// Score one patient; fields are matched by name
pub async fn predict(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<Value>, JsonRejection>,
) -> Result<Json<PredictionResponse>> {
    let Json(body) = payload?;
    let features = PatientFeatures::from_json(&body)?;
    let diagnosis = state.predictor.predict(&features)?;

    debug!(diagnosis = ?diagnosis, "Prediction served");
    Ok(Json(PredictionResponse {
        prediction: diagnosis.message(),
    }))
}

// ============================================================================
// System Handlers
// ============================================================================

pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "model": state.predictor.summary(),
        "uptime_secs": state.uptime_secs(),
    }))
}
