//! Prediction handlers

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde_json::Value;

use crate::models::{PredictResponse, PredictResponseV2, PredictionRequest, PredictionResult};
use crate::{AppError, AppResult, AppState};

/// Predict an outcome, risk factors as plain strings
pub async fn predict(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> AppResult<Json<PredictResponse>> {
    let result = run(&state, body)?;
    Ok(Json(result.into()))
}

/// Predict an outcome, risk factors tagged with polarity
pub async fn predict_v2(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> AppResult<Json<PredictResponseV2>> {
    let result = run(&state, body)?;
    Ok(Json(result.into()))
}

fn run(state: &AppState, body: Result<Json<Value>, JsonRejection>) -> AppResult<PredictionResult> {
    // No model: fail before looking at the body
    state.predictor.ensure_loaded()?;

    let Json(body) = body?;
    let request = PredictionRequest::from_json(body)
        .ok_or_else(|| AppError::BadRequest("Request body must be a JSON object".to_string()))?;

    Ok(state.predictor.predict(&request)?)
}
