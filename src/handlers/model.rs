//! Model metadata handler

use axum::{extract::State, Json};

use crate::inference::ModelInfo;
use crate::{AppResult, AppState};

/// Describe the loaded model
pub async fn info(State(state): State<AppState>) -> AppResult<Json<ModelInfo>> {
    let model = state.predictor.ensure_loaded()?;
    Ok(Json(model.info().clone()))
}
