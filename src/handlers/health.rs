//! Status handlers

use axum::{extract::State, Json};
use serde::Serialize;

use crate::AppState;

#[derive(Serialize)]
pub struct HomeResponse {
    message: &'static str,
    status: &'static str,
    model_loaded: bool,
}

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    model_loaded: bool,
}

pub async fn home(State(state): State<AppState>) -> Json<HomeResponse> {
    Json(HomeResponse {
        message: "Student Dropout Prediction API",
        status: "running",
        model_loaded: state.predictor.is_loaded(),
    })
}

pub async fn check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        model_loaded: state.predictor.is_loaded(),
    })
}
