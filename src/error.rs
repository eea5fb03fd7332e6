//! Error handling

use axum::{
    response::{IntoResponse, Response},
    http::StatusCode,
    Json,
};
use serde_json::json;

use crate::pipeline::PredictError;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug)]
pub enum AppError {
    // Request errors
    BadRequest(String),

    // Model errors
    ModelNotLoaded(String),
    PredictionFailed(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::ModelNotLoaded(msg) => {
                tracing::error!("{}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
            AppError::PredictionFailed(msg) => {
                tracing::error!("Error during prediction: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, format!("Prediction error: {}", msg))
            }
        };

        (status, Json(json!({ "error": error_message }))).into_response()
    }
}

impl From<PredictError> for AppError {
    fn from(err: PredictError) -> Self {
        let message = err.to_string();
        match err {
            PredictError::ModelNotLoaded { .. } => AppError::ModelNotLoaded(message),
            PredictError::Vectorize(_) => AppError::BadRequest(message),
            PredictError::Inference(_) => AppError::PredictionFailed(message),
        }
    }
}

impl From<axum::extract::rejection::JsonRejection> for AppError {
    fn from(rejection: axum::extract::rejection::JsonRejection) -> Self {
        AppError::BadRequest(format!("Invalid request body: {}", rejection.body_text()))
    }
}
