//! Predictor service - runs one request through the inference pipeline

use std::path::{Path, PathBuf};
use std::time::Instant;

use thiserror::Error;
use uuid::Uuid;

use super::annotate::analyze_risk_factors;
use super::vectorize::{vectorize, VectorizeError};
use crate::inference::{load_model, InferenceError, LoadedModel, ModelInfo};
use crate::models::{Outcome, PredictionRequest, PredictionResult};

#[derive(Debug, Error)]
pub enum PredictError {
    #[error("Model not loaded. Please ensure {} exists.", .path.display())]
    ModelNotLoaded { path: PathBuf },

    #[error(transparent)]
    Vectorize(#[from] VectorizeError),

    #[error(transparent)]
    Inference(#[from] InferenceError),
}

/// Owns the (optional) model for the lifetime of the process.
///
/// Without a model the service runs degraded: status queries work and every
/// prediction fails with `ModelNotLoaded`.
#[derive(Debug)]
pub struct Predictor {
    model: Option<LoadedModel>,
    model_path: PathBuf,
}

impl Predictor {
    pub fn new(model: Option<LoadedModel>, model_path: impl Into<PathBuf>) -> Self {
        Self { model, model_path: model_path.into() }
    }

    /// Load the model at `path`, falling back to degraded mode on any error
    pub fn from_path(path: &Path) -> Self {
        match load_model(path) {
            Ok(model) => Self::new(Some(model), path),
            Err(e) => {
                tracing::error!("Model unavailable, starting without it: {}", e);
                Self::new(None, path)
            }
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.model.is_some()
    }

    pub fn model_info(&self) -> Option<&ModelInfo> {
        self.model.as_ref().map(|m| m.info())
    }

    /// Fails fast when no model is loaded
    pub fn ensure_loaded(&self) -> Result<&LoadedModel, PredictError> {
        self.model.as_ref().ok_or_else(|| PredictError::ModelNotLoaded {
            path: self.model_path.clone(),
        })
    }

    /// Validate, vectorize, classify and annotate one request
    #[tracing::instrument(skip_all, fields(prediction_id = %Uuid::new_v4()))]
    pub fn predict(&self, request: &PredictionRequest) -> Result<PredictionResult, PredictError> {
        let model = self.ensure_loaded()?;
        let start = Instant::now();

        let features = vectorize(request)?;

        let classifier = model.classifier();
        let index = classifier.predict(&features)?;
        let probabilities = classifier.predict_proba(&features)?;

        let outcome = Outcome::from_index(index).ok_or(InferenceError::ClassOutOfRange(index))?;
        if probabilities.len() != Outcome::COUNT {
            return Err(InferenceError::ProbabilityShape(probabilities.len()).into());
        }
        if probabilities.iter().any(|p| !p.is_finite()) {
            return Err(InferenceError::NonFiniteProbability.into());
        }
        let confidence = probabilities[outcome.index()];

        let risk_factors = analyze_risk_factors(request, outcome);

        tracing::info!(
            outcome = %outcome,
            confidence,
            factors = risk_factors.len(),
            elapsed_us = start.elapsed().as_micros() as u64,
            "Prediction complete"
        );

        Ok(PredictionResult {
            outcome,
            confidence,
            probabilities,
            risk_factors,
        })
    }
}
