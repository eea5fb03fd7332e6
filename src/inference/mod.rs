//! Inference - classifier abstraction and serialized model loading
//!
//! The service only ever talks to a `Classifier`. Concrete estimators are
//! read from a JSON export of the trained model, so swapping the model type
//! needs no change outside this module.

pub mod logistic;
pub mod forest;
pub mod loader;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::models::{FeatureVector, Outcome, FEATURE_COUNT};

pub use loader::load_model;
pub use logistic::LogisticRegression;
pub use forest::RandomForest;

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("model returned class index {0}, expected 0..{count}", count = Outcome::COUNT)]
    ClassOutOfRange(usize),

    #[error("model returned {0} probabilities, expected {count}", count = Outcome::COUNT)]
    ProbabilityShape(usize),

    #[error("model returned a non-finite probability")]
    NonFiniteProbability,

    #[error("{0}")]
    Model(String),
}

// ============================================================================
// CLASSIFIER TRAIT
// ============================================================================

/// Trained multi-class classifier over the fixed feature schema
pub trait Classifier: Send + Sync {
    /// Predicted class index
    fn predict(&self, features: &FeatureVector) -> Result<usize, InferenceError>;

    /// Probability per class, aligned to class index
    fn predict_proba(&self, features: &FeatureVector) -> Result<Vec<f64>, InferenceError>;

    /// Short estimator name for status output
    fn model_type(&self) -> &'static str;
}

/// Index of the first maximum; NaN entries never win
pub fn argmax(values: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &v) in values.iter().enumerate() {
        let better = match best {
            Some((_, b)) => v > b,
            None => !v.is_nan(),
        };
        if better {
            best = Some((i, v));
        }
    }
    best.map(|(i, _)| i)
}

// ============================================================================
// LOADED MODEL
// ============================================================================

/// Metadata reported by `/model`
#[derive(Debug, Clone, Serialize)]
pub struct ModelInfo {
    pub path: String,
    pub model_type: String,
    pub n_features: usize,
    pub classes: Vec<&'static str>,
    pub loaded_at: DateTime<Utc>,
}

/// A classifier together with where and when it was loaded
#[derive(Clone)]
pub struct LoadedModel {
    classifier: Arc<dyn Classifier>,
    info: ModelInfo,
}

impl LoadedModel {
    pub fn new(classifier: Arc<dyn Classifier>, path: impl Into<String>) -> Self {
        let info = ModelInfo {
            path: path.into(),
            model_type: classifier.model_type().to_string(),
            n_features: FEATURE_COUNT,
            classes: Outcome::ALL.iter().map(|o| o.label()).collect(),
            loaded_at: Utc::now(),
        };
        Self { classifier, info }
    }

    pub fn classifier(&self) -> &dyn Classifier {
        self.classifier.as_ref()
    }

    pub fn info(&self) -> &ModelInfo {
        &self.info
    }
}

impl std::fmt::Debug for LoadedModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedModel").field("info", &self.info).finish()
    }
}
