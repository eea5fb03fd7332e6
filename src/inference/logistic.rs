//! Multinomial logistic regression

use serde::Deserialize;

use super::{argmax, Classifier, InferenceError};
use crate::models::{FeatureVector, Outcome, FEATURE_COUNT};

/// Standard scaling applied before the linear step: `(x - mean) / scale`
#[derive(Debug, Clone, Deserialize)]
pub struct StandardScaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogisticRegression {
    #[serde(default)]
    pub feature_names: Option<Vec<String>>,
    #[serde(default)]
    pub n_classes: Option<usize>,
    /// One row of `FEATURE_COUNT` weights per class
    pub coefficients: Vec<Vec<f64>>,
    pub intercepts: Vec<f64>,
    #[serde(default)]
    pub scaler: Option<StandardScaler>,
}

impl LogisticRegression {
    /// Structural checks run once at load time
    pub fn validate(&self) -> Result<(), String> {
        if self.coefficients.len() != Outcome::COUNT {
            return Err(format!(
                "expected {} coefficient rows, found {}",
                Outcome::COUNT,
                self.coefficients.len()
            ));
        }
        if let Some(row) = self.coefficients.iter().position(|r| r.len() != FEATURE_COUNT) {
            return Err(format!(
                "coefficient row {} has {} weights, expected {}",
                row,
                self.coefficients[row].len(),
                FEATURE_COUNT
            ));
        }
        if self.intercepts.len() != Outcome::COUNT {
            return Err(format!(
                "expected {} intercepts, found {}",
                Outcome::COUNT,
                self.intercepts.len()
            ));
        }
        if let Some(scaler) = &self.scaler {
            if scaler.mean.len() != FEATURE_COUNT || scaler.scale.len() != FEATURE_COUNT {
                return Err(format!("scaler must have {} mean and scale values", FEATURE_COUNT));
            }
            if scaler.scale.iter().any(|s| *s == 0.0 || !s.is_finite()) {
                return Err("scaler contains a zero or non-finite scale".to_string());
            }
        }
        Ok(())
    }

    fn scaled(&self, features: &FeatureVector) -> [f64; FEATURE_COUNT] {
        let mut x = *features.as_array();
        if let Some(scaler) = &self.scaler {
            for i in 0..FEATURE_COUNT {
                x[i] = (x[i] - scaler.mean[i]) / scaler.scale[i];
            }
        }
        x
    }

    /// Raw class scores (logits)
    pub fn decision_function(&self, features: &FeatureVector) -> Vec<f64> {
        let x = self.scaled(features);
        self.coefficients
            .iter()
            .zip(&self.intercepts)
            .map(|(weights, bias)| {
                weights.iter().zip(x.iter()).map(|(w, v)| w * v).sum::<f64>() + bias
            })
            .collect()
    }
}

/// Numerically stable softmax
fn softmax(scores: &[f64]) -> Vec<f64> {
    let max = scores.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = scores.iter().map(|s| (s - max).exp()).collect();
    let sum: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

impl Classifier for LogisticRegression {
    fn predict(&self, features: &FeatureVector) -> Result<usize, InferenceError> {
        let proba = self.predict_proba(features)?;
        argmax(&proba).ok_or(InferenceError::NonFiniteProbability)
    }

    fn predict_proba(&self, features: &FeatureVector) -> Result<Vec<f64>, InferenceError> {
        Ok(softmax(&self.decision_function(features)))
    }

    fn model_type(&self) -> &'static str {
        "logistic_regression"
    }
}
