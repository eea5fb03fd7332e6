//! Request validation and vectorization

use thiserror::Error;

use crate::models::{coerce_f64, FeatureVector, PredictionRequest, FEATURE_COUNT, FEATURE_NAMES};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VectorizeError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Invalid value for field {0}: expected a number")]
    InvalidValue(&'static str),
}

/// Build the model input in schema order.
///
/// Fields are checked one by one in schema order and the first missing or
/// non-numeric one is reported. Values are passed through unchanged: no
/// bounds checks, scaling or imputation.
pub fn vectorize(request: &PredictionRequest) -> Result<FeatureVector, VectorizeError> {
    let mut values = [0.0f64; FEATURE_COUNT];

    for (slot, name) in values.iter_mut().zip(FEATURE_NAMES) {
        let raw = request.raw(name).ok_or(VectorizeError::MissingField(name))?;
        *slot = coerce_f64(raw).ok_or(VectorizeError::InvalidValue(name))?;
    }

    Ok(FeatureVector::new(values))
}
