//! Inference request pipeline
//!
//! request -> vectorize -> classifier -> annotate -> result

pub mod vectorize;
pub mod annotate;
pub mod predictor;

pub use predictor::{PredictError, Predictor};
