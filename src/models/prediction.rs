//! Prediction request / result models

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ============================================================================
// REQUEST
// ============================================================================

/// Raw field -> value mapping supplied by a caller
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct PredictionRequest(Map<String, Value>);

impl PredictionRequest {
    /// Build from an arbitrary JSON body; only objects are accepted
    pub fn from_json(body: Value) -> Option<Self> {
        match body {
            Value::Object(fields) => Some(Self(fields)),
            _ => None,
        }
    }

    pub fn raw(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Field value as f64, `None` when absent or not coercible
    pub fn number(&self, field: &str) -> Option<f64> {
        self.0.get(field).and_then(coerce_f64)
    }
}

#[cfg(test)]
impl PredictionRequest {
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(field.into(), value.into());
    }

    pub fn remove(&mut self, field: &str) -> Option<Value> {
        self.0.remove(field)
    }
}

/// Numeric coercion of a JSON value.
///
/// Numbers pass through, strings are trimmed and parsed (`"inf"`, `"nan"`
/// included), booleans map to 1.0 / 0.0. `null`, arrays and objects fail.
pub fn coerce_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

// ============================================================================
// OUTCOME
// ============================================================================

/// Predicted student outcome, indexed the way the model emits classes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Dropout,
    Enrolled,
    Graduate,
}

impl Outcome {
    pub const ALL: [Outcome; 3] = [Outcome::Dropout, Outcome::Enrolled, Outcome::Graduate];

    /// Number of classes the model must produce
    pub const COUNT: usize = 3;

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn index(&self) -> usize {
        match self {
            Outcome::Dropout => 0,
            Outcome::Enrolled => 1,
            Outcome::Graduate => 2,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Dropout => "Dropout",
            Outcome::Enrolled => "Enrolled",
            Outcome::Graduate => "Graduate",
        }
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

// ============================================================================
// RISK FACTORS
// ============================================================================

/// Whether a factor counts for or against the student
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Polarity {
    Positive,
    Negative,
    Neutral,
}

/// Heuristic, human-readable explanation entry
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskFactor {
    pub text: String,
    pub polarity: Polarity,
}

impl RiskFactor {
    pub fn positive(text: impl Into<String>) -> Self {
        Self { text: text.into(), polarity: Polarity::Positive }
    }

    pub fn negative(text: impl Into<String>) -> Self {
        Self { text: text.into(), polarity: Polarity::Negative }
    }

    pub fn neutral(text: impl Into<String>) -> Self {
        Self { text: text.into(), polarity: Polarity::Neutral }
    }
}

// ============================================================================
// RESULT
// ============================================================================

/// Outcome of one pass through the inference pipeline
#[derive(Debug, Clone)]
pub struct PredictionResult {
    pub outcome: Outcome,
    /// Probability of the predicted class (0.0 - 1.0)
    pub confidence: f64,
    /// One entry per class, aligned to `Outcome::index`
    pub probabilities: Vec<f64>,
    pub risk_factors: Vec<RiskFactor>,
}

/// `/predict` response body, risk factors as plain text
#[derive(Debug, Serialize)]
pub struct PredictResponse {
    pub prediction: usize,
    pub prediction_label: &'static str,
    pub confidence: f64,
    pub probabilities: Vec<f64>,
    pub risk_factors: Vec<String>,
}

impl From<PredictionResult> for PredictResponse {
    fn from(result: PredictionResult) -> Self {
        Self {
            prediction: result.outcome.index(),
            prediction_label: result.outcome.label(),
            confidence: result.confidence,
            probabilities: result.probabilities,
            risk_factors: result.risk_factors.into_iter().map(|f| f.text).collect(),
        }
    }
}

/// `/v2/predict` response body, risk factors tagged with polarity
#[derive(Debug, Serialize)]
pub struct PredictResponseV2 {
    pub prediction: usize,
    pub prediction_label: &'static str,
    pub confidence: f64,
    pub probabilities: Vec<f64>,
    pub risk_factors: Vec<RiskFactor>,
}

impl From<PredictionResult> for PredictResponseV2 {
    fn from(result: PredictionResult) -> Self {
        Self {
            prediction: result.outcome.index(),
            prediction_label: result.outcome.label(),
            confidence: result.confidence,
            probabilities: result.probabilities,
            risk_factors: result.risk_factors,
        }
    }
}
