//! Serialized model loading
//!
//! The model file is a JSON export of the trained estimator, tagged by
//! `model_type`. Loading validates the declared feature layout against the
//! schema and the estimator structure, so a bad file fails at startup and
//! never at request time.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Deserialize;
use thiserror::Error;

use super::{Classifier, LoadedModel, LogisticRegression, RandomForest};
use crate::models::{schema, Outcome};

#[derive(Debug, Error)]
pub enum ModelLoadError {
    #[error("model file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read model file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse model file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid model: {0}")]
    Invalid(String),
}

#[derive(Debug, Deserialize)]
#[serde(tag = "model_type", rename_all = "snake_case")]
pub enum SerializedModel {
    LogisticRegression(LogisticRegression),
    RandomForest(RandomForest),
}

impl SerializedModel {
    /// Validate and turn the document into a shareable classifier
    pub fn into_classifier(self) -> Result<Arc<dyn Classifier>, ModelLoadError> {
        match self {
            SerializedModel::LogisticRegression(model) => {
                check_header(model.feature_names.as_deref(), model.n_classes)?;
                model.validate().map_err(ModelLoadError::Invalid)?;
                Ok(Arc::new(model))
            }
            SerializedModel::RandomForest(model) => {
                check_header(model.feature_names.as_deref(), model.n_classes)?;
                model.validate().map_err(ModelLoadError::Invalid)?;
                Ok(Arc::new(model))
            }
        }
    }
}

fn check_header(feature_names: Option<&[String]>, n_classes: Option<usize>) -> Result<(), ModelLoadError> {
    if let Some(names) = feature_names {
        if let Some(mismatch) = schema::first_mismatch(names) {
            return Err(ModelLoadError::Invalid(format!("feature layout mismatch: {}", mismatch)));
        }
    }
    if let Some(n) = n_classes {
        if n != Outcome::COUNT {
            return Err(ModelLoadError::Invalid(format!(
                "model has {} classes, expected {}",
                n,
                Outcome::COUNT
            )));
        }
    }
    Ok(())
}

/// Parse a model document from a JSON string
pub fn parse_model(json: &str) -> Result<Arc<dyn Classifier>, ModelLoadError> {
    let document: SerializedModel = serde_json::from_str(json)?;
    document.into_classifier()
}

/// Load the model file at `path`
pub fn load_model(path: &Path) -> Result<LoadedModel, ModelLoadError> {
    tracing::info!("Loading model from: {}", path.display());

    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ModelLoadError::NotFound(path.to_path_buf()));
        }
        Err(source) => {
            return Err(ModelLoadError::Io { path: path.to_path_buf(), source });
        }
    };

    let classifier = parse_model(&raw)?;
    let model = LoadedModel::new(classifier, path.display().to_string());

    tracing::info!("Model loaded successfully ({})", model.info().model_type);

    Ok(model)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FeatureVector, FEATURE_COUNT, FEATURE_NAMES};
    use serde_json::json;
    use std::io::Write;

    fn logistic_json() -> serde_json::Value {
        let mut rows = vec![vec![0.0; FEATURE_COUNT]; 3];
        rows[2][25] = 0.5;
        json!({
            "model_type": "logistic_regression",
            "feature_names": FEATURE_NAMES.to_vec(),
            "n_classes": 3,
            "coefficients": rows,
            "intercepts": [0.0, 0.0, 0.0],
        })
    }

    fn forest_json() -> serde_json::Value {
        json!({
            "model_type": "random_forest",
            "trees": [{
                "children_left": [1, -1, -1],
                "children_right": [2, -1, -1],
                "feature": [25, -2, -2],
                "threshold": [10.0, -2.0, -2.0],
                "value": [[3.0, 3.0, 3.0], [5.0, 1.0, 0.0], [0.0, 1.0, 5.0]],
            }],
        })
    }

    #[test]
    fn test_parse_both_model_types() {
        let logistic = parse_model(&logistic_json().to_string()).unwrap();
        assert_eq!(logistic.model_type(), "logistic_regression");

        let forest = parse_model(&forest_json().to_string()).unwrap();
        assert_eq!(forest.model_type(), "random_forest");

        let mut values = [0.0; FEATURE_COUNT];
        values[25] = 16.0;
        let x = FeatureVector::new(values);
        for model in [logistic, forest] {
            let proba = model.predict_proba(&x).unwrap();
            assert_eq!(proba.len(), 3);
            assert!((proba.iter().sum::<f64>() - 1.0).abs() < 1e-9);
            assert_eq!(model.predict(&x).unwrap(), 2);
        }
    }

    #[test]
    fn test_feature_layout_mismatch_rejected() {
        let mut doc = logistic_json();
        let mut names: Vec<&str> = FEATURE_NAMES.to_vec();
        names.swap(3, 4);
        doc["feature_names"] = json!(names);

        let err = parse_model(&doc.to_string()).err().unwrap();
        assert!(matches!(err, ModelLoadError::Invalid(ref m) if m.contains("feature 3")));
    }

    #[test]
    fn test_wrong_class_count_rejected() {
        let mut doc = forest_json();
        doc["n_classes"] = json!(2);
        assert!(matches!(
            parse_model(&doc.to_string()),
            Err(ModelLoadError::Invalid(_))
        ));
    }

    #[test]
    fn test_unknown_model_type_is_parse_error() {
        let doc = json!({"model_type": "svm"});
        assert!(matches!(
            parse_model(&doc.to_string()),
            Err(ModelLoadError::Parse(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", forest_json()).unwrap();

        let model = load_model(file.path()).unwrap();
        assert_eq!(model.info().model_type, "random_forest");
        assert_eq!(model.info().n_features, FEATURE_COUNT);
        assert_eq!(model.info().classes, vec!["Dropout", "Enrolled", "Graduate"]);
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("predictor.json");
        assert!(matches!(load_model(&path), Err(ModelLoadError::NotFound(_))));
    }
}
