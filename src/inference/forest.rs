//! Random forest over CART trees stored in scikit-learn array layout

use serde::Deserialize;

use super::{argmax, Classifier, InferenceError};
use crate::models::{FeatureVector, Outcome, FEATURE_COUNT};

/// Marker in `children_left` for a leaf node
const LEAF: i64 = -1;

/// One fitted tree. Node `i` is a leaf when `children_left[i] == -1`,
/// otherwise samples with `x[feature[i]] <= threshold[i]` go left.
#[derive(Debug, Clone, Deserialize)]
pub struct DecisionTree {
    pub children_left: Vec<i64>,
    pub children_right: Vec<i64>,
    pub feature: Vec<i64>,
    pub threshold: Vec<f64>,
    /// Class counts (or weights) per node
    pub value: Vec<Vec<f64>>,
}

impl DecisionTree {
    fn node_count(&self) -> usize {
        self.children_left.len()
    }

    pub fn validate(&self) -> Result<(), String> {
        let n = self.node_count();
        if n == 0 {
            return Err("tree has no nodes".to_string());
        }
        if self.children_right.len() != n
            || self.feature.len() != n
            || self.threshold.len() != n
            || self.value.len() != n
        {
            return Err("tree node arrays differ in length".to_string());
        }

        let in_range = |child: i64| child >= 0 && (child as usize) < n;

        for node in 0..n {
            if self.children_left[node] == LEAF {
                let dist = &self.value[node];
                if dist.len() != Outcome::COUNT {
                    return Err(format!(
                        "leaf {} has {} class values, expected {}",
                        node,
                        dist.len(),
                        Outcome::COUNT
                    ));
                }
                if dist.iter().any(|v| *v < 0.0 || !v.is_finite()) {
                    return Err(format!("leaf {} has a negative or non-finite value", node));
                }
                if dist.iter().sum::<f64>() <= 0.0 {
                    return Err(format!("leaf {} has no class mass", node));
                }
                continue;
            }

            if !in_range(self.children_left[node]) || !in_range(self.children_right[node]) {
                return Err(format!("node {} points outside the tree", node));
            }
            let feature = self.feature[node];
            if feature < 0 || feature as usize >= FEATURE_COUNT {
                return Err(format!("node {} splits on unknown feature {}", node, feature));
            }
        }
        Ok(())
    }

    /// Normalized class distribution of the leaf reached by `x`
    pub fn leaf_proba(&self, x: &[f64; FEATURE_COUNT]) -> Result<Vec<f64>, InferenceError> {
        let mut node = 0usize;

        // A well-formed tree reaches a leaf in fewer steps than it has nodes
        for _ in 0..=self.node_count() {
            if self.children_left[node] == LEAF {
                let dist = &self.value[node];
                let total: f64 = dist.iter().sum();
                return Ok(dist.iter().map(|v| v / total).collect());
            }

            let split = self.feature[node] as usize;
            node = if x[split] <= self.threshold[node] {
                self.children_left[node] as usize
            } else {
                self.children_right[node] as usize
            };
        }

        Err(InferenceError::Model("tree traversal did not reach a leaf".to_string()))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RandomForest {
    #[serde(default)]
    pub feature_names: Option<Vec<String>>,
    #[serde(default)]
    pub n_classes: Option<usize>,
    pub trees: Vec<DecisionTree>,
}

impl RandomForest {
    pub fn validate(&self) -> Result<(), String> {
        if self.trees.is_empty() {
            return Err("forest has no trees".to_string());
        }
        for (i, tree) in self.trees.iter().enumerate() {
            tree.validate().map_err(|e| format!("tree {}: {}", i, e))?;
        }
        Ok(())
    }
}

impl Classifier for RandomForest {
    fn predict(&self, features: &FeatureVector) -> Result<usize, InferenceError> {
        let proba = self.predict_proba(features)?;
        argmax(&proba).ok_or(InferenceError::NonFiniteProbability)
    }

    fn predict_proba(&self, features: &FeatureVector) -> Result<Vec<f64>, InferenceError> {
        let x = features.as_array();
        let mut sum = vec![0.0; Outcome::COUNT];

        for tree in &self.trees {
            for (acc, p) in sum.iter_mut().zip(tree.leaf_proba(x)?) {
                *acc += p;
            }
        }

        let n = self.trees.len() as f64;
        Ok(sum.into_iter().map(|s| s / n).collect())
    }

    fn model_type(&self) -> &'static str {
        "random_forest"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Single split on `feature`: low values -> `low`, high values -> `high`
    fn stump(feature: i64, threshold: f64, low: [f64; 3], high: [f64; 3]) -> DecisionTree {
        DecisionTree {
            children_left: vec![1, LEAF, LEAF],
            children_right: vec![2, LEAF, LEAF],
            feature: vec![feature, -2, -2],
            threshold: vec![threshold, -2.0, -2.0],
            value: vec![vec![1.0, 1.0, 1.0], low.to_vec(), high.to_vec()],
        }
    }

    fn forest() -> RandomForest {
        RandomForest {
            feature_names: None,
            n_classes: Some(3),
            trees: vec![
                // 1st semester grade
                stump(25, 10.0, [8.0, 2.0, 0.0], [1.0, 2.0, 7.0]),
                // 2nd semester grade
                stump(31, 10.0, [6.0, 4.0, 0.0], [0.0, 3.0, 7.0]),
            ],
        }
    }

    fn vector_with(grade1: f64, grade2: f64) -> FeatureVector {
        let mut values = [0.0; FEATURE_COUNT];
        values[25] = grade1;
        values[31] = grade2;
        FeatureVector::new(values)
    }

    #[test]
    fn test_forest_averages_leaf_distributions() {
        let model = forest();
        assert!(model.validate().is_ok());

        let proba = model.predict_proba(&vector_with(8.0, 7.0)).unwrap();
        assert!((proba[0] - 0.7).abs() < 1e-9);
        assert!((proba[1] - 0.3).abs() < 1e-9);
        assert!((proba.iter().sum::<f64>() - 1.0).abs() < 1e-9);
        assert_eq!(model.predict(&vector_with(8.0, 7.0)).unwrap(), 0);
        assert_eq!(model.predict(&vector_with(16.0, 16.0)).unwrap(), 2);
    }

    #[test]
    fn test_threshold_goes_left_when_equal() {
        let tree = stump(25, 10.0, [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]);
        let proba = tree.leaf_proba(vector_with(10.0, 0.0).as_array()).unwrap();
        assert_eq!(proba, vec![1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_validate_rejects_broken_trees() {
        let mut tree = stump(25, 10.0, [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]);
        tree.children_right[0] = 7;
        assert!(tree.validate().unwrap_err().contains("outside"));

        let tree = stump(40, 10.0, [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]);
        assert!(tree.validate().unwrap_err().contains("unknown feature"));

        let tree = stump(1, 10.0, [0.0, 0.0, 0.0], [0.0, 0.0, 1.0]);
        assert!(tree.validate().unwrap_err().contains("no class mass"));

        let empty = RandomForest { feature_names: None, n_classes: None, trees: vec![] };
        assert!(empty.validate().is_err());
    }

    #[test]
    fn test_cycle_is_reported_not_looped() {
        let tree = DecisionTree {
            children_left: vec![1, 0],
            children_right: vec![1, 0],
            feature: vec![0, 0],
            threshold: vec![0.0, 0.0],
            value: vec![vec![1.0; 3], vec![1.0; 3]],
        };
        assert!(tree.validate().is_ok());
        assert!(tree.leaf_proba(&[0.0; FEATURE_COUNT]).is_err());
    }
}
