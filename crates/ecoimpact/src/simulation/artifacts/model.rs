use serde::{Deserialize, Serialize};

/// Point estimate from an encoded feature vector.
pub trait Regressor: Send + Sync {
    fn predict(&self, features: &[f64]) -> f64;
}

/// Two-class probabilities `[P(class 0), P(class 1)]`.
pub trait Classifier: Send + Sync {
    fn predict_probabilities(&self, features: &[f64]) -> [f64; 2];
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ModelError {
    #[error("invalid ensemble JSON: {0}")]
    Json(String),
    #[error("ensemble declares zero features")]
    NoFeatures,
    #[error("ensemble has no trees")]
    NoTrees,
    #[error("tree {tree} has no nodes")]
    EmptyTree { tree: usize },
    #[error("tree {tree} node {node} splits on feature {feature} but the model has {n_features}")]
    FeatureOutOfRange {
        tree: usize,
        node: usize,
        feature: usize,
        n_features: usize,
    },
    #[error("tree {tree} node {node} points at child {child}, which is not a later node")]
    InvalidChild {
        tree: usize,
        node: usize,
        child: usize,
    },
    #[error("ensemble contains a non-finite parameter")]
    NonFiniteParameter,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TreeNode {
    /// `x[feature] <= threshold` goes left; anything else, NaN included, goes right.
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: f64,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tree {
    pub nodes: Vec<TreeNode>,
}

impl Tree {
    fn evaluate(&self, features: &[f64]) -> f64 {
        let mut index = 0;
        loop {
            match self.nodes.get(index) {
                Some(TreeNode::Leaf { value }) => return *value,
                Some(TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                }) => {
                    let x = features.get(*feature).copied().unwrap_or(f64::NAN);
                    index = if x <= *threshold { *left } else { *right };
                }
                None => return 0.0,
            }
        }
    }
}

fn default_learning_rate() -> f64 {
    1.0
}

/// Gradient-boosted trees: `base_score + learning_rate * sum(leaf values)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeEnsemble {
    pub n_features: usize,
    #[serde(default)]
    pub base_score: f64,
    #[serde(default = "default_learning_rate")]
    pub learning_rate: f64,
    pub trees: Vec<Tree>,
}

impl TreeEnsemble {
    pub fn from_json(bytes: &[u8]) -> Result<Self, ModelError> {
        let ensemble: Self = serde_json::from_slice(bytes)
            .map_err(|err| ModelError::Json(err.to_string()))?;
        ensemble.validate()?;
        Ok(ensemble)
    }

    /// Children must point forward, so every walk ends at a leaf.
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.n_features == 0 {
            return Err(ModelError::NoFeatures);
        }
        if self.trees.is_empty() {
            return Err(ModelError::NoTrees);
        }
        if !self.base_score.is_finite() || !self.learning_rate.is_finite() {
            return Err(ModelError::NonFiniteParameter);
        }

        for (tree_index, tree) in self.trees.iter().enumerate() {
            if tree.nodes.is_empty() {
                return Err(ModelError::EmptyTree { tree: tree_index });
            }
            for (node_index, node) in tree.nodes.iter().enumerate() {
                match node {
                    TreeNode::Leaf { value } if !value.is_finite() => {
                        return Err(ModelError::NonFiniteParameter);
                    }
                    TreeNode::Leaf { .. } => {}
                    TreeNode::Split {
                        feature,
                        threshold,
                        left,
                        right,
                    } => {
                        if *feature >= self.n_features {
                            return Err(ModelError::FeatureOutOfRange {
                                tree: tree_index,
                                node: node_index,
                                feature: *feature,
                                n_features: self.n_features,
                            });
                        }
                        if threshold.is_nan() {
                            return Err(ModelError::NonFiniteParameter);
                        }
                        for child in [*left, *right] {
                            if child <= node_index || child >= tree.nodes.len() {
                                return Err(ModelError::InvalidChild {
                                    tree: tree_index,
                                    node: node_index,
                                    child,
                                });
                            }
                        }
                    }
                }
            }
        }
        Ok(())
    }

    pub fn raw_score(&self, features: &[f64]) -> f64 {
        let sum: f64 = self.trees.iter().map(|tree| tree.evaluate(features)).sum();
        self.base_score + self.learning_rate * sum
    }
}

impl Regressor for TreeEnsemble {
    fn predict(&self, features: &[f64]) -> f64 {
        self.raw_score(features)
    }
}

impl Classifier for TreeEnsemble {
    fn predict_probabilities(&self, features: &[f64]) -> [f64; 2] {
        let positive = 1.0 / (1.0 + (-self.raw_score(features)).exp());
        [1.0 - positive, positive]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stump() -> TreeEnsemble {
        TreeEnsemble::from_json(
            br#"{
                "n_features": 2,
                "base_score": 10.0,
                "learning_rate": 0.5,
                "trees": [
                    {"nodes": [
                        {"kind": "split", "feature": 1, "threshold": 5.0, "left": 1, "right": 2},
                        {"kind": "leaf", "value": 2.0},
                        {"kind": "leaf", "value": 8.0}
                    ]},
                    {"nodes": [{"kind": "leaf", "value": 4.0}]}
                ]
            }"#,
        )
        .expect("valid ensemble")
    }

    #[test]
    fn regression_sums_scaled_leaves() {
        let model = stump();
        assert_eq!(model.predict(&[0.0, 5.0]), 13.0);
        assert_eq!(model.predict(&[0.0, 6.0]), 16.0);
        assert_eq!(model.predict(&[0.0, f64::NAN]), 16.0);
    }

    #[test]
    fn classifier_probabilities_sum_to_one() {
        let model = TreeEnsemble {
            n_features: 1,
            base_score: 0.0,
            learning_rate: 1.0,
            trees: vec![Tree {
                nodes: vec![TreeNode::Leaf { value: 0.0 }],
            }],
        };
        assert_eq!(model.predict_probabilities(&[1.0]), [0.5, 0.5]);

        let [abolished, implemented] = stump().predict_probabilities(&[0.0, 0.0]);
        assert!(implemented > 0.99);
        assert!((abolished + implemented - 1.0).abs() < 1e-12);
    }

    #[test]
    fn rejects_backward_children_and_unknown_features() {
        let cyclic = r#"{"n_features": 1, "trees": [{"nodes": [
            {"kind": "split", "feature": 0, "threshold": 1.0, "left": 0, "right": 1},
            {"kind": "leaf", "value": 1.0}
        ]}]}"#;
        assert!(matches!(
            TreeEnsemble::from_json(cyclic.as_bytes()),
            Err(ModelError::InvalidChild { child: 0, .. })
        ));

        let wide = r#"{"n_features": 1, "trees": [{"nodes": [
            {"kind": "split", "feature": 3, "threshold": 1.0, "left": 1, "right": 2},
            {"kind": "leaf", "value": 1.0},
            {"kind": "leaf", "value": 2.0}
        ]}]}"#;
        assert!(matches!(
            TreeEnsemble::from_json(wide.as_bytes()),
            Err(ModelError::FeatureOutOfRange { feature: 3, .. })
        ));

        assert!(matches!(
            TreeEnsemble::from_json(b"{not json"),
            Err(ModelError::Json(_))
        ));
    }
}
