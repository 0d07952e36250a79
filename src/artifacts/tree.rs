//! Tree-ensemble regressors (random forest and gradient boosting).
//!
//! Both are exported as flat node arrays per tree. A forest averages its
//! trees; a boosted model sums them, scales by the learning rate and adds
//! the base score.

use super::Estimator;
use crate::error::{ForecastError, Result};
use ndarray::{Array2, ArrayView1};
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum TreeNode {
    /// Go left when `x[feature] <= threshold`
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

#[derive(Debug, Clone, Deserialize)]
pub struct DecisionTree {
    nodes: Vec<TreeNode>,
}

impl DecisionTree {
    pub fn new(nodes: Vec<TreeNode>) -> Self {
        Self { nodes }
    }

    /// Children must come after their parent so every walk terminates
    fn validate(&self, n_features: usize) -> std::result::Result<(), String> {
        if self.nodes.is_empty() {
            return Err("tree has no nodes".to_string());
        }
        for (index, node) in self.nodes.iter().enumerate() {
            if let TreeNode::Split {
                feature,
                left,
                right,
                ..
            } = *node
            {
                if feature >= n_features {
                    return Err(format!(
                        "node {} splits on feature {} of {}",
                        index, feature, n_features
                    ));
                }
                for child in [left, right] {
                    if child <= index || child >= self.nodes.len() {
                        return Err(format!("node {} has invalid child {}", index, child));
                    }
                }
            }
        }
        Ok(())
    }

    fn predict_row(&self, row: ArrayView1<f64>) -> f64 {
        let mut index = 0;
        loop {
            match self.nodes[index] {
                TreeNode::Leaf { value } => return value,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    index = if row[feature] <= threshold { left } else { right };
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Aggregation {
    Mean,
    Sum,
}

fn default_learning_rate() -> f64 {
    1.0
}

#[derive(Debug, Deserialize)]
struct TreeEnsembleSpec {
    n_features: usize,
    aggregation: Aggregation,
    #[serde(default)]
    base_score: f64,
    #[serde(default = "default_learning_rate")]
    learning_rate: f64,
    trees: Vec<DecisionTree>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "TreeEnsembleSpec")]
pub struct TreeEnsemble {
    n_features: usize,
    aggregation: Aggregation,
    base_score: f64,
    learning_rate: f64,
    trees: Vec<DecisionTree>,
}

impl TryFrom<TreeEnsembleSpec> for TreeEnsemble {
    type Error = String;

    fn try_from(spec: TreeEnsembleSpec) -> std::result::Result<Self, Self::Error> {
        if spec.trees.is_empty() {
            return Err("ensemble has no trees".to_string());
        }
        for (index, tree) in spec.trees.iter().enumerate() {
            tree.validate(spec.n_features)
                .map_err(|reason| format!("tree {}: {}", index, reason))?;
        }

        Ok(Self {
            n_features: spec.n_features,
            aggregation: spec.aggregation,
            base_score: spec.base_score,
            learning_rate: spec.learning_rate,
            trees: spec.trees,
        })
    }
}

impl TreeEnsemble {
    pub fn new(
        n_features: usize,
        aggregation: Aggregation,
        base_score: f64,
        learning_rate: f64,
        trees: Vec<DecisionTree>,
    ) -> Result<Self> {
        Self::try_from(TreeEnsembleSpec {
            n_features,
            aggregation,
            base_score,
            learning_rate,
            trees,
        })
        .map_err(|reason| ForecastError::artifact_shape("tree ensemble", reason))
    }

    fn predict_row(&self, row: ArrayView1<f64>) -> f64 {
        let total: f64 = self.trees.iter().map(|tree| tree.predict_row(row)).sum();
        match self.aggregation {
            Aggregation::Mean => total / self.trees.len() as f64,
            Aggregation::Sum => self.base_score + self.learning_rate * total,
        }
    }
}

impl Estimator for TreeEnsemble {
    fn n_features(&self) -> usize {
        self.n_features
    }

    fn predict(&self, features: &Array2<f64>) -> Result<Vec<f64>> {
        if features.ncols() != self.n_features {
            return Err(ForecastError::artifact_shape(
                "tree ensemble",
                format!(
                    "expected {} features, got {}",
                    self.n_features,
                    features.ncols()
                ),
            ));
        }
        Ok(features.rows().into_iter().map(|row| self.predict_row(row)).collect())
    }
}
