//! Portable classifier formats
//!
//! Two JSON model shapes are understood:
//! - `logistic`: intercept plus one coefficient per feature
//! - `tree_ensemble`: gradient-boosted regression trees with a logistic link,
//!   the layout XGBoost's `binary:logistic` objective produces
//!
//! Both map a single row to a class-1 probability.

use crate::errors::{RiskError, Result};
use crate::scoring::Scorer;
use serde::{Deserialize, Serialize};

/// Model artifact as stored on disk
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelArtifact {
    Logistic(LogisticModel),
    TreeEnsemble(TreeEnsemble),
}

impl ModelArtifact {
    /// Structural checks that do not depend on the feature schema
    pub fn validate(&self) -> std::result::Result<(), String> {
        match self {
            ModelArtifact::Logistic(model) => model.validate(),
            ModelArtifact::TreeEnsemble(model) => model.validate(),
        }
    }

    pub fn into_scorer(self) -> Box<dyn Scorer> {
        match self {
            ModelArtifact::Logistic(model) => Box::new(model),
            ModelArtifact::TreeEnsemble(model) => Box::new(model),
        }
    }

    pub fn feature_names(&self) -> &[String] {
        match self {
            ModelArtifact::Logistic(model) => &model.feature_names,
            ModelArtifact::TreeEnsemble(model) => &model.feature_names,
        }
    }
}

/// Logistic regression: `sigmoid(intercept + coefficients · row)`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticModel {
    pub feature_names: Vec<String>,
    pub intercept: f64,
    pub coefficients: Vec<f64>,
}

impl LogisticModel {
    fn validate(&self) -> std::result::Result<(), String> {
        if self.coefficients.len() != self.feature_names.len() {
            return Err(format!(
                "{} coefficients for {} features",
                self.coefficients.len(),
                self.feature_names.len()
            ));
        }
        if !self.intercept.is_finite() || self.coefficients.iter().any(|c| !c.is_finite()) {
            return Err("non-finite coefficient".to_string());
        }
        Ok(())
    }
}

impl Scorer for LogisticModel {
    fn predict_proba(&self, row: &[f64]) -> Result<f64> {
        check_width(row, self.coefficients.len())?;
        let margin = self.intercept
            + self
                .coefficients
                .iter()
                .zip(row)
                .map(|(c, x)| c * x)
                .sum::<f64>();
        checked_probability(sigmoid(margin))
    }

    fn feature_names(&self) -> &[String] {
        &self.feature_names
    }
}

/// Node of a regression tree
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TreeNode {
    /// `row[feature] < threshold` goes left, otherwise right
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf { leaf: f64 },
}

/// Flat node list; node 0 is the root
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tree {
    pub nodes: Vec<TreeNode>,
}

impl Tree {
    fn validate(&self, width: usize) -> std::result::Result<(), String> {
        if self.nodes.is_empty() {
            return Err("tree has no nodes".to_string());
        }
        for (idx, node) in self.nodes.iter().enumerate() {
            match node {
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    if *feature >= width {
                        return Err(format!("node {} splits on feature {}", idx, feature));
                    }
                    if !threshold.is_finite() {
                        return Err(format!("node {} has a non-finite threshold", idx));
                    }
                    // Children must point forward, which rules out cycles.
                    for child in [*left, *right] {
                        if child <= idx || child >= self.nodes.len() {
                            return Err(format!("node {} has invalid child {}", idx, child));
                        }
                    }
                }
                TreeNode::Leaf { leaf } => {
                    if !leaf.is_finite() {
                        return Err(format!("node {} has a non-finite leaf", idx));
                    }
                }
            }
        }
        Ok(())
    }

    fn leaf_value(&self, row: &[f64]) -> Result<f64> {
        let mut idx = 0;
        loop {
            match self.nodes.get(idx) {
                Some(TreeNode::Leaf { leaf }) => return Ok(*leaf),
                Some(TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                }) => {
                    let value = row.get(*feature).ok_or_else(|| {
                        RiskError::Scoring(format!("row has no feature {}", feature))
                    })?;
                    idx = if value < threshold { *left } else { *right };
                }
                None => {
                    return Err(RiskError::Scoring(format!("tree node {} missing", idx)));
                }
            }
        }
    }
}

/// Boosted trees with a logistic link: `sigmoid(base_score + Σ leaf)`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeEnsemble {
    pub feature_names: Vec<String>,
    /// Margin added before the link, 0.0 for a 0.5 prior
    #[serde(default)]
    pub base_score: f64,
    pub trees: Vec<Tree>,
}

impl TreeEnsemble {
    fn validate(&self) -> std::result::Result<(), String> {
        if self.trees.is_empty() {
            return Err("ensemble has no trees".to_string());
        }
        if !self.base_score.is_finite() {
            return Err("non-finite base_score".to_string());
        }
        let width = self.feature_names.len();
        for (i, tree) in self.trees.iter().enumerate() {
            tree.validate(width).map_err(|e| format!("tree {}: {}", i, e))?;
        }
        Ok(())
    }
}

impl Scorer for TreeEnsemble {
    fn predict_proba(&self, row: &[f64]) -> Result<f64> {
        check_width(row, self.feature_names.len())?;
        let mut margin = self.base_score;
        for tree in &self.trees {
            margin += tree.leaf_value(row)?;
        }
        checked_probability(sigmoid(margin))
    }

    fn feature_names(&self) -> &[String] {
        &self.feature_names
    }
}

pub fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

fn check_width(row: &[f64], expected: usize) -> Result<()> {
    if row.len() != expected {
        return Err(RiskError::Scoring(format!(
            "expected {} features, got {}",
            expected,
            row.len()
        )));
    }
    if row.iter().any(|x| !x.is_finite()) {
        return Err(RiskError::Scoring("row contains a non-finite value".to_string()));
    }
    Ok(())
}

/// Probabilities outside [0, 1] mean the scorer is broken
pub fn checked_probability(p: f64) -> Result<f64> {
    if p.is_finite() && (0.0..=1.0).contains(&p) {
        Ok(p)
    } else {
        Err(RiskError::Scoring(format!("probability {} outside [0, 1]", p)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names() -> Vec<String> {
        crate::types::FEATURE_NAMES.iter().map(|s| s.to_string()).collect()
    }

    fn stump_ensemble() -> TreeEnsemble {
        TreeEnsemble {
            feature_names: names(),
            base_score: 0.0,
            trees: vec![Tree {
                nodes: vec![
                    TreeNode::Split {
                        feature: 1,
                        threshold: 65.0,
                        left: 1,
                        right: 2,
                    },
                    TreeNode::Leaf { leaf: -1.0 },
                    TreeNode::Leaf { leaf: 1.0 },
                ],
            }],
        }
    }

    #[test]
    fn test_logistic_zero_margin() {
        let model = LogisticModel {
            feature_names: names(),
            intercept: 0.0,
            coefficients: vec![0.0; 4],
        };
        let p = model.predict_proba(&[1.0, 60.0, 3.0, 8.0]).unwrap();
        assert!((p - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_logistic_width_mismatch() {
        let model = LogisticModel {
            feature_names: names(),
            intercept: 0.0,
            coefficients: vec![0.1; 4],
        };
        let err = model.predict_proba(&[1.0, 2.0]).unwrap_err();
        assert!(matches!(err, RiskError::Scoring(_)));
    }

    #[test]
    fn test_tree_split_direction() {
        let ensemble = stump_ensemble();
        let young = ensemble.predict_proba(&[0.0, 40.0, 1.0, 5.0]).unwrap();
        let old = ensemble.predict_proba(&[0.0, 70.0, 1.0, 5.0]).unwrap();
        // Equal to the threshold goes right
        let edge = ensemble.predict_proba(&[0.0, 65.0, 1.0, 5.0]).unwrap();

        assert!((young - sigmoid(-1.0)).abs() < 1e-12);
        assert!((old - sigmoid(1.0)).abs() < 1e-12);
        assert_eq!(edge, old);
    }

    #[test]
    fn test_tree_rejects_backward_child() {
        let mut ensemble = stump_ensemble();
        ensemble.trees[0].nodes[0] = TreeNode::Split {
            feature: 1,
            threshold: 65.0,
            left: 0,
            right: 2,
        };
        assert!(ensemble.validate().is_err());
    }

    #[test]
    fn test_tree_rejects_unknown_feature() {
        let mut ensemble = stump_ensemble();
        ensemble.trees[0].nodes[0] = TreeNode::Split {
            feature: 7,
            threshold: 1.0,
            left: 1,
            right: 2,
        };
        assert!(ensemble.validate().is_err());
    }

    #[test]
    fn test_artifact_deserialization() {
        let json = r#"{
            "kind": "tree_ensemble",
            "feature_names": ["gender", "admission_age", "los_icu", "wbc"],
            "base_score": 0.2,
            "trees": [{"nodes": [
                {"feature": 3, "threshold": 12.0, "left": 1, "right": 2},
                {"leaf": -0.3},
                {"leaf": 0.6}
            ]}]
        }"#;
        let artifact: ModelArtifact = serde_json::from_str(json).unwrap();
        assert!(artifact.validate().is_ok());
        assert_eq!(artifact.feature_names().len(), 4);

        let scorer = artifact.into_scorer();
        let p = scorer.predict_proba(&[1.0, 50.0, 2.0, 15.0]).unwrap();
        assert!((p - sigmoid(0.8)).abs() < 1e-12);
    }

    #[test]
    fn test_checked_probability() {
        assert!(checked_probability(0.0).is_ok());
        assert!(checked_probability(1.0).is_ok());
        assert!(checked_probability(1.01).is_err());
        assert!(checked_probability(f64::NAN).is_err());
    }
}
