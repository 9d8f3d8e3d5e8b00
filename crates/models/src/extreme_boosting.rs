//! Second-order gradient boosting with regularized trees.
//!
//! For squared error the gradient of each sample is `prediction - target`
//! and the hessian is 1. Trees are grown by exact greedy search over the
//! regularized gain, and leaf weights are `-G / (H + lambda)` shrunk by `eta`.

use common::{ExtremeBoostingParams, Regressor, Result};
use tracing::debug;

use crate::tree::{midpoint, sorted_by_feature, TreeNode};
use crate::{not_fitted, validate_rows, validate_training};

/// Splits whose loss reduction does not exceed this are discarded.
const MIN_SPLIT_GAIN: f64 = 1e-6;

#[derive(Debug, Clone)]
pub struct ExtremeGradientBoosting {
    params: ExtremeBoostingParams,
    base_score: f64,
    trees: Vec<TreeNode>,
    n_features: usize,
}

impl ExtremeGradientBoosting {
    pub fn new(params: ExtremeBoostingParams) -> Self {
        Self {
            params,
            base_score: 0.0,
            trees: Vec::new(),
            n_features: 0,
        }
    }

    fn raw_predict(&self, row: &[f64]) -> f64 {
        self.base_score + self.trees.iter().map(|t| t.predict_row(row)).sum::<f64>()
    }

    fn leaf_weight(&self, grad_sum: f64, hess_sum: f64) -> f64 {
        -grad_sum / (hess_sum + self.params.lambda) * self.params.eta
    }

    fn score(&self, grad_sum: f64, hess_sum: f64) -> f64 {
        grad_sum * grad_sum / (hess_sum + self.params.lambda)
    }

    fn build(&self, x: &[Vec<f64>], grad: &[f64], indices: &[usize], depth: usize) -> TreeNode {
        let grad_sum: f64 = indices.iter().map(|&i| grad[i]).sum();
        let hess_sum = indices.len() as f64;
        let leaf = TreeNode::Leaf {
            value: self.leaf_weight(grad_sum, hess_sum),
        };

        if depth >= self.params.max_depth {
            return leaf;
        }
        let Some((feature, threshold)) = self.best_split(x, grad, indices, grad_sum, hess_sum)
        else {
            return leaf;
        };

        let (left, right): (Vec<usize>, Vec<usize>) = indices
            .iter()
            .copied()
            .partition(|&i| x[i][feature] <= threshold);

        TreeNode::Split {
            feature,
            threshold,
            left: Box::new(self.build(x, grad, &left, depth + 1)),
            right: Box::new(self.build(x, grad, &right, depth + 1)),
        }
    }

    fn best_split(
        &self,
        x: &[Vec<f64>],
        grad: &[f64],
        indices: &[usize],
        grad_sum: f64,
        hess_sum: f64,
    ) -> Option<(usize, f64)> {
        let parent_score = self.score(grad_sum, hess_sum);
        let mut best: Option<(usize, f64, f64)> = None;

        for feature in 0..self.n_features {
            let sorted = sorted_by_feature(x, indices, feature);
            let mut g_left = 0.0;
            let mut h_left = 0.0;

            for pos in 0..sorted.len().saturating_sub(1) {
                g_left += grad[sorted[pos]];
                h_left += 1.0;

                let lo = x[sorted[pos]][feature];
                let hi = x[sorted[pos + 1]][feature];
                if lo == hi {
                    continue;
                }

                let h_right = hess_sum - h_left;
                if h_left < self.params.min_child_weight || h_right < self.params.min_child_weight
                {
                    continue;
                }

                let g_right = grad_sum - g_left;
                let gain = 0.5
                    * (self.score(g_left, h_left) + self.score(g_right, h_right) - parent_score)
                    - self.params.gamma;

                if gain > MIN_SPLIT_GAIN && best.map_or(true, |(_, _, b)| gain > b) {
                    best = Some((feature, midpoint(lo, hi), gain));
                }
            }
        }

        best.map(|(feature, threshold, _)| (feature, threshold))
    }
}

impl Regressor for ExtremeGradientBoosting {
    fn name(&self) -> &str {
        "XGB"
    }

    fn fit(&mut self, x: &[Vec<f64>], y: &[f64]) -> Result<()> {
        self.n_features = validate_training(self.name(), x, y)?;
        self.base_score = y.iter().sum::<f64>() / y.len() as f64;
        self.trees.clear();

        let indices: Vec<usize> = (0..x.len()).collect();
        let mut predictions = vec![self.base_score; y.len()];
        let mut trees = Vec::with_capacity(self.params.n_estimators);

        for _ in 0..self.params.n_estimators {
            let grad: Vec<f64> = predictions.iter().zip(y).map(|(p, t)| p - t).collect();
            let tree = self.build(x, &grad, &indices, 0);
            for (pred, row) in predictions.iter_mut().zip(x) {
                *pred += tree.predict_row(row);
            }
            trees.push(tree);
        }

        debug!(
            rounds = trees.len(),
            base_score = self.base_score,
            max_depth = trees.iter().map(TreeNode::depth).max().unwrap_or(0),
            "Extreme gradient boosting fitted"
        );
        self.trees = trees;
        Ok(())
    }

    fn predict(&self, x: &[Vec<f64>]) -> Result<Vec<f64>> {
        if self.n_features == 0 {
            return Err(not_fitted(self.name()));
        }
        validate_rows(self.name(), x, self.n_features)?;
        Ok(x.iter().map(|row| self.raw_predict(row)).collect())
    }
}
