//! CART regression tree with a squared-error split criterion.
//!
//! Shared building block of the random forest and gradient boosting models.
//! The node type is also produced by the second-order booster.

use common::{ForecastError, Regressor, Result};
use tracing::debug;

use crate::{not_fitted, validate_rows, validate_training};

/// Node variance at or below this is treated as pure.
const PURE_NODE_VARIANCE: f64 = 1e-12;

// ---------------------------------------------------------------------------
// Tree structure
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum TreeNode {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
    },
}

impl TreeNode {
    /// Rows with `row[feature] <= threshold` go left.
    pub(crate) fn predict_row(&self, row: &[f64]) -> f64 {
        let mut node = self;
        loop {
            match node {
                TreeNode::Leaf { value } => return *value,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    node = if row[*feature] <= *threshold {
                        left
                    } else {
                        right
                    };
                }
            }
        }
    }

    pub(crate) fn depth(&self) -> usize {
        match self {
            TreeNode::Leaf { .. } => 0,
            TreeNode::Split { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }

    pub(crate) fn leaf_count(&self) -> usize {
        match self {
            TreeNode::Leaf { .. } => 1,
            TreeNode::Split { left, right, .. } => left.leaf_count() + right.leaf_count(),
        }
    }
}

/// Sample indices sorted ascending by one feature.
pub(crate) fn sorted_by_feature(x: &[Vec<f64>], indices: &[usize], feature: usize) -> Vec<usize> {
    let mut sorted = indices.to_vec();
    sorted.sort_by(|&a, &b| x[a][feature].total_cmp(&x[b][feature]));
    sorted
}

/// Threshold halfway between two consecutive distinct values.
///
/// Falls back to `lo` when the midpoint rounds up to `hi`, so `hi` always
/// goes right.
pub(crate) fn midpoint(lo: f64, hi: f64) -> f64 {
    let mid = lo / 2.0 + hi / 2.0;
    if mid >= hi || !mid.is_finite() {
        lo
    } else {
        mid
    }
}

// ---------------------------------------------------------------------------
// Regressor
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct RegressionTree {
    max_depth: Option<usize>,
    min_samples_split: usize,
    min_samples_leaf: usize,
    root: Option<TreeNode>,
    n_features: usize,
}

impl RegressionTree {
    pub fn new() -> Self {
        Self {
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            root: None,
            n_features: 0,
        }
    }

    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_min_samples_leaf(mut self, min_samples_leaf: usize) -> Self {
        self.min_samples_leaf = min_samples_leaf.max(1);
        self
    }

    /// Fit on the rows named by `indices`. Repeated indices count repeatedly,
    /// which is how bootstrap samples are expressed.
    pub fn fit_indices(&mut self, x: &[Vec<f64>], y: &[f64], indices: &[usize]) -> Result<()> {
        self.n_features = validate_training("RegressionTree", x, y)?;
        if indices.is_empty() || indices.iter().any(|&i| i >= x.len()) {
            return Err(ForecastError::model_fitting(
                "RegressionTree",
                "sample indices out of range",
            ));
        }
        let root = self.build(x, y, indices, 0);
        debug!(
            samples = indices.len(),
            depth = root.depth(),
            leaves = root.leaf_count(),
            "Regression tree fitted"
        );
        self.root = Some(root);
        Ok(())
    }

    pub fn depth(&self) -> Option<usize> {
        self.root.as_ref().map(TreeNode::depth)
    }

    pub fn leaf_count(&self) -> Option<usize> {
        self.root.as_ref().map(TreeNode::leaf_count)
    }

    pub(crate) fn predict_row(&self, row: &[f64]) -> Option<f64> {
        self.root.as_ref().map(|r| r.predict_row(row))
    }

    fn build(&self, x: &[Vec<f64>], y: &[f64], indices: &[usize], depth: usize) -> TreeNode {
        let n = indices.len() as f64;
        let sum: f64 = indices.iter().map(|&i| y[i]).sum();
        let mean = sum / n;
        let variance = indices.iter().map(|&i| (y[i] - mean).powi(2)).sum::<f64>() / n;

        let leaf = TreeNode::Leaf { value: mean };
        if indices.len() < self.min_samples_split
            || indices.len() < 2 * self.min_samples_leaf
            || self.max_depth.is_some_and(|d| depth >= d)
            || variance <= PURE_NODE_VARIANCE
        {
            return leaf;
        }

        let Some((feature, threshold)) = self.best_split(x, y, indices) else {
            return leaf;
        };

        let (left, right): (Vec<usize>, Vec<usize>) = indices
            .iter()
            .copied()
            .partition(|&i| x[i][feature] <= threshold);

        TreeNode::Split {
            feature,
            threshold,
            left: Box::new(self.build(x, y, &left, depth + 1)),
            right: Box::new(self.build(x, y, &right, depth + 1)),
        }
    }

    /// Split minimizing the summed squared error of both children.
    fn best_split(&self, x: &[Vec<f64>], y: &[f64], indices: &[usize]) -> Option<(usize, f64)> {
        let n = indices.len();
        let mut best: Option<(usize, f64, f64)> = None;

        for feature in 0..self.n_features {
            let sorted = sorted_by_feature(x, indices, feature);
            let total_sum: f64 = sorted.iter().map(|&i| y[i]).sum();
            let total_sq: f64 = sorted.iter().map(|&i| y[i] * y[i]).sum();

            let mut left_sum = 0.0;
            let mut left_sq = 0.0;
            for pos in 0..n - 1 {
                let yi = y[sorted[pos]];
                left_sum += yi;
                left_sq += yi * yi;

                let lo = x[sorted[pos]][feature];
                let hi = x[sorted[pos + 1]][feature];
                if lo == hi {
                    continue;
                }

                let n_left = pos + 1;
                let n_right = n - n_left;
                if n_left < self.min_samples_leaf || n_right < self.min_samples_leaf {
                    continue;
                }

                let sse_left = (left_sq - left_sum * left_sum / n_left as f64).max(0.0);
                let right_sum = total_sum - left_sum;
                let sse_right =
                    (total_sq - left_sq - right_sum * right_sum / n_right as f64).max(0.0);
                let sse = sse_left + sse_right;

                if best.map_or(true, |(_, _, b)| sse < b) {
                    best = Some((feature, midpoint(lo, hi), sse));
                }
            }
        }

        best.map(|(feature, threshold, _)| (feature, threshold))
    }
}

impl Default for RegressionTree {
    fn default() -> Self {
        Self::new()
    }
}

impl Regressor for RegressionTree {
    fn name(&self) -> &str {
        "RegressionTree"
    }

    fn fit(&mut self, x: &[Vec<f64>], y: &[f64]) -> Result<()> {
        let indices: Vec<usize> = (0..x.len()).collect();
        self.fit_indices(x, y, &indices)
    }

    fn predict(&self, x: &[Vec<f64>]) -> Result<Vec<f64>> {
        let root = self.root.as_ref().ok_or_else(|| not_fitted(self.name()))?;
        validate_rows(self.name(), x, self.n_features)?;
        Ok(x.iter().map(|row| root.predict_row(row)).collect())
    }
}
