use common::{GradientBoostingParams, Regressor, Result};
use tracing::debug;

use crate::tree::RegressionTree;
use crate::{not_fitted, validate_rows, validate_training};

/// Least-squares gradient boosting.
///
/// Starts from the mean target; each round fits a shallow tree to the
/// current residuals and adds `learning_rate` times its output.
#[derive(Debug, Clone)]
pub struct GradientBoosting {
    params: GradientBoostingParams,
    init: f64,
    trees: Vec<RegressionTree>,
    n_features: usize,
}

impl GradientBoosting {
    pub fn new(params: GradientBoostingParams) -> Self {
        Self {
            params,
            init: 0.0,
            trees: Vec::new(),
            n_features: 0,
        }
    }

    fn raw_predict(&self, row: &[f64]) -> f64 {
        self.init
            + self.params.learning_rate
                * self
                    .trees
                    .iter()
                    .filter_map(|t| t.predict_row(row))
                    .sum::<f64>()
    }
}

impl Regressor for GradientBoosting {
    fn name(&self) -> &str {
        "GBR"
    }

    fn fit(&mut self, x: &[Vec<f64>], y: &[f64]) -> Result<()> {
        self.n_features = validate_training(self.name(), x, y)?;
        self.init = y.iter().sum::<f64>() / y.len() as f64;

        let mut predictions = vec![self.init; y.len()];
        let mut trees = Vec::with_capacity(self.params.n_estimators);

        for _ in 0..self.params.n_estimators {
            let residuals: Vec<f64> = y.iter().zip(&predictions).map(|(t, p)| t - p).collect();

            let mut tree = RegressionTree::new().with_max_depth(Some(self.params.max_depth));
            tree.fit(x, &residuals)?;

            for (pred, row) in predictions.iter_mut().zip(x) {
                *pred += self.params.learning_rate * tree.predict_row(row).unwrap_or(0.0);
            }
            trees.push(tree);
        }

        let train_mse = y
            .iter()
            .zip(&predictions)
            .map(|(t, p)| (t - p).powi(2))
            .sum::<f64>()
            / y.len() as f64;
        debug!(
            rounds = trees.len(),
            init = self.init,
            train_mse = train_mse,
            "Gradient boosting fitted"
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
