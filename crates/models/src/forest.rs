use common::{RandomForestParams, Regressor, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::tree::RegressionTree;
use crate::{not_fitted, validate_rows, validate_training};

/// Bagged regression trees. Each tree sees a bootstrap sample drawn with
/// `seed + tree_index`, so a fixed seed reproduces the forest exactly.
#[derive(Debug, Clone)]
pub struct RandomForest {
    params: RandomForestParams,
    seed: Option<u64>,
    trees: Vec<RegressionTree>,
    n_features: usize,
}

impl RandomForest {
    pub fn new(params: RandomForestParams, seed: Option<u64>) -> Self {
        Self {
            params,
            seed,
            trees: Vec::new(),
            n_features: 0,
        }
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}

fn bootstrap_sample(n_samples: usize, seed: Option<u64>) -> Vec<usize> {
    let mut rng = match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    };
    (0..n_samples).map(|_| rng.gen_range(0..n_samples)).collect()
}

impl Regressor for RandomForest {
    fn name(&self) -> &str {
        "RF"
    }

    fn fit(&mut self, x: &[Vec<f64>], y: &[f64]) -> Result<()> {
        self.n_features = validate_training(self.name(), x, y)?;
        let n_trees = self.params.n_estimators.max(1);

        let mut trees = Vec::with_capacity(n_trees);
        for i in 0..n_trees {
            let seed = self.seed.map(|s| s.wrapping_add(i as u64));
            let indices = bootstrap_sample(x.len(), seed);
            let mut tree = RegressionTree::new().with_max_depth(self.params.max_depth);
            tree.fit_indices(x, y, &indices)?;
            trees.push(tree);
        }

        debug!(trees = trees.len(), samples = x.len(), "Random forest fitted");
        self.trees = trees;
        Ok(())
    }

    fn predict(&self, x: &[Vec<f64>]) -> Result<Vec<f64>> {
        if self.trees.is_empty() {
            return Err(not_fitted(self.name()));
        }
        validate_rows(self.name(), x, self.n_features)?;
        let n_trees = self.trees.len() as f64;
        Ok(x.iter()
            .map(|row| {
                self.trees
                    .iter()
                    .filter_map(|t| t.predict_row(row))
                    .sum::<f64>()
                    / n_trees
            })
            .collect())
    }
}
