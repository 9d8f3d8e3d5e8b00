use common::{ForecastError, Result};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::debug;

/// How a dataset is partitioned into training and holdout rows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SplitStrategy {
    /// The last `holdout` rows are the test set; order is preserved.
    Chronological { holdout: usize },
    /// `ceil(n * test_fraction)` rows drawn by a seeded shuffle.
    Random { test_fraction: f64, seed: u64 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrainTestSplit {
    pub x_train: Vec<Vec<f64>>,
    pub y_train: Vec<f64>,
    pub x_test: Vec<Vec<f64>>,
    pub y_test: Vec<f64>,
}

impl TrainTestSplit {
    pub fn train_len(&self) -> usize {
        self.y_train.len()
    }

    pub fn test_len(&self) -> usize {
        self.y_test.len()
    }
}

impl SplitStrategy {
    pub fn split(&self, x: &[Vec<f64>], y: &[f64]) -> Result<TrainTestSplit> {
        if x.len() != y.len() {
            return Err(ForecastError::InputFormat(format!(
                "{} feature rows but {} targets",
                x.len(),
                y.len()
            )));
        }
        let n = y.len();

        let (train_idx, test_idx): (Vec<usize>, Vec<usize>) = match *self {
            SplitStrategy::Chronological { holdout } => {
                let n_train = n.saturating_sub(holdout);
                ((0..n_train).collect(), (n_train..n).collect())
            }
            SplitStrategy::Random {
                test_fraction,
                seed,
            } => {
                let n_test = ((n as f64 * test_fraction).ceil() as usize).min(n);
                let mut order: Vec<usize> = (0..n).collect();
                order.shuffle(&mut StdRng::seed_from_u64(seed));
                let train = order.split_off(n_test);
                (train, order)
            }
        };

        if train_idx.is_empty() || test_idx.is_empty() {
            return Err(ForecastError::InsufficientHistory(format!(
                "{n} rows leave {} for training and {} for testing",
                train_idx.len(),
                test_idx.len()
            )));
        }

        debug!(
            strategy = ?self,
            train = train_idx.len(),
            test = test_idx.len(),
            "Dataset split"
        );

        let take = |idx: &[usize]| -> (Vec<Vec<f64>>, Vec<f64>) {
            idx.iter().map(|&i| (x[i].clone(), y[i])).unzip()
        };
        let (x_train, y_train) = take(&train_idx);
        let (x_test, y_test) = take(&test_idx);
        Ok(TrainTestSplit {
            x_train,
            y_train,
            x_test,
            y_test,
        })
    }
}
