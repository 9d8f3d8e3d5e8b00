use common::metrics::mean;
use common::{AdaptiveConfig, ForecastError, ModelResult, Result};
use models::LinearRegression;
use selector::{select_adaptive_strategy, AdaptiveStrategy};
use tracing::info;

use crate::split::TrainTestSplit;
use crate::trainer::{build_result, fit_and_score, score, Horizon, Scoring};

/// Report label of the adaptive fallback model.
pub const ADAPTIVE_MODEL_NAME: &str = "ADAPTATIVO";

/// Sample-size dependent fallback forecast for short weekly histories.
#[derive(Debug, Clone, Default)]
pub struct AdaptiveFallback {
    config: AdaptiveConfig,
}

impl AdaptiveFallback {
    pub fn new(config: AdaptiveConfig) -> Self {
        Self { config }
    }

    /// Run the branch chosen for `n_points` weekly observations.
    ///
    /// Returns `None` when the history is long enough that no fallback is
    /// produced. Forecast values are always floored at zero.
    pub fn run(
        &self,
        n_points: usize,
        split: &TrainTestSplit,
        horizon: &Horizon,
    ) -> Result<Option<ModelResult>> {
        let strategy = select_adaptive_strategy(n_points, &self.config);
        info!(n_points, strategy = %strategy, "Running adaptive fallback");

        let result = match strategy {
            AdaptiveStrategy::ConstantMean => Some(self.constant_mean(split, horizon)?),
            AdaptiveStrategy::Linear => {
                let mut model = LinearRegression::new();
                let result =
                    fit_and_score(&mut model, ADAPTIVE_MODEL_NAME, split, horizon, Scoring::Weekly)
                        .map_err(|e| ForecastError::model_fitting(ADAPTIVE_MODEL_NAME, e.to_string()))?;
                Some(result)
            }
            AdaptiveStrategy::Omitted => None,
        };
        Ok(result)
    }

    /// Training mean at every step, scored against the holdout weeks.
    fn constant_mean(&self, split: &TrainTestSplit, horizon: &Horizon) -> Result<ModelResult> {
        if split.y_train.is_empty() {
            return Err(ForecastError::model_fitting(
                ADAPTIVE_MODEL_NAME,
                "empty training set",
            ));
        }
        let level = mean(&split.y_train);
        let metrics = score(&vec![level; split.test_len()], &split.y_test, Scoring::Weekly);
        let values = vec![level; horizon.len()];
        Ok(build_result(
            ADAPTIVE_MODEL_NAME,
            metrics,
            &horizon.labels,
            &values,
            Scoring::Weekly,
        ))
    }
}
