use common::metrics::{clamp_non_negative, error_percentage, mae, mape, r2, round2};
use common::{
    ForecastError, ForecastPoint, ModelMetrics, ModelResult, ModelSpec, ModelsConfig, Regressor,
    RelativeError, Result,
};
use models::create_model;
use tracing::{debug, info};

use crate::split::TrainTestSplit;

/// How holdout predictions are scored and forecasts post-processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scoring {
    /// MAE, MAPE and R2; forecasts floored at zero and rounded to cents.
    Weekly,
    /// MAE and error percentage; forecasts left raw.
    Feature,
}

/// Future rows to forecast, with the label each step is reported under.
#[derive(Debug, Clone, PartialEq)]
pub struct Horizon {
    pub labels: Vec<String>,
    pub features: Vec<Vec<f64>>,
}

impl Horizon {
    pub fn new(labels: Vec<String>, features: Vec<Vec<f64>>) -> Result<Self> {
        if labels.len() != features.len() {
            return Err(ForecastError::InputFormat(format!(
                "{} horizon labels for {} horizon rows",
                labels.len(),
                features.len()
            )));
        }
        Ok(Self { labels, features })
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Fixed set of regression models trained independently on one split.
pub struct ModelBank {
    specs: Vec<ModelSpec>,
}

impl ModelBank {
    pub fn new(specs: Vec<ModelSpec>) -> Self {
        Self { specs }
    }

    /// The whole catalogue, in report order.
    pub fn from_config(config: &ModelsConfig) -> Self {
        Self::new(ModelSpec::catalogue(config))
    }

    pub fn specs(&self) -> &[ModelSpec] {
        &self.specs
    }

    /// Fit, score and forecast every model. The first failure aborts the run.
    pub fn train_all(
        &self,
        split: &TrainTestSplit,
        horizon: &Horizon,
        scoring: Scoring,
    ) -> Result<Vec<ModelResult>> {
        info!(
            models = self.specs.len(),
            train = split.train_len(),
            test = split.test_len(),
            horizon = horizon.len(),
            "Training model bank"
        );

        self.specs
            .iter()
            .map(|spec| {
                let mut model = create_model(spec)?;
                fit_and_score(model.as_mut(), spec.kind.label(), split, horizon, scoring)
            })
            .collect()
    }
}

/// Fit `model` on the training rows, score it on the holdout rows and
/// forecast the horizon. The result is reported under `name`.
pub(crate) fn fit_and_score(
    model: &mut dyn Regressor,
    name: &str,
    split: &TrainTestSplit,
    horizon: &Horizon,
    scoring: Scoring,
) -> Result<ModelResult> {
    model.fit(&split.x_train, &split.y_train)?;
    let test_pred = model.predict(&split.x_test)?;
    let metrics = score(&test_pred, &split.y_test, scoring);

    let future = model.predict(&horizon.features)?;
    let result = build_result(name, metrics, &horizon.labels, &future, scoring);

    info!(
        model = name,
        mae = format!("{:.4}", metrics.mae),
        relative = format!("{:.4}", metrics.relative.value()),
        r2 = ?metrics.r2,
        "Model evaluated"
    );
    Ok(result)
}

/// Holdout metrics of `predicted` against `actual`.
pub(crate) fn score(predicted: &[f64], actual: &[f64], scoring: Scoring) -> ModelMetrics {
    match scoring {
        Scoring::Weekly => ModelMetrics {
            mae: mae(predicted, actual),
            relative: RelativeError::Mape(mape(predicted, actual)),
            r2: Some(r2(predicted, actual)),
        },
        Scoring::Feature => ModelMetrics {
            mae: mae(predicted, actual),
            relative: RelativeError::ErrorPercentage(error_percentage(predicted, actual)),
            r2: None,
        },
    }
}

pub(crate) fn build_result(
    name: &str,
    metrics: ModelMetrics,
    labels: &[String],
    values: &[f64],
    scoring: Scoring,
) -> ModelResult {
    let forecast = labels
        .iter()
        .zip(values)
        .map(|(label, &value)| ForecastPoint {
            label: label.clone(),
            value: match scoring {
                Scoring::Weekly => clamp_non_negative(round2(value)),
                Scoring::Feature => value,
            },
        })
        .collect::<Vec<_>>();
    debug!(model = name, steps = forecast.len(), "Forecast built");
    ModelResult {
        model_name: name.to_string(),
        metrics,
        forecast,
    }
}
