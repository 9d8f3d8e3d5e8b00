use std::fmt;
use std::str::FromStr;

use chrono::{Days, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::config::{
    ExtremeBoostingParams, GradientBoostingParams, ModelsConfig, RandomForestParams,
};
use crate::{ForecastError, Result};

/// One dated quantity record, as supplied by ingestion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesPoint {
    pub timestamp: NaiveDateTime,
    pub quantity: f64,
}

impl TimeSeriesPoint {
    pub fn new(timestamp: NaiveDateTime, quantity: f64) -> Self {
        Self {
            timestamp,
            quantity,
        }
    }
}

/// One aggregated week.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeeklyPoint {
    /// Monday of the ISO week.
    pub week_start: NaiveDate,
    /// Sum of all quantities recorded in the week.
    pub quantity: f64,
    /// Zero-based position in the series.
    pub week_index: usize,
}

/// Ordered weekly series.
///
/// Week starts are strictly increasing and `week_index` runs 0, 1, 2, ...
/// without gaps. Construction goes through [`WeeklySeries::new`], which
/// enforces both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklySeries {
    points: Vec<WeeklyPoint>,
}

impl WeeklySeries {
    pub fn new(points: Vec<WeeklyPoint>) -> Result<Self> {
        for (i, p) in points.iter().enumerate() {
            if p.week_index != i {
                return Err(ForecastError::InputFormat(format!(
                    "week index {} at position {i} is not contiguous",
                    p.week_index
                )));
            }
        }
        if points.windows(2).any(|w| w[0].week_start >= w[1].week_start) {
            return Err(ForecastError::InputFormat(
                "week starts must be strictly increasing".into(),
            ));
        }
        Ok(Self { points })
    }

    pub fn points(&self) -> &[WeeklyPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Single-column feature matrix: the week index.
    pub fn features(&self) -> Vec<Vec<f64>> {
        self.points
            .iter()
            .map(|p| vec![p.week_index as f64])
            .collect()
    }

    pub fn targets(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.quantity).collect()
    }

    /// Feature rows for the `horizon` week indices following the last one.
    pub fn future_features(&self, horizon: usize) -> Vec<Vec<f64>> {
        let next = self.points.len();
        (next..next + horizon).map(|i| vec![i as f64]).collect()
    }

    /// Week starts for the `horizon` weeks following the last observed one.
    pub fn future_week_starts(&self, horizon: usize) -> Vec<NaiveDate> {
        let Some(last) = self.points.last() else {
            return Vec::new();
        };
        (1..=horizon as u64)
            .filter_map(|k| last.week_start.checked_add_days(Days::new(7 * k)))
            .collect()
    }
}

/// Fixed catalogue of regression model families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    GradientBoostedTrees,
    RandomForestTrees,
    LinearRegression,
    ExtremeGradientBoostedTrees,
}

impl ModelKind {
    /// Catalogue in report order.
    pub const ALL: [ModelKind; 4] = [
        ModelKind::GradientBoostedTrees,
        ModelKind::RandomForestTrees,
        ModelKind::LinearRegression,
        ModelKind::ExtremeGradientBoostedTrees,
    ];

    /// Short label used in reports.
    pub fn label(&self) -> &'static str {
        match self {
            ModelKind::GradientBoostedTrees => "GBR",
            ModelKind::RandomForestTrees => "RF",
            ModelKind::LinearRegression => "LR",
            ModelKind::ExtremeGradientBoostedTrees => "XGB",
        }
    }

    /// Request code accepted in feature mode.
    pub fn code(&self) -> &'static str {
        match self {
            ModelKind::GradientBoostedTrees => "gbr",
            ModelKind::RandomForestTrees => "rf",
            ModelKind::LinearRegression => "lr",
            ModelKind::ExtremeGradientBoostedTrees => "xgb",
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ModelKind {
    type Err = ForecastError;

    fn from_str(s: &str) -> Result<Self> {
        let code = s.trim().to_lowercase();
        ModelKind::ALL
            .into_iter()
            .find(|k| k.code() == code)
            .ok_or_else(|| ForecastError::UnsupportedModel(s.trim().to_string()))
    }
}

/// Hyperparameters for one model family.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ModelParams {
    GradientBoosting(GradientBoostingParams),
    RandomForest(RandomForestParams),
    Linear,
    ExtremeBoosting(ExtremeBoostingParams),
}

/// A catalogue entry resolved against the configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSpec {
    pub kind: ModelKind,
    pub params: ModelParams,
    pub seed: Option<u64>,
}

impl ModelSpec {
    pub fn from_config(kind: ModelKind, config: &ModelsConfig) -> Self {
        let (params, seed) = match kind {
            ModelKind::GradientBoostedTrees => (
                ModelParams::GradientBoosting(config.gradient_boosting.clone()),
                None,
            ),
            ModelKind::RandomForestTrees => (
                ModelParams::RandomForest(config.random_forest.clone()),
                Some(config.seed),
            ),
            ModelKind::LinearRegression => (ModelParams::Linear, None),
            ModelKind::ExtremeGradientBoostedTrees => (
                ModelParams::ExtremeBoosting(config.extreme_boosting.clone()),
                None,
            ),
        };
        Self { kind, params, seed }
    }

    /// Full catalogue, in report order.
    pub fn catalogue(config: &ModelsConfig) -> Vec<ModelSpec> {
        ModelKind::ALL
            .into_iter()
            .map(|k| Self::from_config(k, config))
            .collect()
    }
}

/// Trait that all regression model variants implement.
///
/// Rows of `x` are observations; every row has the same width.
pub trait Regressor: Send + Sync {
    fn name(&self) -> &str;

    fn fit(&mut self, x: &[Vec<f64>], y: &[f64]) -> crate::Result<()>;

    fn predict(&self, x: &[Vec<f64>]) -> crate::Result<Vec<f64>>;
}

/// One forecast step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    /// Week start (`YYYY-MM-DD`) in weekly mode, row number in feature mode.
    pub label: String,
    pub value: f64,
}

/// Relative error reported next to the MAE.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelativeError {
    /// Mean absolute percentage error, 0-100 scale.
    Mape(f64),
    /// MAE as a percentage of the mean test target.
    ErrorPercentage(f64),
}

impl RelativeError {
    pub fn value(&self) -> f64 {
        match self {
            RelativeError::Mape(v) | RelativeError::ErrorPercentage(v) => *v,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelMetrics {
    pub mae: f64,
    pub relative: RelativeError,
    pub r2: Option<f64>,
}

/// Holdout metrics and future forecast of one model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelResult {
    pub model_name: String,
    pub metrics: ModelMetrics,
    pub forecast: Vec<ForecastPoint>,
}

impl ModelResult {
    pub fn values(&self) -> Vec<f64> {
        self.forecast.iter().map(|p| p.value).collect()
    }
}

/// Per-step consensus across all contributing models.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EnsembleForecast {
    pub points: Vec<ForecastPoint>,
    /// Names of the models that were averaged.
    pub contributors: Vec<String>,
}
