use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{ForecastError, Result};

/// Environment variable naming an optional JSON config file.
pub const CONFIG_ENV_VAR: &str = "FORECAST_CONFIG";

/// Application-level configuration. Every field has a default, so an empty
/// JSON object is a valid config file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub weekly: WeeklyConfig,

    #[serde(default)]
    pub feature: FeatureConfig,

    #[serde(default)]
    pub adaptive: AdaptiveConfig,

    #[serde(default)]
    pub models: ModelsConfig,
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ForecastError::InputFormat(format!(
                "cannot read config file {}: {e}",
                path.display()
            ))
        })?;
        serde_json::from_str(&content).map_err(|e| {
            ForecastError::InputFormat(format!(
                "invalid config file {}: {e}",
                path.display()
            ))
        })
    }

    /// Load from the file named by `FORECAST_CONFIG`, or fall back to defaults.
    pub fn from_env() -> Result<Self> {
        match std::env::var_os(CONFIG_ENV_VAR) {
            Some(path) => {
                info!(path = ?path, "Loading configuration");
                Self::load(Path::new(&path))
            }
            None => Ok(Self::default()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyConfig {
    #[serde(default = "default_min_weeks")]
    pub min_weeks: usize,
    #[serde(default = "default_holdout_weeks")]
    pub holdout_weeks: usize,
    #[serde(default = "default_horizon_weeks")]
    pub horizon_weeks: usize,
}

impl Default for WeeklyConfig {
    fn default() -> Self {
        Self {
            min_weeks: default_min_weeks(),
            holdout_weeks: default_holdout_weeks(),
            horizon_weeks: default_horizon_weeks(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureConfig {
    #[serde(default = "default_min_rows")]
    pub min_rows: usize,
    #[serde(default = "default_test_fraction")]
    pub test_fraction: f64,
    #[serde(default = "default_horizon_rows")]
    pub horizon_rows: usize,
    #[serde(default = "default_seed")]
    pub split_seed: u64,
    #[serde(default = "default_client_column")]
    pub client_column: String,
    #[serde(default = "default_product_column")]
    pub product_column: String,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            min_rows: default_min_rows(),
            test_fraction: default_test_fraction(),
            horizon_rows: default_horizon_rows(),
            split_seed: default_seed(),
            client_column: default_client_column(),
            product_column: default_product_column(),
        }
    }
}

/// Sample-count thresholds of the adaptive fallback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdaptiveConfig {
    /// Below this many weeks the fallback forecasts the training mean.
    #[serde(default = "default_constant_below")]
    pub constant_below: usize,
    /// Below this many weeks (and at or above `constant_below`) it fits a line.
    #[serde(default = "default_linear_below")]
    pub linear_below: usize,
}

impl Default for AdaptiveConfig {
    fn default() -> Self {
        Self {
            constant_below: default_constant_below(),
            linear_below: default_linear_below(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelsConfig {
    #[serde(default = "default_seed")]
    pub seed: u64,
    #[serde(default)]
    pub gradient_boosting: GradientBoostingParams,
    #[serde(default)]
    pub random_forest: RandomForestParams,
    #[serde(default)]
    pub extreme_boosting: ExtremeBoostingParams,
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            gradient_boosting: GradientBoostingParams::default(),
            random_forest: RandomForestParams::default(),
            extreme_boosting: ExtremeBoostingParams::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradientBoostingParams {
    #[serde(default = "default_n_estimators")]
    pub n_estimators: usize,
    #[serde(default = "default_gbr_learning_rate")]
    pub learning_rate: f64,
    #[serde(default = "default_gbr_max_depth")]
    pub max_depth: usize,
}

impl Default for GradientBoostingParams {
    fn default() -> Self {
        Self {
            n_estimators: default_n_estimators(),
            learning_rate: default_gbr_learning_rate(),
            max_depth: default_gbr_max_depth(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForestParams {
    #[serde(default = "default_n_estimators")]
    pub n_estimators: usize,
    /// `None` grows every tree until its leaves are pure.
    #[serde(default)]
    pub max_depth: Option<usize>,
}

impl Default for RandomForestParams {
    fn default() -> Self {
        Self {
            n_estimators: default_n_estimators(),
            max_depth: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtremeBoostingParams {
    #[serde(default = "default_n_estimators")]
    pub n_estimators: usize,
    #[serde(default = "default_xgb_eta")]
    pub eta: f64,
    #[serde(default = "default_xgb_max_depth")]
    pub max_depth: usize,
    #[serde(default = "default_xgb_lambda")]
    pub lambda: f64,
    #[serde(default)]
    pub gamma: f64,
    #[serde(default = "default_xgb_min_child_weight")]
    pub min_child_weight: f64,
}

impl Default for ExtremeBoostingParams {
    fn default() -> Self {
        Self {
            n_estimators: default_n_estimators(),
            eta: default_xgb_eta(),
            max_depth: default_xgb_max_depth(),
            lambda: default_xgb_lambda(),
            gamma: 0.0,
            min_child_weight: default_xgb_min_child_weight(),
        }
    }
}

fn default_min_weeks() -> usize {
    5
}
fn default_holdout_weeks() -> usize {
    4
}
fn default_horizon_weeks() -> usize {
    12
}
fn default_min_rows() -> usize {
    10
}
fn default_test_fraction() -> f64 {
    0.2
}
fn default_horizon_rows() -> usize {
    3
}
fn default_seed() -> u64 {
    42
}
fn default_client_column() -> String {
    "Nombre del cliente".into()
}
fn default_product_column() -> String {
    "Producto".into()
}
fn default_constant_below() -> usize {
    6
}
fn default_linear_below() -> usize {
    12
}
fn default_n_estimators() -> usize {
    100
}
fn default_gbr_learning_rate() -> f64 {
    0.1
}
fn default_gbr_max_depth() -> usize {
    3
}
fn default_xgb_eta() -> f64 {
    0.3
}
fn default_xgb_max_depth() -> usize {
    6
}
fn default_xgb_lambda() -> f64 {
    1.0
}
fn default_xgb_min_child_weight() -> f64 {
    1.0
}
