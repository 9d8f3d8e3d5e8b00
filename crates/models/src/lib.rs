mod extreme_boosting;
mod forest;
mod gradient_boosting;
mod linear;
mod tree;

pub use extreme_boosting::ExtremeGradientBoosting;
pub use forest::RandomForest;
pub use gradient_boosting::GradientBoosting;
pub use linear::LinearRegression;
pub use tree::RegressionTree;

use common::{ForecastError, ModelKind, ModelParams, ModelSpec, Regressor, Result};
use tracing::debug;

/// Create a model instance from a catalogue entry.
pub fn create_model(spec: &ModelSpec) -> Result<Box<dyn Regressor>> {
    debug!(model = %spec.kind, seed = ?spec.seed, "Creating model");
    let model: Box<dyn Regressor> = match (spec.kind, &spec.params) {
        (ModelKind::GradientBoostedTrees, ModelParams::GradientBoosting(p)) => {
            Box::new(GradientBoosting::new(p.clone()))
        }
        (ModelKind::RandomForestTrees, ModelParams::RandomForest(p)) => {
            Box::new(RandomForest::new(p.clone(), spec.seed))
        }
        (ModelKind::LinearRegression, ModelParams::Linear) => Box::new(LinearRegression::new()),
        (ModelKind::ExtremeGradientBoostedTrees, ModelParams::ExtremeBoosting(p)) => {
            Box::new(ExtremeGradientBoosting::new(p.clone()))
        }
        (kind, params) => {
            return Err(ForecastError::model_fitting(
                kind.label(),
                format!("hyperparameters {params:?} do not belong to this model"),
            ))
        }
    };
    Ok(model)
}

/// Validate a training set and return its feature count.
pub(crate) fn validate_training(model: &str, x: &[Vec<f64>], y: &[f64]) -> Result<usize> {
    if x.is_empty() {
        return Err(ForecastError::model_fitting(model, "empty training set"));
    }
    if x.len() != y.len() {
        return Err(ForecastError::model_fitting(
            model,
            format!("{} feature rows but {} targets", x.len(), y.len()),
        ));
    }
    let n_features = x[0].len();
    if n_features == 0 {
        return Err(ForecastError::model_fitting(model, "no feature columns"));
    }
    validate_rows(model, x, n_features)?;
    if y.iter().any(|v| !v.is_finite()) {
        return Err(ForecastError::model_fitting(model, "non-finite target value"));
    }
    Ok(n_features)
}

/// Validate that every row has `n_features` finite values.
pub(crate) fn validate_rows(model: &str, x: &[Vec<f64>], n_features: usize) -> Result<()> {
    for (i, row) in x.iter().enumerate() {
        if row.len() != n_features {
            return Err(ForecastError::model_fitting(
                model,
                format!("row {i} has {} features, expected {n_features}", row.len()),
            ));
        }
        if row.iter().any(|v| !v.is_finite()) {
            return Err(ForecastError::model_fitting(
                model,
                format!("row {i} contains a non-finite feature"),
            ));
        }
    }
    Ok(())
}

pub(crate) fn not_fitted(model: &str) -> ForecastError {
    ForecastError::model_fitting(model, "model must be fitted before prediction")
}
