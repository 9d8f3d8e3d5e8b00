use common::metrics::{clamp_non_negative, round2};
use common::{EnsembleForecast, ForecastError, ForecastPoint, ModelResult, Result};
use tracing::info;

/// Per-step arithmetic mean of every model forecast, rounded to two decimals
/// and floored at zero.
///
/// All results must forecast the same labelled horizon.
pub fn average_forecasts(results: &[ModelResult]) -> Result<EnsembleForecast> {
    let Some(first) = results.first() else {
        return Ok(EnsembleForecast::default());
    };

    for result in &results[1..] {
        let same_labels = result.forecast.len() == first.forecast.len()
            && result
                .forecast
                .iter()
                .zip(&first.forecast)
                .all(|(a, b)| a.label == b.label);
        if !same_labels {
            return Err(ForecastError::model_fitting(
                &result.model_name,
                format!(
                    "forecast horizon does not match {} ({} vs {} steps)",
                    first.model_name,
                    result.forecast.len(),
                    first.forecast.len()
                ),
            ));
        }
    }

    let n_models = results.len() as f64;
    let points: Vec<ForecastPoint> = first
        .forecast
        .iter()
        .enumerate()
        .map(|(step, point)| {
            let sum: f64 = results.iter().map(|r| r.forecast[step].value).sum();
            ForecastPoint {
                label: point.label.clone(),
                value: clamp_non_negative(round2(sum / n_models)),
            }
        })
        .collect();

    let contributors: Vec<String> = results.iter().map(|r| r.model_name.clone()).collect();
    info!(
        models = ?contributors,
        steps = points.len(),
        "Ensemble forecast built"
    );

    Ok(EnsembleForecast {
        points,
        contributors,
    })
}
