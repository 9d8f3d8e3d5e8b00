use aggregator::aggregate_weekly;
use common::{
    AppConfig, EnsembleForecast, ForecastError, ModelResult, ModelSpec, Result, TimeSeriesPoint,
    WeeklySeries,
};
use tracing::info;
use trainer::{average_forecasts, AdaptiveFallback, Horizon, ModelBank, Scoring, SplitStrategy};

use crate::dataset::{Dataset, FeatureRequest};
use crate::report::{assemble_feature, assemble_weekly, FeatureReport, WeeklyReport};

/// Everything the weekly pipeline produced, before report formatting.
#[derive(Debug, Clone, PartialEq)]
pub struct WeeklyRun {
    pub series: WeeklySeries,
    /// Catalogue models in order, then the adaptive fallback when produced.
    pub results: Vec<ModelResult>,
    pub ensemble: EnsembleForecast,
}

/// Everything the feature pipeline produced, before report formatting.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRun {
    pub dataset: Dataset,
    pub result: ModelResult,
}

/// Weekly pipeline: aggregate → chronological split → model bank →
/// adaptive fallback → ensemble.
pub fn forecast_weekly(records: &[TimeSeriesPoint], config: &AppConfig) -> Result<WeeklyRun> {
    let weekly = &config.weekly;
    info!(
        records = records.len(),
        holdout = weekly.holdout_weeks,
        horizon = weekly.horizon_weeks,
        "Starting weekly pipeline"
    );

    let series = aggregate_weekly(records, weekly.min_weeks)?;
    let split = SplitStrategy::Chronological {
        holdout: weekly.holdout_weeks,
    }
    .split(&series.features(), &series.targets())?;

    let labels = series
        .future_week_starts(weekly.horizon_weeks)
        .iter()
        .map(|d| d.format("%Y-%m-%d").to_string())
        .collect();
    let horizon = Horizon::new(labels, series.future_features(weekly.horizon_weeks))?;

    let mut results =
        ModelBank::from_config(&config.models).train_all(&split, &horizon, Scoring::Weekly)?;
    if let Some(adaptive) =
        AdaptiveFallback::new(config.adaptive.clone()).run(series.len(), &split, &horizon)?
    {
        results.push(adaptive);
    }

    let ensemble = average_forecasts(&results)?;

    info!(
        weeks = series.len(),
        models = results.len(),
        steps = ensemble.points.len(),
        "Weekly pipeline complete"
    );
    Ok(WeeklyRun {
        series,
        results,
        ensemble,
    })
}

/// Run the weekly pipeline and package its report.
pub fn run_weekly(records: &[TimeSeriesPoint], config: &AppConfig) -> Result<WeeklyReport> {
    let run = forecast_weekly(records, config)?;
    assemble_weekly(&run.series, &run.results, &run.ensemble)
}

/// Feature pipeline: clean rows → random split → resolve model →
/// fit the requested model → forecast column-mean rows.
pub fn forecast_feature(request: &FeatureRequest, config: &AppConfig) -> Result<FeatureRun> {
    let feature = &config.feature;
    info!(
        model = %request.modelo,
        rows = request.data.len(),
        target = %request.target,
        features = ?request.features,
        "Starting feature pipeline"
    );

    let dataset = Dataset::from_request(request, feature)?;
    let split = SplitStrategy::Random {
        test_fraction: feature.test_fraction,
        seed: feature.split_seed,
    }
    .split(dataset.rows(), dataset.targets())?;
    let kind = request.model_kind()?;

    let means = dataset.column_means();
    let horizon = Horizon::new(
        (1..=feature.horizon_rows).map(|i| i.to_string()).collect(),
        vec![means; feature.horizon_rows],
    )?;

    let bank = ModelBank::new(vec![ModelSpec::from_config(kind, &config.models)]);
    let result = bank
        .train_all(&split, &horizon, Scoring::Feature)?
        .into_iter()
        .next()
        .ok_or_else(|| ForecastError::model_fitting(kind.label(), "no result produced"))?;

    info!(
        model = %kind,
        error_pct = format!("{:.2}", result.metrics.relative.value()),
        "Feature pipeline complete"
    );
    Ok(FeatureRun { dataset, result })
}

/// Run the feature pipeline and package its report.
pub fn run_feature(request: &FeatureRequest, config: &AppConfig) -> Result<FeatureReport> {
    let run = forecast_feature(request, config)?;
    assemble_feature(&run.dataset, &run.result)
}

#[cfg(test)]
mod tests;
