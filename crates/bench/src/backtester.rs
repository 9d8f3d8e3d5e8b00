use common::{AppConfig, ModelMetrics};
use predictor::forecast_weekly;
use tracing::{debug, warn};

use crate::data_generator::WeeklyFixture;
use crate::metrics::MetricSet;

/// Report label of the consensus forecast.
pub const ENSEMBLE_NAME: &str = "ENSEMBLE";

/// Result of one model (or the ensemble) on one fixture.
#[derive(Debug, Clone)]
pub struct BacktestResult {
    pub fixture_name: String,
    pub model_name: String,
    /// Holdout metrics reported by the pipeline; `None` for the ensemble.
    pub holdout: Option<ModelMetrics>,
    /// Accuracy against the true future weeks.
    pub future: MetricSet,
    pub forecast: Vec<f64>,
    pub actual: Vec<f64>,
}

/// Run the weekly pipeline on a single fixture and score every model and the
/// ensemble against the withheld future.
pub fn run_backtest(fixture: &WeeklyFixture, config: &AppConfig) -> Vec<BacktestResult> {
    let run = match forecast_weekly(&fixture.records(), config) {
        Ok(run) => run,
        Err(e) => {
            warn!(error = %e, fixture = %fixture.name, "Weekly pipeline failed");
            return Vec::new();
        }
    };

    let season = fixture.seasonal_period.unwrap_or(1);
    let steps = fixture.future.len().min(run.ensemble.points.len());
    let actual = &fixture.future[..steps];

    let score = |name: &str, holdout: Option<ModelMetrics>, forecast: Vec<f64>| {
        let forecast: Vec<f64> = forecast.into_iter().take(steps).collect();
        let future = MetricSet::compute(&forecast, actual, &fixture.history, season);
        debug!(
            fixture = %fixture.name,
            model = name,
            mae = format!("{:.3}", future.mae),
            "Backtest scored"
        );
        BacktestResult {
            fixture_name: fixture.name.clone(),
            model_name: name.to_string(),
            holdout,
            future,
            forecast,
            actual: actual.to_vec(),
        }
    };

    let mut results: Vec<BacktestResult> = run
        .results
        .iter()
        .map(|r| score(&r.model_name, Some(r.metrics), r.values()))
        .collect();
    let ensemble: Vec<f64> = run.ensemble.points.iter().map(|p| p.value).collect();
    results.push(score(ENSEMBLE_NAME, None, ensemble));
    results
}

/// Run backtests on all provided fixtures with the default configuration.
pub fn run_all_backtests(fixtures: &[WeeklyFixture]) -> Vec<BacktestResult> {
    let config = AppConfig::default();
    fixtures
        .iter()
        .flat_map(|f| run_backtest(f, &config))
        .collect()
}
