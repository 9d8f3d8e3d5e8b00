//! Out-of-sample accuracy of a forecast against the true continuation.

use common::metrics::mae;

/// Accuracy of one forecast over the future weeks.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricSet {
    pub mae: f64,
    pub rmse: f64,
    /// Symmetric MAPE (0–200%)
    pub smape: f64,
    /// MAE relative to the in-sample seasonal-naive MAE
    pub mase: f64,
    /// Total absolute error over total absolute demand, in percent
    pub wape: f64,
}

impl MetricSet {
    /// # Panics
    /// Panics if `forecast` and `actual` differ in length or are empty.
    pub fn compute(forecast: &[f64], actual: &[f64], history: &[f64], season: usize) -> Self {
        assert_eq!(
            forecast.len(),
            actual.len(),
            "forecast and actual must have the same length"
        );
        assert!(!forecast.is_empty(), "forecast must not be empty");

        let errors: Vec<f64> = forecast.iter().zip(actual).map(|(f, a)| f - a).collect();
        let n = errors.len() as f64;
        let abs_error: f64 = errors.iter().map(|e| e.abs()).sum();

        let smape_terms: Vec<f64> = forecast
            .iter()
            .zip(actual)
            .filter_map(|(f, a)| {
                let denom = f.abs() + a.abs();
                (denom > 1e-15).then(|| 2.0 * (f - a).abs() / denom)
            })
            .collect();
        let smape = if smape_terms.is_empty() {
            0.0
        } else {
            smape_terms.iter().sum::<f64>() / smape_terms.len() as f64 * 100.0
        };

        let total_actual: f64 = actual.iter().map(|a| a.abs()).sum();
        let wape = if total_actual > 1e-15 {
            abs_error / total_actual * 100.0
        } else {
            f64::INFINITY
        };

        Self {
            mae: abs_error / n,
            rmse: (errors.iter().map(|e| e * e).sum::<f64>() / n).sqrt(),
            smape,
            mase: mase(forecast, actual, history, season),
            wape,
        }
    }
}

/// MAE of the forecast over the MAE of a seasonal-naive forecast in sample.
///
/// Infinite when the history is too short or the naive forecast is perfect.
fn mase(forecast: &[f64], actual: &[f64], history: &[f64], season: usize) -> f64 {
    let season = season.max(1);
    if history.len() <= season {
        return f64::INFINITY;
    }
    let naive: Vec<f64> = history
        .iter()
        .skip(season)
        .zip(history)
        .map(|(curr, prev)| (curr - prev).abs())
        .collect();
    let naive_mae = naive.iter().sum::<f64>() / naive.len() as f64;
    if naive_mae < 1e-6 {
        return f64::INFINITY;
    }
    mae(forecast, actual) / naive_mae
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perfect_forecast() {
        let actual = vec![1.0, 2.0, 3.0];
        let history = vec![0.0, 0.5, 1.0, 1.5];
        let m = MetricSet::compute(&actual, &actual, &history, 1);
        assert_eq!(m.mae, 0.0);
        assert_eq!(m.rmse, 0.0);
        assert_eq!(m.smape, 0.0);
        assert_eq!(m.mase, 0.0);
        assert_eq!(m.wape, 0.0);
    }

    #[test]
    fn test_known_values() {
        let m = MetricSet::compute(&[2.0, 4.0, 6.0], &[1.0, 3.0, 5.0], &[0.0, 1.0, 2.0], 1);
        assert!((m.mae - 1.0).abs() < 1e-12);
        assert!((m.rmse - 1.0).abs() < 1e-12);
        // naive MAE 1.0
        assert!((m.mase - 1.0).abs() < 1e-12);
        assert!((m.wape - 100.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_seasonal_naive_scaling() {
        let history = vec![0.0, 10.0, 0.0, 10.0, 0.0, 10.0];
        // Period 2 repeats exactly: naive error 0
        let m = MetricSet::compute(&[1.0, 9.0], &[0.0, 10.0], &history, 2);
        assert!(m.mase.is_infinite());
        // Period 1: naive error 10
        let m = MetricSet::compute(&[1.0, 9.0], &[0.0, 10.0], &history, 1);
        assert!((m.mase - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_zero_demand() {
        let m = MetricSet::compute(&[0.0, 2.0], &[0.0, 0.0], &[1.0, 2.0], 1);
        assert!(m.wape.is_infinite());
        // Only the non-zero pair contributes: 2·2/2 = 200%
        assert!((m.smape - 200.0).abs() < 1e-9);
    }
}
