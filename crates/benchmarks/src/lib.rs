//! Shared inputs for the criterion benches.

use chrono::{NaiveDate, TimeDelta};
use common::TimeSeriesPoint;

/// Weekly totals with a trend and a four-week cycle.
pub fn generate_trend_seasonal(n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| {
            100.0
                + 1.5 * i as f64
                + 30.0 * (2.0 * std::f64::consts::PI * i as f64 / 4.0).sin()
        })
        .collect()
}

/// Single-column design matrix (week index) and matching targets.
pub fn indexed_design(values: &[f64]) -> (Vec<Vec<f64>>, Vec<f64>) {
    let x = (0..values.len()).map(|i| vec![i as f64]).collect();
    (x, values.to_vec())
}

/// Daily records whose ISO-week totals equal `weekly`.
pub fn daily_records(weekly: &[f64]) -> Vec<TimeSeriesPoint> {
    let base = NaiveDate::from_ymd_opt(2024, 1, 1)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap();
    weekly
        .iter()
        .enumerate()
        .flat_map(|(week, &total)| {
            (0..7).map(move |day| {
                TimeSeriesPoint::new(
                    base + TimeDelta::days((week * 7 + day) as i64),
                    total / 7.0,
                )
            })
        })
        .collect()
}
