/// Compute Mean Absolute Error.
pub fn mae(forecast: &[f64], actual: &[f64]) -> f64 {
    assert_eq!(forecast.len(), actual.len());
    if forecast.is_empty() {
        return 0.0;
    }
    forecast
        .iter()
        .zip(actual)
        .map(|(f, a)| (f - a).abs())
        .sum::<f64>()
        / forecast.len() as f64
}

/// Compute Mean Absolute Percentage Error on a 0-100 scale.
///
/// Each denominator is floored at `f64::EPSILON`, so a zero actual produces a
/// very large (but finite) term instead of a division by zero.
pub fn mape(forecast: &[f64], actual: &[f64]) -> f64 {
    assert_eq!(forecast.len(), actual.len());
    if forecast.is_empty() {
        return 0.0;
    }
    let sum: f64 = forecast
        .iter()
        .zip(actual)
        .map(|(f, a)| (f - a).abs() / a.abs().max(f64::EPSILON))
        .sum();
    sum / forecast.len() as f64 * 100.0
}

/// Coefficient of determination of `forecast` against `actual`.
///
/// When `actual` is constant the score is 1.0 for a perfect fit and 0.0
/// otherwise.
pub fn r2(forecast: &[f64], actual: &[f64]) -> f64 {
    assert_eq!(forecast.len(), actual.len());
    if actual.is_empty() {
        return 0.0;
    }
    let mean = mean(actual);
    let ss_res: f64 = forecast
        .iter()
        .zip(actual)
        .map(|(f, a)| (a - f).powi(2))
        .sum();
    let ss_tot: f64 = actual.iter().map(|a| (a - mean).powi(2)).sum();

    if ss_tot == 0.0 {
        return if ss_res == 0.0 { 1.0 } else { 0.0 };
    }
    1.0 - ss_res / ss_tot
}

/// MAE expressed as a percentage of the mean actual value.
pub fn error_percentage(forecast: &[f64], actual: &[f64]) -> f64 {
    mae(forecast, actual) / mean(actual) * 100.0
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Round half away from zero to two decimals.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Floor at zero. Negative zero and NaN both map to `0.0`.
pub fn clamp_non_negative(value: f64) -> f64 {
    if value > 0.0 {
        value
    } else {
        0.0
    }
}
