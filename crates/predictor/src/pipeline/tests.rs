use super::*;
use crate::report::ErrorReport;
use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use common::metrics::{clamp_non_negative, round2};
use serde_json::{json, Value};

fn week_base() -> NaiveDateTime {
    // Monday
    NaiveDate::from_ymd_opt(2024, 1, 1)
        .unwrap()
        .and_hms_opt(9, 30, 0)
        .unwrap()
}

/// Two records per week (Monday and Friday) summing to each weekly value.
fn make_records(weekly: &[f64]) -> Vec<TimeSeriesPoint> {
    weekly
        .iter()
        .enumerate()
        .flat_map(|(i, &total)| {
            let monday = week_base() + TimeDelta::weeks(i as i64);
            [
                TimeSeriesPoint::new(monday, total * 0.25),
                TimeSeriesPoint::new(monday + TimeDelta::days(4), total * 0.75),
            ]
        })
        .collect()
}

fn feature_request(modelo: &str, rows: usize) -> FeatureRequest {
    let data: Vec<Value> = (0..rows)
        .map(|i| json!({"precio": i, "descuento": (i % 4) as f64, "ventas": 1.0 + 2.0 * i as f64}))
        .collect();
    FeatureRequest::from_value(json!({
        "data": data,
        "target": "ventas",
        "features": ["precio", "descuento"],
        "modelo": modelo,
    }))
    .unwrap()
}

// ---- weekly mode ----

#[test]
fn test_weekly_five_weeks_worked_example() {
    let run = forecast_weekly(&make_records(&[10.0, 20.0, 15.0, 25.0, 30.0]), &AppConfig::default())
        .unwrap();

    let names: Vec<_> = run.results.iter().map(|r| r.model_name.as_str()).collect();
    assert_eq!(names, vec!["GBR", "RF", "LR", "XGB", "ADAPTATIVO"]);

    for r in &run.results {
        assert!((r.metrics.mae - 12.5).abs() < 1e-9, "{}", r.model_name);
        assert!((r.metrics.relative.value() - 52.5).abs() < 1e-9);
        assert!((r.metrics.r2.unwrap() + 5.0).abs() < 1e-9);
        assert_eq!(r.values(), vec![10.0; 12], "{}", r.model_name);
    }

    assert_eq!(run.ensemble.points.len(), 12);
    assert!(run.ensemble.points.iter().all(|p| p.value == 10.0));
    assert_eq!(run.ensemble.points[0].label, "2024-02-05");
    assert_eq!(run.ensemble.points[11].label, "2024-04-22");
    assert_eq!(run.ensemble.contributors.len(), 5);
}

#[test]
fn test_weekly_report_shape() {
    let report = run_weekly(&make_records(&[10.0, 20.0, 15.0, 25.0, 30.0]), &AppConfig::default())
        .unwrap();
    let value = serde_json::to_value(&report).unwrap();

    let model = &value["modelos"][0];
    assert_eq!(model["modelo"], "GBR");
    assert_eq!(model["MAE"], json!(12.5));
    assert_eq!(model["MAPE"], json!(52.5));
    assert_eq!(model["R2"], json!(-5.0));
    assert_eq!(model["predicciones"][0], json!({"semana": "2024-02-05", "valor": 10.0}));

    assert_eq!(value["historico"].as_array().unwrap().len(), 5);
    assert_eq!(value["historico"][1], json!({"semana": "2024-01-08", "cantidad": 20.0}));
    assert_eq!(
        value["prediccion"][3],
        json!({"semana": "2024-02-26", "prediccion": 10.0})
    );
}

#[test]
fn test_weekly_linear_fallback_for_medium_history() {
    let weekly: Vec<f64> = (0..8).map(|i| 100.0 + 4.0 * i as f64).collect();
    let run = forecast_weekly(&make_records(&weekly), &AppConfig::default()).unwrap();

    assert_eq!(run.results.len(), 5);
    let adaptive = &run.results[4];
    assert_eq!(adaptive.model_name, "ADAPTATIVO");
    // Same split and model as LR, so identical output
    assert_eq!(adaptive.values(), run.results[2].values());
    assert!((adaptive.forecast[0].value - 132.0).abs() < 1e-6);
}

#[test]
fn test_weekly_long_history_omits_fallback() {
    let weekly: Vec<f64> = (0..16).map(|i| 60.0 + ((i * 5) % 7) as f64).collect();
    let run = forecast_weekly(&make_records(&weekly), &AppConfig::default()).unwrap();

    assert_eq!(run.results.len(), 4);
    assert!(run.results.iter().all(|r| r.model_name != "ADAPTATIVO"));

    for (step, point) in run.ensemble.points.iter().enumerate() {
        let mean = run.results.iter().map(|r| r.forecast[step].value).sum::<f64>() / 4.0;
        assert_eq!(point.value, clamp_non_negative(round2(mean)));
    }
}

#[test]
fn test_weekly_forecasts_non_negative() {
    let weekly = [500.0, 400.0, 300.0, 200.0, 100.0, 50.0, 10.0];
    let run = forecast_weekly(&make_records(&weekly), &AppConfig::default()).unwrap();
    for r in &run.results {
        assert_eq!(r.forecast.len(), 12);
        assert!(r.values().iter().all(|v| *v >= 0.0), "{}", r.model_name);
    }
    assert!(run.ensemble.points.iter().all(|p| p.value >= 0.0));
}

#[test]
fn test_weekly_insufficient_history() {
    let err = forecast_weekly(&make_records(&[1.0, 2.0, 3.0, 4.0]), &AppConfig::default())
        .unwrap_err();
    assert!(matches!(err, common::ForecastError::InsufficientHistory(_)));
}

#[test]
fn test_weekly_runs_are_identical() {
    let weekly: Vec<f64> = (0..20).map(|i| 30.0 + ((i * 11) % 9) as f64 * 2.5).collect();
    let records = make_records(&weekly);
    let a = serde_json::to_string(&run_weekly(&records, &AppConfig::default()).unwrap()).unwrap();
    let b = serde_json::to_string(&run_weekly(&records, &AppConfig::default()).unwrap()).unwrap();
    assert_eq!(a, b);
}

// ---- feature mode ----

#[test]
fn test_feature_linear_recovers_relation() {
    let report = run_feature(&feature_request("LR", 20), &AppConfig::default()).unwrap();

    assert_eq!(report.debug_info.filas_validas, 20);
    assert_eq!(report.debug_info.columnas, vec!["precio", "descuento"]);
    assert_eq!(
        Value::Object(report.debug_info.ejemplo_primera_fila.clone()),
        json!({"precio": 0.0, "descuento": 0.0})
    );

    // Column means: precio 9.5 → ventas 20
    assert_eq!(report.predicciones.len(), 3);
    for p in &report.predicciones {
        assert!((p - 20.0).abs() < 1e-4, "{p}");
    }
    assert!(report.error_porcentaje.abs() < 0.01);
}

#[test]
fn test_feature_every_model_produces_three_predictions() {
    for modelo in ["gbr", "rf", "lr", "xgb"] {
        let run = forecast_feature(&feature_request(modelo, 15), &AppConfig::default()).unwrap();
        assert_eq!(run.result.forecast.len(), 3, "{modelo}");
        assert_eq!(run.result.model_name, modelo.to_uppercase());
        // ceil(15 * 0.2) = 3 holdout rows, 12 training rows
        assert!(run.result.metrics.r2.is_none());
    }
}

#[test]
fn test_feature_unsupported_model() {
    let mut request = feature_request("lr", 12);
    request.modelo = " SVM ".into();
    let err = run_feature(&request, &AppConfig::default()).unwrap_err();
    assert!(matches!(err, common::ForecastError::UnsupportedModel(ref m) if m == "SVM"));
}

#[test]
fn test_feature_data_errors_outrank_unsupported_model() {
    let mut request = feature_request("svm", 9);
    let err = run_feature(&request, &AppConfig::default()).unwrap_err();
    assert!(matches!(err, common::ForecastError::InsufficientHistory(_)));

    request = feature_request("svm", 12);
    request.target = "unidades".into();
    let err = run_feature(&request, &AppConfig::default()).unwrap_err();
    assert!(matches!(err, common::ForecastError::ColumnNotFound(_)));
}

#[test]
fn test_feature_too_few_rows() {
    let err = run_feature(&feature_request("lr", 9), &AppConfig::default()).unwrap_err();
    assert!(matches!(err, common::ForecastError::InsufficientHistory(_)));
}

#[test]
fn test_feature_zero_target_mean_is_numeric_error() {
    let data: Vec<Value> = (0..12).map(|i| json!({"x": i, "y": 0})).collect();
    let request = FeatureRequest::from_value(json!({
        "data": data,
        "target": "y",
        "features": ["x"],
        "modelo": "lr",
    }))
    .unwrap();
    let err = run_feature(&request, &AppConfig::default()).unwrap_err();
    assert!(matches!(err, common::ForecastError::NumericConversion(_)));
}

#[test]
fn test_feature_custom_horizon_rows() {
    let mut config = AppConfig::default();
    config.feature.horizon_rows = 5;
    let report = run_feature(&feature_request("lr", 20), &config).unwrap();
    assert_eq!(report.predicciones.len(), 5);
}

// ---- error report ----

#[test]
fn test_error_report_traceback_optional() {
    let err = common::ForecastError::model_fitting("ADAPTATIVO", "singular");
    let with = ErrorReport::from_error(&err, true);
    assert_eq!(with.error, "model ADAPTATIVO failed: singular");
    assert!(with
        .traceback
        .as_deref()
        .unwrap()
        .starts_with("model_fitting_error: "));

    let without = ErrorReport::from_error(&err, false);
    let value = serde_json::to_value(&without).unwrap();
    assert_eq!(value, json!({"error": "model ADAPTATIVO failed: singular"}));
}

#[test]
fn test_error_report_includes_cause() {
    let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.csv");
    let err = common::ForecastError::from(io);
    let report = ErrorReport::from_error(&err, true);
    let traceback = report.traceback.unwrap();
    assert!(traceback.contains("io_error"));
    assert!(traceback.contains("caused by: missing.csv"));
}
