//! Report documents written to standard output.

use std::error::Error as _;

use common::metrics::round2;
use common::{EnsembleForecast, ForecastError, ModelResult, Result, WeeklySeries};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::dataset::Dataset;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyReport {
    pub modelos: Vec<ModelReport>,
    pub historico: Vec<HistoryEntry>,
    pub prediccion: Vec<EnsembleEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelReport {
    pub modelo: String,
    #[serde(rename = "MAE")]
    pub mae: f64,
    #[serde(rename = "MAPE")]
    pub mape: f64,
    #[serde(rename = "R2")]
    pub r2: f64,
    pub predicciones: Vec<PredictionEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionEntry {
    pub semana: String,
    pub valor: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub semana: String,
    pub cantidad: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnsembleEntry {
    pub semana: String,
    pub prediccion: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureReport {
    pub debug_info: DebugInfo,
    pub predicciones: Vec<f64>,
    pub error_porcentaje: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebugInfo {
    pub filas_validas: usize,
    pub columnas: Vec<String>,
    pub ejemplo_primera_fila: Map<String, Value>,
}

/// Failure document. `traceback` carries the error chain when requested.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorReport {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub traceback: Option<String>,
}

impl ErrorReport {
    pub fn from_error(err: &ForecastError, with_traceback: bool) -> Self {
        let traceback = with_traceback.then(|| {
            let mut lines = vec![format!("{}: {}", err.kind(), err)];
            let mut source = err.source();
            while let Some(cause) = source {
                lines.push(format!("caused by: {cause}"));
                source = cause.source();
            }
            lines.join("\n")
        });
        Self {
            error: err.to_string(),
            traceback,
        }
    }
}

/// Reject values that cannot be represented in the JSON report.
fn finite(field: &str, owner: &str, value: f64) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ForecastError::NumericConversion(format!(
            "{field} of {owner} is not a finite number ({value})"
        )))
    }
}

/// Package weekly-mode results. Metrics are rounded to two decimals.
pub fn assemble_weekly(
    series: &WeeklySeries,
    results: &[ModelResult],
    ensemble: &EnsembleForecast,
) -> Result<WeeklyReport> {
    let modelos = results
        .iter()
        .map(|r| {
            let name = r.model_name.as_str();
            let r2 = r.metrics.r2.ok_or_else(|| {
                ForecastError::NumericConversion(format!("R2 of {name} was not computed"))
            })?;
            let predicciones = r
                .forecast
                .iter()
                .map(|p| {
                    Ok(PredictionEntry {
                        semana: p.label.clone(),
                        valor: finite("forecast", name, p.value)?,
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            Ok(ModelReport {
                modelo: r.model_name.clone(),
                mae: finite("MAE", name, round2(r.metrics.mae))?,
                mape: finite("MAPE", name, round2(r.metrics.relative.value()))?,
                r2: finite("R2", name, round2(r2))?,
                predicciones,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let historico = series
        .points()
        .iter()
        .map(|p| HistoryEntry {
            semana: p.week_start.format("%Y-%m-%d").to_string(),
            cantidad: p.quantity,
        })
        .collect();

    let prediccion = ensemble
        .points
        .iter()
        .map(|p| {
            Ok(EnsembleEntry {
                semana: p.label.clone(),
                prediccion: finite("forecast", "ensemble", p.value)?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(WeeklyReport {
        modelos,
        historico,
        prediccion,
    })
}

/// Package the single feature-mode model result.
pub fn assemble_feature(dataset: &Dataset, result: &ModelResult) -> Result<FeatureReport> {
    let name = result.model_name.as_str();
    let predicciones = result
        .forecast
        .iter()
        .map(|p| finite("prediction", name, p.value))
        .collect::<Result<Vec<_>>>()?;

    Ok(FeatureReport {
        debug_info: DebugInfo {
            filas_validas: dataset.len(),
            columnas: dataset.columns().to_vec(),
            ejemplo_primera_fila: dataset.first_row(),
        },
        predicciones,
        error_porcentaje: finite(
            "error percentage",
            name,
            round2(result.metrics.relative.value()),
        )?,
    })
}
