//! Feature-mode request parsing and row cleaning.

use std::collections::BTreeSet;

use common::{FeatureConfig, ForecastError, ModelKind, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info};

const REQUIRED_KEYS: [&str; 4] = ["data", "target", "features", "modelo"];

/// Feature-mode input document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRequest {
    pub data: Vec<Map<String, Value>>,
    pub target: String,
    pub features: Vec<String>,
    pub modelo: String,
    /// Equality filter on the client column; any JSON scalar.
    #[serde(default)]
    pub cliente: Option<Value>,
    #[serde(default)]
    pub producto: Option<Value>,
}

impl FeatureRequest {
    /// Parse a request from JSON text.
    pub fn parse(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)
            .map_err(|e| ForecastError::InputFormat(format!("invalid JSON document: {e}")))?;
        Self::from_value(value)
    }

    /// Check required keys, deserialize, and trim column names.
    pub fn from_value(value: Value) -> Result<Self> {
        let Value::Object(object) = &value else {
            return Err(ForecastError::InputFormat(
                "request must be a JSON object".into(),
            ));
        };
        let missing: Vec<&str> = REQUIRED_KEYS
            .into_iter()
            .filter(|k| !object.contains_key(*k))
            .collect();
        if !missing.is_empty() {
            return Err(ForecastError::InputFormat(format!(
                "missing required keys: {missing:?}"
            )));
        }

        let mut request: FeatureRequest = serde_json::from_value(value)
            .map_err(|e| ForecastError::InputFormat(format!("malformed request: {e}")))?;
        request.target = request.target.trim().to_string();
        request.features = request
            .features
            .iter()
            .map(|f| f.trim().to_string())
            .collect();
        Ok(request)
    }

    /// Model variant named by `modelo`, case-insensitive.
    pub fn model_kind(&self) -> Result<ModelKind> {
        self.modelo.parse()
    }
}

/// Cleaned numeric table: feature rows and their targets.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    columns: Vec<String>,
    rows: Vec<Vec<f64>>,
    targets: Vec<f64>,
}

impl Dataset {
    /// Filter, validate and coerce the request rows.
    ///
    /// Rows where the target or any feature is not numeric are dropped.
    /// Fails when fewer than `config.min_rows` rows survive.
    pub fn from_request(request: &FeatureRequest, config: &FeatureConfig) -> Result<Self> {
        if request.features.is_empty() {
            return Err(ForecastError::InputFormat(
                "features must name at least one column".into(),
            ));
        }

        let known: BTreeSet<&str> = request
            .data
            .iter()
            .flat_map(|row| row.keys().map(String::as_str))
            .collect();

        let mut selected: Vec<&Map<String, Value>> = request.data.iter().collect();
        let filters = [
            (config.client_column.as_str(), request.cliente.as_ref()),
            (config.product_column.as_str(), request.producto.as_ref()),
        ];
        for (column, wanted) in filters {
            let Some(wanted) = wanted.filter(|w| is_active_filter(w)) else {
                continue;
            };
            if !known.contains(column) {
                debug!(column, "Filter column absent, filter ignored");
                continue;
            }
            selected.retain(|row| cell_matches(row.get(column), wanted));
            debug!(column, value = %wanted, remaining = selected.len(), "Filter applied");
        }

        if !known.contains(request.target.as_str()) {
            return Err(ForecastError::ColumnNotFound(format!(
                "target column '{}' does not exist in the data",
                request.target
            )));
        }
        if let Some(missing) = request
            .features
            .iter()
            .find(|f| !known.contains(f.as_str()))
        {
            return Err(ForecastError::ColumnNotFound(format!(
                "feature column '{missing}' does not exist in the data"
            )));
        }

        let mut rows = Vec::with_capacity(selected.len());
        let mut targets = Vec::with_capacity(selected.len());
        for row in &selected {
            let Some(target) = numeric_cell(row.get(&request.target)) else {
                continue;
            };
            let features: Option<Vec<f64>> = request
                .features
                .iter()
                .map(|f| numeric_cell(row.get(f)))
                .collect();
            if let Some(features) = features {
                rows.push(features);
                targets.push(target);
            }
        }

        info!(
            input_rows = request.data.len(),
            filtered_rows = selected.len(),
            valid_rows = rows.len(),
            "Feature dataset cleaned"
        );

        if rows.len() < config.min_rows {
            return Err(ForecastError::InsufficientHistory(format!(
                "at least {} valid rows are required for training, got {}",
                config.min_rows,
                rows.len()
            )));
        }

        Ok(Self {
            columns: request.features.clone(),
            rows,
            targets,
        })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    pub fn targets(&self) -> &[f64] {
        &self.targets
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Mean of each feature column over all cleaned rows.
    pub fn column_means(&self) -> Vec<f64> {
        let n = self.rows.len() as f64;
        (0..self.columns.len())
            .map(|j| self.rows.iter().map(|row| row[j]).sum::<f64>() / n)
            .collect()
    }

    /// First cleaned row as a column → value object.
    pub fn first_row(&self) -> Map<String, Value> {
        let Some(row) = self.rows.first() else {
            return Map::new();
        };
        self.columns
            .iter()
            .zip(row)
            .map(|(column, &value)| (column.clone(), Value::from(value)))
            .collect()
    }
}

/// Numbers as-is, strings parsed after trimming; anything else is missing.
fn numeric_cell(cell: Option<&Value>) -> Option<f64> {
    let value = match cell? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    value.filter(|v| v.is_finite())
}

/// Null, `false`, zero and empty values disable a filter.
fn is_active_filter(wanted: &Value) -> bool {
    match wanted {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|v| v != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// Numbers compare by value, so `3` matches `3.0`; other values must be equal.
fn cell_matches(cell: Option<&Value>, wanted: &Value) -> bool {
    match (cell, wanted) {
        (Some(Value::Number(a)), Value::Number(b)) => a.as_f64() == b.as_f64(),
        (Some(cell), wanted) => cell == wanted,
        (None, _) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(data: Value) -> FeatureRequest {
        FeatureRequest::from_value(json!({
            "data": data,
            "target": " ventas ",
            "features": ["precio", " stock"],
            "modelo": "LR",
        }))
        .unwrap()
    }

    fn rows(n: usize) -> Vec<Value> {
        (0..n)
            .map(|i| json!({"precio": i, "stock": format!("{}", i * 2), "ventas": 10 + i}))
            .collect()
    }

    #[test]
    fn test_missing_keys_listed() {
        let err = FeatureRequest::from_value(json!({"data": [], "target": "y"})).unwrap_err();
        match err {
            ForecastError::InputFormat(msg) => {
                assert!(msg.contains("features") && msg.contains("modelo"), "{msg}");
                assert!(!msg.contains("target"));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_names_trimmed_and_model_resolved() {
        let req = request(json!([]));
        assert_eq!(req.target, "ventas");
        assert_eq!(req.features, vec!["precio", "stock"]);
        assert_eq!(req.model_kind().unwrap(), ModelKind::LinearRegression);
    }

    #[test]
    fn test_unsupported_model() {
        let mut req = request(json!([]));
        req.modelo = "svm".into();
        assert!(matches!(
            req.model_kind(),
            Err(ForecastError::UnsupportedModel(_))
        ));
    }

    #[test]
    fn test_invalid_json_is_input_format() {
        assert!(matches!(
            FeatureRequest::parse("{not json"),
            Err(ForecastError::InputFormat(_))
        ));
        assert!(matches!(
            FeatureRequest::parse("[1, 2]"),
            Err(ForecastError::InputFormat(_))
        ));
    }

    #[test]
    fn test_cleaning_drops_non_numeric_rows() {
        let mut data = rows(12);
        data.push(json!({"precio": "abc", "stock": 1, "ventas": 5}));
        data.push(json!({"precio": 1, "stock": null, "ventas": 5}));
        data.push(json!({"precio": 1, "stock": 2}));
        data.push(json!({"precio": true, "stock": 2, "ventas": 5}));
        let dataset = Dataset::from_request(&request(Value::Array(data)), &FeatureConfig::default())
            .unwrap();

        assert_eq!(dataset.len(), 12);
        assert_eq!(dataset.rows()[3], vec![3.0, 6.0]);
        assert_eq!(dataset.targets()[3], 13.0);
    }

    #[test]
    fn test_too_few_valid_rows() {
        let err = Dataset::from_request(&request(Value::Array(rows(9))), &FeatureConfig::default())
            .unwrap_err();
        assert!(matches!(err, ForecastError::InsufficientHistory(_)));
    }

    #[test]
    fn test_missing_columns() {
        let data = json!([{"precio": 1, "ventas": 2}]);
        let err = Dataset::from_request(&request(data), &FeatureConfig::default()).unwrap_err();
        assert!(matches!(err, ForecastError::ColumnNotFound(ref m) if m.contains("'stock'")));

        let data = json!([{"precio": 1, "stock": 2}]);
        let err = Dataset::from_request(&request(data), &FeatureConfig::default()).unwrap_err();
        assert!(matches!(err, ForecastError::ColumnNotFound(ref m) if m.contains("'ventas'")));
    }

    #[test]
    fn test_client_and_product_filters() {
        let mut data = Vec::new();
        for i in 0..30 {
            let client = if i % 3 == 0 { "ACME" } else { "Otro" };
            let product = if i % 2 == 0 { "Tornillo" } else { "Tuerca" };
            data.push(json!({
                "Nombre del cliente": client,
                "Producto": product,
                "precio": i,
                "stock": i,
                "ventas": i,
            }));
        }
        let mut req = request(Value::Array(data));

        req.cliente = Some(json!("ACME"));
        let dataset = Dataset::from_request(&req, &FeatureConfig::default()).unwrap();
        assert_eq!(dataset.len(), 10);

        req.producto = Some(json!("Tornillo"));
        let err = Dataset::from_request(&req, &FeatureConfig::default()).unwrap_err();
        assert!(matches!(err, ForecastError::InsufficientHistory(_)));

        // Empty filter values are ignored
        req.cliente = Some(json!(""));
        req.producto = None;
        let dataset = Dataset::from_request(&req, &FeatureConfig::default()).unwrap();
        assert_eq!(dataset.len(), 30);
    }

    #[test]
    fn test_numeric_client_filter() {
        let data: Vec<Value> = (0..24)
            .map(|i| {
                let client = if i % 2 == 0 { json!(123) } else { json!("123") };
                json!({
                    "Nombre del cliente": client,
                    "precio": i,
                    "stock": i,
                    "ventas": i,
                })
            })
            .collect();
        let req = FeatureRequest::from_value(json!({
            "data": data,
            "target": "ventas",
            "features": ["precio", "stock"],
            "modelo": "lr",
            "cliente": 123.0,
        }))
        .unwrap();

        // Only numeric cells equal the numeric filter
        let dataset = Dataset::from_request(&req, &FeatureConfig::default()).unwrap();
        assert_eq!(dataset.len(), 12);
        assert!(dataset.rows().iter().all(|r| r[0] as usize % 2 == 0));
    }

    #[test]
    fn test_falsy_filter_values_are_ignored() {
        for wanted in [json!(0), json!(false), json!(null), json!("")] {
            let mut req = request(Value::Array(rows(10)));
            req.cliente = Some(wanted.clone());
            let data: Vec<Map<String, Value>> = req
                .data
                .iter()
                .map(|r| {
                    let mut r = r.clone();
                    r.insert("Nombre del cliente".into(), json!("ACME"));
                    r
                })
                .collect();
            req.data = data;
            let dataset = Dataset::from_request(&req, &FeatureConfig::default()).unwrap();
            assert_eq!(dataset.len(), 10, "{wanted}");
        }
    }

    #[test]
    fn test_filter_on_absent_column_is_ignored() {
        let mut req = request(Value::Array(rows(10)));
        req.producto = Some(json!("Tornillo"));
        let dataset = Dataset::from_request(&req, &FeatureConfig::default()).unwrap();
        assert_eq!(dataset.len(), 10);
    }

    #[test]
    fn test_means_and_first_row() {
        let dataset =
            Dataset::from_request(&request(Value::Array(rows(10))), &FeatureConfig::default())
                .unwrap();
        assert_eq!(dataset.column_means(), vec![4.5, 9.0]);

        let first = dataset.first_row();
        let keys: Vec<_> = first.keys().cloned().collect();
        assert_eq!(keys, vec!["precio", "stock"]);
        assert_eq!(first["stock"], json!(0.0));
    }
}
