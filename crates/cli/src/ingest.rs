//! Input files: sales CSV for weekly mode, JSON request for feature mode.

use std::fs::{self, File};
use std::io::{BufReader, Read};
use std::path::Path;

use chrono::NaiveDateTime;
use common::{ForecastError, Result, TimeSeriesPoint};
use predictor::FeatureRequest;
use tracing::{debug, info};

pub const DATE_COLUMN: &str = "Fecha";
pub const QUANTITY_COLUMN: &str = "Cantidad";
pub const DATE_FORMAT: &str = "%d/%m/%Y %H:%M";

/// Read dated quantities from a sales CSV.
pub fn read_sales_csv(path: &Path) -> Result<Vec<TimeSeriesPoint>> {
    let file = File::open(path)?;
    let records = parse_sales_csv(BufReader::new(file))?;
    info!(path = %path.display(), records = records.len(), "Sales CSV loaded");
    Ok(records)
}

/// Parse a sales CSV with `Fecha` and `Cantidad` columns.
///
/// Rows whose date or quantity cannot be read are dropped.
pub fn parse_sales_csv<R: Read>(reader: R) -> Result<Vec<TimeSeriesPoint>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| ForecastError::InputFormat(format!("cannot read CSV header: {e}")))?
        .clone();
    let column = |name: &str| {
        headers
            .iter()
            .position(|h| h.trim_start_matches('\u{feff}') == name)
    };
    let (Some(date_idx), Some(qty_idx)) = (column(DATE_COLUMN), column(QUANTITY_COLUMN)) else {
        return Err(ForecastError::InputFormat(format!(
            "CSV must contain columns '{DATE_COLUMN}' and '{QUANTITY_COLUMN}'"
        )));
    };

    let mut records = Vec::new();
    let mut dropped = 0usize;
    for (line, row) in reader.records().enumerate() {
        let row = row.map_err(|e| ForecastError::InputFormat(format!("cannot read CSV row: {e}")))?;
        let timestamp = row.get(date_idx).and_then(parse_fecha);
        let quantity = row.get(qty_idx).and_then(extract_quantity);
        match (timestamp, quantity) {
            (Some(timestamp), Some(quantity)) => {
                records.push(TimeSeriesPoint::new(timestamp, quantity))
            }
            _ => {
                dropped += 1;
                debug!(row = line + 1, "Row dropped: unreadable date or quantity");
            }
        }
    }

    debug!(kept = records.len(), dropped, "Sales rows parsed");
    Ok(records)
}

/// Parse a `DD/MM/YYYY HH:MM` timestamp.
pub fn parse_fecha(raw: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw.trim(), DATE_FORMAT).ok()
}

/// First number embedded in `raw`: digits, optionally followed by one `.` or
/// `,` and more digits. A decimal comma is read as a point.
pub fn extract_quantity(raw: &str) -> Option<f64> {
    let bytes = raw.as_bytes();
    let start = bytes.iter().position(u8::is_ascii_digit)?;
    let digits_end = |from: usize| {
        bytes[from..]
            .iter()
            .position(|b| !b.is_ascii_digit())
            .map_or(bytes.len(), |p| from + p)
    };

    let mut end = digits_end(start);
    if end + 1 < bytes.len()
        && matches!(bytes[end], b'.' | b',')
        && bytes[end + 1].is_ascii_digit()
    {
        end = digits_end(end + 1);
    }

    raw[start..end].replace(',', ".").parse().ok()
}

/// Read a feature-mode request document.
pub fn read_feature_request(path: &Path) -> Result<FeatureRequest> {
    let text = fs::read_to_string(path)?;
    let request = FeatureRequest::parse(&text)?;
    info!(
        path = %path.display(),
        rows = request.data.len(),
        "Feature request loaded"
    );
    Ok(request)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_extract_quantity() {
        assert_eq!(extract_quantity("12"), Some(12.0));
        assert_eq!(extract_quantity("12,5 kg"), Some(12.5));
        assert_eq!(extract_quantity("Total: 7"), Some(7.0));
        assert_eq!(extract_quantity("1.234,5"), Some(1.234));
        assert_eq!(extract_quantity("3."), Some(3.0));
        assert_eq!(extract_quantity("x 4,y"), Some(4.0));
        assert_eq!(extract_quantity("n/a"), None);
        assert_eq!(extract_quantity(""), None);
    }

    #[test]
    fn test_parse_fecha() {
        let ts = parse_fecha("05/02/2024 13:45").unwrap();
        assert_eq!(ts.to_string(), "2024-02-05 13:45:00");
        assert!(parse_fecha("2024-02-05 13:45").is_none());
        assert!(parse_fecha("31/02/2024 10:00").is_none());
    }

    #[test]
    fn test_parse_sales_csv_drops_bad_rows() {
        let csv = "Cliente,Fecha,Cantidad\n\
                   ACME,01/01/2024 10:00,5 u\n\
                   \n\
                   ACME,not a date,3\n\
                   Otro,02/01/2024 11:30,\"2,5\"\n\
                   Otro,03/01/2024 09:00,none\n";
        let records = parse_sales_csv(csv.as_bytes()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].quantity, 5.0);
        assert_eq!(records[1].quantity, 2.5);
        assert_eq!(records[1].timestamp.to_string(), "2024-01-02 11:30:00");
    }

    #[test]
    fn test_parse_sales_csv_requires_columns() {
        let err = parse_sales_csv("Fecha,Qty\n01/01/2024 10:00,1\n".as_bytes()).unwrap_err();
        assert!(matches!(err, ForecastError::InputFormat(ref m) if m.contains("'Cantidad'")));
    }

    #[test]
    fn test_read_sales_csv_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "Fecha,Cantidad").unwrap();
        writeln!(file, "08/01/2024 08:00,10").unwrap();
        writeln!(file, "09/01/2024 08:00,1,5").unwrap();
        file.flush().unwrap();

        let records = read_sales_csv(file.path()).unwrap();
        assert_eq!(records.len(), 2);
        // Unquoted decimal comma splits the field; the integer part survives
        assert_eq!(records[1].quantity, 1.0);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = read_sales_csv(Path::new("/nonexistent/ventas.csv")).unwrap_err();
        assert!(matches!(err, ForecastError::Io(_)));
    }

    #[test]
    fn test_read_feature_request() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"data": [{{"x": 1, "y": 2}}], "target": "y", "features": ["x"], "modelo": "rf"}}"#
        )
        .unwrap();
        file.flush().unwrap();

        let request = read_feature_request(file.path()).unwrap();
        assert_eq!(request.data.len(), 1);
        assert_eq!(request.modelo, "rf");
    }
}
