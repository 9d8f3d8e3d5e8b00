use std::io::Write;
use std::process::ExitCode;

use common::{ForecastError, Result};
use predictor::ErrorReport;
use serde::Serialize;
use tracing::error;

/// Write one JSON document to stdout, followed by a newline.
pub fn emit_report<T: Serialize>(report: &T) -> Result<()> {
    let text = serde_json::to_string(report)?;
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{text}")?;
    stdout.flush()?;
    Ok(())
}

/// Write the error document to stdout and return the failure status.
pub fn emit_error(err: &ForecastError, with_traceback: bool) -> ExitCode {
    error!(kind = err.kind(), error = %err, "Run failed");
    let report = ErrorReport::from_error(err, with_traceback);
    if emit_report(&report).is_err() {
        // stdout is unavailable
        eprintln!("{}", err);
    }
    ExitCode::FAILURE
}

/// Run `job` and emit either its report or an error document.
///
/// `with_traceback` decides per error whether the chain is included.
pub fn run<T, F, P>(job: F, with_traceback: P) -> ExitCode
where
    T: Serialize,
    F: FnOnce() -> Result<T>,
    P: Fn(&ForecastError) -> bool,
{
    match job().and_then(|report| emit_report(&report)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => emit_error(&err, with_traceback(&err)),
    }
}
