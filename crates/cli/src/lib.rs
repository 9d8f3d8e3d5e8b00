//! Process glue for the forecasting binaries: input files in, one JSON
//! document out.

pub mod ingest;
pub mod output;

pub use ingest::{
    extract_quantity, parse_fecha, parse_sales_csv, read_feature_request, read_sales_csv,
};
pub use output::{emit_error, emit_report, run};

use tracing_subscriber::EnvFilter;

/// Default log filter when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "warn";

/// Install the stderr log subscriber. Stdout is reserved for the report.
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
