use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use common::{AppConfig, ForecastError};
use demand_forecast::{emit_error, init_tracing, read_sales_csv, run};
use predictor::run_weekly;

/// Weekly demand forecast from a sales CSV.
#[derive(Parser, Debug)]
#[command(
    name = "weekly-forecast",
    disable_help_flag = true,
    disable_version_flag = true
)]
struct Args {
    /// CSV file with `Fecha` (DD/MM/YYYY HH:MM) and `Cantidad` columns
    #[arg(allow_hyphen_values = true)]
    input: PathBuf,
}

fn main() -> ExitCode {
    init_tracing();

    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(_) => {
            return emit_error(
                &ForecastError::Usage("weekly-forecast <file.csv>".into()),
                false,
            )
        }
    };

    run(
        || {
            let config = AppConfig::from_env()?;
            let records = read_sales_csv(&args.input)?;
            run_weekly(&records, &config)
        },
        |_| true,
    )
}
