use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use common::{AppConfig, ForecastError};
use demand_forecast::{emit_error, init_tracing, read_feature_request, run};
use predictor::run_feature;

/// Row-level demand forecast from a JSON feature request.
#[derive(Parser, Debug)]
#[command(
    name = "feature-forecast",
    disable_help_flag = true,
    disable_version_flag = true
)]
struct Args {
    /// JSON file with `data`, `target`, `features` and `modelo`
    #[arg(allow_hyphen_values = true)]
    input: PathBuf,
}

fn main() -> ExitCode {
    init_tracing();

    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(_) => {
            return emit_error(
                &ForecastError::Usage("feature-forecast <file.json>".into()),
                false,
            )
        }
    };

    run(
        || {
            let config = AppConfig::from_env()?;
            let request = read_feature_request(&args.input)?;
            run_feature(&request, &config)
        },
        |err| matches!(err, ForecastError::ModelFitting { .. }),
    )
}
