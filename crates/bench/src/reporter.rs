use crate::backtester::BacktestResult;

fn fmt_metric(value: f64, precision: usize) -> String {
    if value.is_finite() {
        format!("{value:.precision$}")
    } else {
        "Inf".to_string()
    }
}

/// Print a formatted table of backtest results to stdout.
pub fn print_report(results: &[BacktestResult]) {
    if results.is_empty() {
        println!("No results to report.");
        return;
    }

    println!(
        "{:<18} {:<12} {:>9} {:>9} {:>7} {:>9} {:>8} {:>7} {:>8}",
        "Fixture", "Model", "hold MAE", "hold MAPE", "R2", "MAE", "sMAPE%", "MASE", "WAPE%"
    );
    println!("{}", "-".repeat(98));

    let mut current_fixture = "";
    for r in results {
        if r.fixture_name != current_fixture {
            if !current_fixture.is_empty() {
                println!("{}", "-".repeat(98));
            }
            current_fixture = r.fixture_name.as_str();
        }

        let (hold_mae, hold_mape, r2) = match &r.holdout {
            Some(m) => (
                fmt_metric(m.mae, 2),
                fmt_metric(m.relative.value(), 2),
                m.r2.map_or("-".to_string(), |v| fmt_metric(v, 2)),
            ),
            None => ("-".to_string(), "-".to_string(), "-".to_string()),
        };

        println!(
            "{:<18} {:<12} {:>9} {:>9} {:>7} {:>9.2} {:>8.2} {:>7} {:>8}",
            r.fixture_name,
            r.model_name,
            hold_mae,
            hold_mape,
            r2,
            r.future.mae,
            r.future.smape,
            fmt_metric(r.future.mase, 3),
            fmt_metric(r.future.wape, 2),
        );
    }
    println!("{}", "-".repeat(98));

    println!("\n=== Average holdout MAPE by Model ===");
    for (model, avg, used, total) in average_by_model(results, |r| {
        r.holdout.map(|m| m.relative.value())
    }) {
        println!("  {model:<12} avg MAPE = {avg:.2}  ({used}/{total} fixtures)");
    }

    println!("\n=== Average future MASE by Model ===");
    for (model, avg, used, total) in average_by_model(results, |r| Some(r.future.mase)) {
        println!("  {model:<12} avg MASE = {avg:.3}  ({used}/{total} fixtures)");
    }
}

/// Per-model mean of the finite values `metric` yields, in first-seen order:
/// (model, mean, finite count, result count).
pub fn average_by_model<F>(results: &[BacktestResult], metric: F) -> Vec<(String, f64, usize, usize)>
where
    F: Fn(&BacktestResult) -> Option<f64>,
{
    collect_model_names(results)
        .into_iter()
        .filter_map(|model| {
            let of_model: Vec<&BacktestResult> =
                results.iter().filter(|r| r.model_name == model).collect();
            let values: Vec<f64> = of_model
                .iter()
                .filter_map(|r| metric(r))
                .filter(|v| v.is_finite())
                .collect();
            if values.is_empty() {
                return None;
            }
            let avg = values.iter().sum::<f64>() / values.len() as f64;
            Some((model, avg, values.len(), of_model.len()))
        })
        .collect()
}

fn collect_model_names(results: &[BacktestResult]) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for r in results {
        if !names.contains(&r.model_name) {
            names.push(r.model_name.clone());
        }
    }
    names
}
