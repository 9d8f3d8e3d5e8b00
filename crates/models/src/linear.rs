use common::{ForecastError, Regressor, Result};
use tracing::debug;

use crate::{not_fitted, validate_rows, validate_training};

/// Diagonal ridge added to the normal equations for numerical stability.
const RIDGE: f64 = 1e-8;

/// Ordinary least squares with intercept.
///
/// Fitted on centered data, so a rank-deficient design (e.g. a single
/// training row) resolves to zero slopes and an intercept equal to the mean
/// target.
#[derive(Debug, Clone, Default)]
pub struct LinearRegression {
    coefficients: Vec<f64>,
    intercept: f64,
    fitted: bool,
}

impl LinearRegression {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }
}

impl Regressor for LinearRegression {
    fn name(&self) -> &str {
        "LR"
    }

    fn fit(&mut self, x: &[Vec<f64>], y: &[f64]) -> Result<()> {
        let k = validate_training(self.name(), x, y)?;
        let n = x.len() as f64;

        let x_mean: Vec<f64> = (0..k)
            .map(|j| x.iter().map(|row| row[j]).sum::<f64>() / n)
            .collect();
        let y_mean = y.iter().sum::<f64>() / n;

        let mut xtx = vec![vec![0.0; k]; k];
        let mut xty = vec![0.0; k];
        for (row, &target) in x.iter().zip(y) {
            let yc = target - y_mean;
            for i in 0..k {
                let xi = row[i] - x_mean[i];
                xty[i] += xi * yc;
                for j in 0..k {
                    xtx[i][j] += xi * (row[j] - x_mean[j]);
                }
            }
        }
        for (i, row) in xtx.iter_mut().enumerate() {
            row[i] += RIDGE;
        }

        let coefficients = solve_symmetric(&xtx, &xty).ok_or_else(|| {
            ForecastError::model_fitting(self.name(), "normal equations are not positive definite")
        })?;
        let intercept = y_mean
            - coefficients
                .iter()
                .zip(&x_mean)
                .map(|(c, m)| c * m)
                .sum::<f64>();

        debug!(coefficients = ?coefficients, intercept = intercept, "Linear regression fitted");

        self.coefficients = coefficients;
        self.intercept = intercept;
        self.fitted = true;
        Ok(())
    }

    fn predict(&self, x: &[Vec<f64>]) -> Result<Vec<f64>> {
        if !self.fitted {
            return Err(not_fitted(self.name()));
        }
        validate_rows(self.name(), x, self.coefficients.len())?;
        Ok(x.iter()
            .map(|row| {
                self.intercept
                    + row
                        .iter()
                        .zip(&self.coefficients)
                        .map(|(v, c)| v * c)
                        .sum::<f64>()
            })
            .collect())
    }
}

/// Solve `A x = b` for symmetric positive definite `A` via Cholesky.
fn solve_symmetric(a: &[Vec<f64>], b: &[f64]) -> Option<Vec<f64>> {
    let n = b.len();
    if n == 0 || a.len() != n {
        return None;
    }

    let mut l = vec![vec![0.0; n]; n];
    for i in 0..n {
        for j in 0..=i {
            let mut sum = a[i][j];
            for k in 0..j {
                sum -= l[i][k] * l[j][k];
            }
            if i == j {
                if sum <= 0.0 {
                    return None;
                }
                l[i][j] = sum.sqrt();
            } else {
                l[i][j] = sum / l[j][j];
            }
        }
    }

    // L y = b
    let mut y = vec![0.0; n];
    for i in 0..n {
        let mut sum = b[i];
        for j in 0..i {
            sum -= l[i][j] * y[j];
        }
        y[i] = sum / l[i][i];
    }

    // L' x = y
    let mut x = vec![0.0; n];
    for i in (0..n).rev() {
        let mut sum = y[i];
        for j in (i + 1)..n {
            sum -= l[j][i] * x[j];
        }
        x[i] = sum / l[i][i];
    }

    Some(x)
}
