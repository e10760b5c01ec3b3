//! Ordinary least squares for the regression-with-errors forecast path.

use crate::core::ExogMatrix;
use crate::error::{ForecastError, Result};

/// Fitted linear model `y = intercept + X * coefficients`.
#[derive(Debug, Clone)]
pub struct OlsFit {
    pub intercept: f64,
    pub coefficients: Vec<f64>,
}

impl OlsFit {
    /// Evaluate the fitted model row by row.
    pub fn predict(&self, x: &ExogMatrix) -> Vec<f64> {
        (0..x.len())
            .map(|t| {
                let mut value = self.intercept;
                for (beta, column) in self.coefficients.iter().zip(x.columns()) {
                    value += beta * column[t];
                }
                value
            })
            .collect()
    }
}

/// Fit `y ~ 1 + X` by solving the normal equations.
pub fn ols_fit(y: &[f64], x: &ExogMatrix) -> Result<OlsFit> {
    if y.is_empty() {
        return Err(ForecastError::EmptyData);
    }
    if x.len() != y.len() {
        return Err(ForecastError::DimensionMismatch {
            expected: y.len(),
            got: x.len(),
        });
    }

    let n = y.len();
    let k = x.width() + 1;

    // Design matrix X'X and X'y with an implicit intercept column of ones.
    let columns = x.columns();
    let design_col = |j: usize, t: usize| -> f64 {
        if j == 0 {
            1.0
        } else {
            columns[j - 1][t]
        }
    };

    let mut xtx = vec![vec![0.0; k]; k];
    let mut xty = vec![0.0; k];
    for t in 0..n {
        for i in 0..k {
            let xi = design_col(i, t);
            xty[i] += xi * y[t];
            for j in i..k {
                xtx[i][j] += xi * design_col(j, t);
            }
        }
    }
    for i in 0..k {
        for j in 0..i {
            xtx[i][j] = xtx[j][i];
        }
    }

    // A small ridge keeps the system solvable when covariates are collinear.
    for (i, row) in xtx.iter_mut().enumerate() {
        row[i] += 1e-8;
    }

    let beta = solve(&mut xtx, &mut xty)
        .ok_or_else(|| ForecastError::ComputationError("singular normal equations".into()))?;

    Ok(OlsFit {
        intercept: beta[0],
        coefficients: beta[1..].to_vec(),
    })
}

/// Gaussian elimination with partial pivoting. Consumes its inputs.
fn solve(a: &mut [Vec<f64>], b: &mut [f64]) -> Option<Vec<f64>> {
    let n = b.len();
    for col in 0..n {
        let pivot = (col..n)
            .max_by(|&i, &j| {
                a[i][col]
                    .abs()
                    .partial_cmp(&a[j][col].abs())
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .unwrap_or(col);
        if a[pivot][col].abs() < 1e-12 {
            return None;
        }
        a.swap(col, pivot);
        b.swap(col, pivot);

        for row in (col + 1)..n {
            let factor = a[row][col] / a[col][col];
            for j in col..n {
                a[row][j] -= factor * a[col][j];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut x = vec![0.0; n];
    for col in (0..n).rev() {
        let mut sum = b[col];
        for j in (col + 1)..n {
            sum -= a[col][j] * x[j];
        }
        x[col] = sum / a[col][col];
    }
    Some(x)
}
