use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur during model fitting and prediction
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Normal equations matrix is singular")]
    SingularMatrix,

    #[error("Dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("Need at least {needed} examples to fit {nvars} variables, got {got}")]
    InsufficientExamples {
        needed: usize,
        nvars: usize,
        got: usize,
    },
}

/// Ordinary least squares linear regression: a weight per input variable plus
/// an intercept, fit by minimizing squared error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearModel {
    pub coefficients: Vec<f64>,
    pub intercept: f64,
    pub nvars: usize,
}

impl LinearModel {
    /// Fit by solving the normal equations X'X beta = X'y with an intercept
    /// column, using a Cholesky factorization of X'X.
    ///
    /// `x` is row-major: example i occupies `x[i * nvars .. (i + 1) * nvars]`.
    pub fn fit(x: &[f64], y: &[f64], nvars: usize) -> Result<Self, ModelError> {
        let ncases = y.len();

        if x.len() != ncases * nvars {
            return Err(ModelError::DimensionMismatch {
                expected: ncases * nvars,
                got: x.len(),
            });
        }

        if ncases <= nvars {
            return Err(ModelError::InsufficientExamples {
                needed: nvars + 1,
                nvars,
                got: ncases,
            });
        }

        // Design matrix has the intercept as column 0.
        let dim = nvars + 1;
        let mut xtx = vec![0.0; dim * dim];
        let mut xty = vec![0.0; dim];

        for case in 0..ncases {
            let row = &x[case * nvars..(case + 1) * nvars];
            xtx[0] += 1.0;
            xty[0] += y[case];
            for i in 0..nvars {
                xtx[i + 1] += row[i];
                xtx[(i + 1) * dim] += row[i];
                xty[i + 1] += row[i] * y[case];
                for j in 0..nvars {
                    xtx[(i + 1) * dim + j + 1] += row[i] * row[j];
                }
            }
        }

        // Tiny diagonal loading keeps the factorization stable when columns
        // are nearly collinear.
        for i in 0..dim {
            xtx[i * dim + i] += 1e-10;
        }

        let beta = cholesky_solve(&xtx, &xty, dim)?;

        Ok(LinearModel {
            intercept: beta[0],
            coefficients: beta[1..].to_vec(),
            nvars,
        })
    }

    /// Predict a single example.
    pub fn predict(&self, example: &[f64]) -> Result<f64, ModelError> {
        if example.len() != self.nvars {
            return Err(ModelError::DimensionMismatch {
                expected: self.nvars,
                got: example.len(),
            });
        }

        let dot: f64 = self
            .coefficients
            .iter()
            .zip(example.iter())
            .map(|(&c, &v)| c * v)
            .sum();

        Ok(self.intercept + dot)
    }

    /// Predict every example in a row-major batch.
    pub fn predict_batch(&self, x: &[f64]) -> Result<Vec<f64>, ModelError> {
        if x.len() % self.nvars != 0 {
            return Err(ModelError::DimensionMismatch {
                expected: self.nvars,
                got: x.len() % self.nvars,
            });
        }

        x.chunks(self.nvars).map(|row| self.predict(row)).collect()
    }
}

/// Solve A x = b for symmetric positive definite A (row-major, dim x dim)
/// via Cholesky factorization with forward and backward substitution.
fn cholesky_solve(a: &[f64], b: &[f64], dim: usize) -> Result<Vec<f64>, ModelError> {
    let mut l = vec![0.0; dim * dim];

    for i in 0..dim {
        for j in 0..=i {
            let mut sum = 0.0;
            for k in 0..j {
                sum += l[i * dim + k] * l[j * dim + k];
            }

            if i == j {
                let diag = a[i * dim + i] - sum;
                if diag <= 0.0 {
                    return Err(ModelError::SingularMatrix);
                }
                l[i * dim + j] = diag.sqrt();
            } else {
                l[i * dim + j] = (a[i * dim + j] - sum) / l[j * dim + j];
            }
        }
    }

    // L z = b
    let mut z = vec![0.0; dim];
    for i in 0..dim {
        let mut sum = 0.0;
        for j in 0..i {
            sum += l[i * dim + j] * z[j];
        }
        z[i] = (b[i] - sum) / l[i * dim + i];
    }

    // L' x = z
    let mut x = vec![0.0; dim];
    for i in (0..dim).rev() {
        let mut sum = 0.0;
        for j in (i + 1)..dim {
            sum += l[j * dim + i] * x[j];
        }
        x[i] = (z[i] - sum) / l[i * dim + i];
    }

    Ok(x)
}
