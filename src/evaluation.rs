use anyhow::Result;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use crate::codegen::scaled_coefficients;
use crate::config::Config;
use crate::model::LinearModel;

/// Evaluation results on the held-out partition
#[derive(Debug)]
pub struct EvaluationResult {
    /// Coefficient of determination on held-out data
    pub r_squared: f64,
    /// Number of held-out examples
    pub n_test: usize,
}

/// Coefficient of determination: R² = 1 - SS_res / SS_tot.
///
/// A zero-variance target (all-constant labels) has no explainable variance;
/// R² is defined as 0.0 in that case.
pub fn r_squared(y_true: &[f64], y_pred: &[f64]) -> f64 {
    let n = y_true.len() as f64;
    let y_mean = y_true.iter().sum::<f64>() / n;

    let ss_res: f64 = y_true
        .iter()
        .zip(y_pred.iter())
        .map(|(&t, &p)| (t - p) * (t - p))
        .sum();

    let ss_tot: f64 = y_true.iter().map(|&t| (t - y_mean) * (t - y_mean)).sum();

    if ss_tot < 1e-10 {
        return 0.0;
    }

    1.0 - ss_res / ss_tot
}

/// Evaluate the fitted model on the held-out partition
pub fn evaluate_model(
    model: &LinearModel,
    test_x: &[f64],
    test_y: &[f64],
) -> Result<EvaluationResult> {
    println!("Evaluating on test set...");

    let predictions = model.predict_batch(test_x)?;
    let r2 = r_squared(test_y, &predictions);

    println!("Model R^2 score on test data: {:.6}", r2);

    Ok(EvaluationResult {
        r_squared: r2,
        n_test: test_y.len(),
    })
}

/// Write the fit summary to the results file
pub fn write_results<P: AsRef<Path>>(
    path: P,
    config: &Config,
    model: &LinearModel,
    evaluation: &EvaluationResult,
    n_train: usize,
) -> Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(path.as_ref())?;

    writeln!(file, "TICK_VOL_MODEL - Next-Step Volatility Regression")?;
    writeln!(file, "{}", "=".repeat(60))?;
    writeln!(file)?;

    writeln!(file, "Configuration:")?;
    writeln!(file, "  Data file: {}", config.data_file.display())?;
    writeln!(file, "  Cache file: {}", config.cache_file.display())?;
    writeln!(file, "  Window size: {}", config.window_size)?;
    writeln!(file, "  Test fraction: {:.2}", config.test_fraction)?;
    writeln!(file, "  Shuffle seed: {}", config.seed)?;
    writeln!(file)?;

    writeln!(file, "Dataset:")?;
    writeln!(file, "  Training cases: {}", n_train)?;
    writeln!(file, "  Test cases: {}", evaluation.n_test)?;
    writeln!(file)?;

    writeln!(file, "Held-out R^2: {:.6}", evaluation.r_squared)?;
    writeln!(file)?;

    writeln!(file, "Coefficients (lag: oldest to newest | fixed-point):")?;
    writeln!(file, "  Intercept: {:12.6}", model.intercept)?;
    let scaled = scaled_coefficients(model);
    for (i, (&coef, &fp)) in model.coefficients.iter().zip(scaled.iter()).enumerate() {
        writeln!(file, "  Lag {:3}: {:12.6} {:>12}", i, coef, fp)?;
    }

    println!("\nResults written to {}", path.as_ref().display());
    Ok(())
}
