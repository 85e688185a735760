use std::fmt::Write;

use crate::features::FIXED_POINT_SCALE;
use crate::model::LinearModel;

/// Scale a coefficient to fixed point and truncate toward zero, the encoding
/// the target contract expects. Truncation (not rounding) matches the
/// fractional precision silently dropped on the contract side.
pub fn scaled_coefficient(coef: f64) -> i64 {
    (coef * FIXED_POINT_SCALE).trunc() as i64
}

/// Fixed-point integer encoding of every model coefficient, in lag order.
pub fn scaled_coefficients(model: &LinearModel) -> Vec<i64> {
    model
        .coefficients
        .iter()
        .map(|&c| scaled_coefficient(c))
        .collect()
}

/// Render the fitted coefficients as a Stylus function-body snippet for
/// manual transcription into the contract's fixed-point I256 type.
pub fn stylus_snippet(model: &LinearModel) -> String {
    let mut out = String::new();

    out.push_str(
        "
    fn compute_forcast_volatility(
        &self,
        new_volatility: U256,
    ) -> Result<U256, Error> {\n",
    );

    out.push_str("\tlet coefficient: Vec<I256> = vec![\n");

    for fp in scaled_coefficients(model) {
        writeln!(out, "\t\t\"{}\".parse::<I256>().unwrap(),", fp).unwrap();
    }

    out.push_str("\t];\n");
    out.push_str("\t\n");

    // FIXME: emit the intercept and the dot-product body as well, so the
    // snippet can be pasted without hand-finishing the function.
    out.push_str("\t // FIXME:");

    out
}
