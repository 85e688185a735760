/// Convert a price to its tick index on the logarithmic price grid.
///
/// One tick is one basis point of price: tick = round(ln(price) / ln(1.0001)).
/// Undefined for non-positive prices; callers validate prices at ingest.
pub fn price_to_tick(price: f64) -> i64 {
    (price.ln() / 1.0001_f64.ln()).round() as i64
}

/// Compute the log-ratio variation between consecutive ticks.
///
/// Returns one value per input tick after the first: ln(tick[t] / tick[t-1]).
/// The first tick has no predecessor and contributes no value.
pub fn tick_variation(ticks: &[i64]) -> Vec<f64> {
    ticks
        .windows(2)
        .map(|w| (w[1] as f64 / w[0] as f64).ln())
        .collect()
}
