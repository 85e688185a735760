use anyhow::Result;

use crate::data::PreparedRow;

/// Fixed-point scale applied to the tick variation, matching the integer
/// constraint of the target contract.
pub const FIXED_POINT_SCALE: f64 = 10_000_000.0;

/// Derived volatility feature series, one value per retained row.
///
/// All vectors are aligned: index i of every field describes the same row of
/// the cleaned series. Rows whose rolling statistics or target are undefined
/// (the first window_size - 1 rows and the last row) are excluded.
#[derive(Debug, Clone)]
pub struct FeatureTable {
    pub abs_variation: Vec<f64>,
    pub rolling_mean: Vec<f64>,
    pub rolling_std: Vec<f64>,
    pub target: Vec<f64>,
}

impl FeatureTable {
    pub fn len(&self) -> usize {
        self.rolling_std.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rolling_std.is_empty()
    }
}

/// Derive the volatility feature set from the prepared rows.
///
/// The tick variation is scaled to fixed point and its magnitude taken, then
/// trailing rolling mean and sample standard deviation are computed over
/// `window_size` rows. The target is the next row's scaled absolute variation.
pub fn derive_features(rows: &[PreparedRow], window_size: usize) -> Result<FeatureTable> {
    if rows.len() <= window_size {
        anyhow::bail!(
            "Need more than {} rows for rolling statistics, got {}",
            window_size,
            rows.len()
        );
    }

    let abs_scaled: Vec<f64> = rows
        .iter()
        .map(|r| (r.tick_variation * FIXED_POINT_SCALE).abs())
        .collect();

    let n = abs_scaled.len();
    let n_kept = n - window_size;

    let mut abs_variation = Vec::with_capacity(n_kept);
    let mut rolling_mean = Vec::with_capacity(n_kept);
    let mut rolling_std = Vec::with_capacity(n_kept);
    let mut target = Vec::with_capacity(n_kept);

    // Rolling statistics are defined from index window_size - 1 on, the
    // target from one row before the end. Keep the intersection.
    for i in (window_size - 1)..(n - 1) {
        let window = &abs_scaled[i + 1 - window_size..=i];
        let (mean, std) = mean_and_sample_std(window);

        abs_variation.push(abs_scaled[i]);
        rolling_mean.push(mean);
        rolling_std.push(std);
        target.push(abs_scaled[i + 1]);
    }

    Ok(FeatureTable {
        abs_variation,
        rolling_mean,
        rolling_std,
        target,
    })
}

/// Mean and sample standard deviation (n - 1 denominator) of a window.
fn mean_and_sample_std(window: &[f64]) -> (f64, f64) {
    let n = window.len() as f64;
    let mean = window.iter().sum::<f64>() / n;
    let var = window.iter().map(|x| (x - mean) * (x - mean)).sum::<f64>() / (n - 1.0);
    (mean, var.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn make_rows(variations: &[f64]) -> Vec<PreparedRow> {
        let datetime = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();

        variations
            .iter()
            .map(|&v| PreparedRow {
                date: 20240101,
                datetime,
                close: 100.0,
                tick: 46052,
                tick_variation: v,
            })
            .collect()
    }

    #[test]
    fn test_feature_count() {
        let rows = make_rows(&vec![1e-7; 50]);
        let features = derive_features(&rows, 20).unwrap();
        assert_eq!(features.len(), 30);
        assert_eq!(features.target.len(), 30);
        assert_eq!(features.rolling_mean.len(), 30);
    }

    #[test]
    fn test_fixed_point_scaling() {
        let rows = make_rows(&vec![-2e-7; 10]);
        let features = derive_features(&rows, 5).unwrap();
        // |-2e-7 * 1e7| = 2
        assert!((features.abs_variation[0] - 2.0).abs() < 1e-10);
        assert!(features.abs_variation.iter().all(|&v| v >= 0.0));
    }

    #[test]
    fn test_target_is_next_value() {
        let variations: Vec<f64> = (0..12).map(|i| i as f64 * 1e-7).collect();
        let rows = make_rows(&variations);
        let features = derive_features(&rows, 5).unwrap();

        for i in 0..features.len() {
            assert!((features.target[i] - (features.abs_variation[i] + 1.0)).abs() < 1e-9);
        }
    }

    #[test]
    fn test_constant_series_has_zero_std() {
        let rows = make_rows(&vec![0.0; 40]);
        let features = derive_features(&rows, 20).unwrap();
        assert!(features.rolling_std.iter().all(|&s| s == 0.0));
        assert!(features.target.iter().all(|&t| t == 0.0));
    }

    #[test]
    fn test_sample_std_matches_known_value() {
        // Window [1, 2, 3, 4, 5]: mean 3, sample variance 2.5
        let (mean, std) = mean_and_sample_std(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        assert!((mean - 3.0).abs() < 1e-12);
        assert!((std - 2.5_f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_too_few_rows() {
        let rows = make_rows(&vec![0.0; 20]);
        assert!(derive_features(&rows, 20).is_err());
    }
}
