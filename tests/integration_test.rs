use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

use tempfile::TempDir;

use tick_vol_model::codegen::scaled_coefficient;
use tick_vol_model::*;

fn write_price_file(dir: &TempDir, name: &str, prices: &[f64]) -> PathBuf {
    let path = dir.path().join(name);
    let mut file = File::create(&path).unwrap();

    writeln!(file, "date,time,open,high,low,close").unwrap();
    for (i, price) in prices.iter().enumerate() {
        let hour = (i / 4) % 24;
        let minute = (i % 4) * 15;
        writeln!(
            file,
            "20240101,{:02}:{:02},{},{},{},{}",
            hour,
            minute,
            price,
            price * 1.001,
            price * 0.999,
            price
        )
        .unwrap();
    }

    path
}

fn test_config(dir: &TempDir, data_file: PathBuf) -> Config {
    Config {
        data_file,
        cache_file: dir.path().join("data.csv"),
        output_file: dir.path().join("VOL_MODEL.LOG"),
        model_file: dir.path().join("vol_model.json"),
        window_size: 20,
        test_fraction: 0.2,
        seed: 42,
    }
}

fn oscillating_prices(n: usize) -> Vec<f64> {
    // Deterministic synthetic series with enough tick movement for a
    // non-degenerate volatility target.
    (0..n)
        .map(|i| 2000.0 * (1.0 + 0.01 * (i as f64 * 0.7).sin()))
        .collect()
}

#[test]
fn test_full_pipeline() {
    let dir = TempDir::new().unwrap();
    let data_file = write_price_file(&dir, "prices.csv", &oscillating_prices(400));
    let config = test_config(&dir, data_file);

    let rows = load_or_prepare(&config).unwrap();
    assert_eq!(rows.len(), 399);
    assert!(config.cache_file.exists());

    let features = derive_features(&rows, config.window_size).unwrap();
    assert_eq!(features.len(), 399 - 20);

    let training = build_windows(&features.rolling_std, config.window_size);
    assert_eq!(training.n_examples(), features.len() - 20);

    let split = split_train_test(&training, config.test_fraction, config.seed);
    assert_eq!(split.n_train() + split.n_test(), training.n_examples());

    let model = LinearModel::fit(&split.train_x, &split.train_y, config.window_size).unwrap();
    assert_eq!(model.coefficients.len(), 20);

    let evaluation = evaluate_model(&model, &split.test_x, &split.test_y).unwrap();
    assert!(evaluation.r_squared.is_finite());
    assert!(evaluation.r_squared <= 1.0);

    write_results(
        &config.output_file,
        &config,
        &model,
        &evaluation,
        split.n_train(),
    )
    .unwrap();
    assert!(config.output_file.exists());

    SavedModel::new(model.clone(), config.clone())
        .save(&config.model_file)
        .unwrap();
    let loaded = SavedModel::load(&config.model_file).unwrap();
    assert_eq!(loaded.model.coefficients, model.coefficients);
}

#[test]
fn test_cache_file_is_reused() {
    let dir = TempDir::new().unwrap();
    let data_file = write_price_file(&dir, "prices.csv", &oscillating_prices(100));
    let config = test_config(&dir, data_file.clone());

    let first = load_or_prepare(&config).unwrap();

    // Replace the raw file; the cache must win (no staleness check).
    std::fs::remove_file(&data_file).unwrap();
    write_price_file(&dir, "prices.csv", &oscillating_prices(50));

    let second = load_or_prepare(&config).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_split_is_deterministic_across_runs() {
    let dir = TempDir::new().unwrap();
    let data_file = write_price_file(&dir, "prices.csv", &oscillating_prices(300));
    let config = test_config(&dir, data_file);

    let rows = load_or_prepare(&config).unwrap();
    let features = derive_features(&rows, config.window_size).unwrap();
    let training = build_windows(&features.rolling_std, config.window_size);

    let a = split_train_test(&training, config.test_fraction, config.seed);
    let b = split_train_test(&training, config.test_fraction, config.seed);

    assert_eq!(a.train_y, b.train_y);
    assert_eq!(a.test_x, b.test_x);
}

#[test]
fn test_constant_price_series() {
    // 1000 identical prices: every tick variation is zero, every rolling std
    // is zero, and the fit degenerates to all-zero coefficients with R^2
    // defined as 0.0 for the zero-variance held-out labels.
    let dir = TempDir::new().unwrap();
    let data_file = write_price_file(&dir, "prices.csv", &vec![2000.0; 1000]);
    let config = test_config(&dir, data_file);

    let rows = load_or_prepare(&config).unwrap();
    assert_eq!(rows.len(), 999);
    assert!(rows.iter().all(|r| r.tick_variation == 0.0));

    let features = derive_features(&rows, config.window_size).unwrap();
    assert!(features.rolling_std.iter().all(|&s| s == 0.0));

    let training = build_windows(&features.rolling_std, config.window_size);
    let split = split_train_test(&training, config.test_fraction, config.seed);

    let model = LinearModel::fit(&split.train_x, &split.train_y, config.window_size).unwrap();
    assert!(model.intercept.abs() < 1e-8);
    for &c in &model.coefficients {
        assert!(c.abs() < 1e-8);
    }

    let evaluation = evaluate_model(&model, &split.test_x, &split.test_y).unwrap();
    assert_eq!(evaluation.r_squared, 0.0);
}

#[test]
fn test_snippet_literals_match_truncated_coefficients() {
    let model = LinearModel {
        coefficients: vec![0.01466934, -0.00054764, 0.0, 0.00809852],
        intercept: 0.002,
        nvars: 4,
    };

    let snippet = stylus_snippet(&model);
    for &coef in &model.coefficients {
        let literal = format!("\"{}\".parse::<I256>().unwrap(),", scaled_coefficient(coef));
        assert!(snippet.contains(&literal));
    }
}

#[test]
fn test_too_few_rows_for_window_fails() {
    let dir = TempDir::new().unwrap();
    let data_file = write_price_file(&dir, "prices.csv", &oscillating_prices(15));
    let config = test_config(&dir, data_file);

    let rows = load_or_prepare(&config).unwrap();
    assert!(derive_features(&rows, config.window_size).is_err());
}
