use anyhow::Result;
use tick_vol_model::features::FIXED_POINT_SCALE;
use tick_vol_model::*;

fn main() -> Result<()> {
    println!("TICK_VOL_MODEL - Next-Step Volatility Regression\n");

    // Load configuration
    let config = Config::load()?;

    // Load the prepared dataset, building the cache file on the first run
    let rows = load_or_prepare(&config).map_err(|e| anyhow::anyhow!("{}", e))?;
    println!("Loaded {} prepared rows", rows.len());

    // Preview the head of the dataset
    println!();
    println!(
        "{:<10} {:<20} {:>12} {:>10} {:>16}",
        "date", "datetime", "close", "tick", "tick_variation"
    );
    for row in rows.iter().take(5) {
        println!(
            "{:<10} {:<20} {:>12.4} {:>10} {:>16.9}",
            row.date,
            row.datetime.to_string(),
            row.close,
            row.tick,
            row.tick_variation
        );
    }
    println!();

    // Derive the volatility feature set
    let features = derive_features(&rows, config.window_size)?;
    println!("Cleaned feature rows: {}", features.len());

    // Build the sliding-window training dataset over the rolling std
    let training = build_windows(&features.rolling_std, config.window_size);
    if training.n_examples() == 0 {
        anyhow::bail!(
            "Insufficient data: {} feature rows cannot fill a window of {}",
            features.len(),
            config.window_size
        );
    }
    println!(
        "Shape of X: ({}, {})",
        training.n_examples(),
        config.window_size
    );
    println!("Shape of y: ({},)", training.n_examples());

    // Split into training and held-out partitions
    let split = split_train_test(&training, config.test_fraction, config.seed);
    println!("Training cases: {}", split.n_train());
    println!("Test cases: {}", split.n_test());

    // Fit ordinary least squares on the training partition
    let model = LinearModel::fit(&split.train_x, &split.train_y, config.window_size)?;

    // Evaluate on the held-out partition
    let evaluation = evaluate_model(&model, &split.test_x, &split.test_y)?;

    // Write the summary report
    write_results(
        &config.output_file,
        &config,
        &model,
        &evaluation,
        split.n_train(),
    )?;

    // Emit the contract snippet with the fixed-point coefficient literals
    println!("{}", stylus_snippet(&model));
    println!();

    // Save the fitted model for later re-emission without refitting
    SavedModel::new(model.clone(), config.clone()).save(&config.model_file)?;

    // Prediction demo: one training example through the float coefficients,
    // then through the truncated fixed-point coefficients, showing the
    // precision the integer encoding gives up.
    let sample_idx = split.n_train().min(20_000) - 1;
    let sample = split.train_example(sample_idx);

    let float_pred = model.predict(sample)?;
    println!("Sample prediction (float coefficients):       {:.9}", float_pred);

    let scaled = scaled_coefficients(&model);
    let fixed_dot: f64 = scaled
        .iter()
        .zip(sample.iter())
        .map(|(&c, &v)| c as f64 * v)
        .sum();
    let fixed_pred = model.intercept + fixed_dot / FIXED_POINT_SCALE;
    println!("Sample prediction (fixed-point coefficients): {:.9}", fixed_pred);

    Ok(())
}
