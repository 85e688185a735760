use anyhow::{Context, Result};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for volatility model generation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to raw market data file (delimited, with date/time/close columns)
    pub data_file: PathBuf,

    /// Path to the prepared dataset cache file
    #[serde(default = "default_cache_file")]
    pub cache_file: PathBuf,

    /// Path to output results file
    #[serde(default = "default_output_file")]
    pub output_file: PathBuf,

    /// Path to the saved model file
    #[serde(default = "default_model_file")]
    pub model_file: PathBuf,

    /// Rolling statistic and prediction window size
    #[serde(default = "default_window_size")]
    pub window_size: usize,

    /// Fraction of examples held out for testing
    #[serde(default = "default_test_fraction")]
    pub test_fraction: f64,

    /// Seed for the train/test shuffle
    #[serde(default = "default_seed")]
    pub seed: u64,
}

fn default_cache_file() -> PathBuf {
    PathBuf::from("data.csv")
}

fn default_output_file() -> PathBuf {
    PathBuf::from("VOL_MODEL.LOG")
}

fn default_model_file() -> PathBuf {
    PathBuf::from("vol_model.json")
}

fn default_window_size() -> usize {
    20
}

fn default_test_fraction() -> f64 {
    0.2
}

fn default_seed() -> u64 {
    42
}

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(name = "tick_vol_model")]
#[command(about = "Next-step tick volatility model generator for fixed-point contracts")]
pub struct Args {
    /// Path to TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Raw market data file
    #[arg(value_name = "DATA_FILE")]
    pub data_file: Option<PathBuf>,

    /// Prepared dataset cache file
    #[arg(long)]
    pub cache_file: Option<PathBuf>,

    /// Results file
    #[arg(long)]
    pub output_file: Option<PathBuf>,

    /// Saved model file
    #[arg(long)]
    pub model_file: Option<PathBuf>,

    /// Rolling statistic and prediction window size
    #[arg(long)]
    pub window_size: Option<usize>,

    /// Fraction of examples held out for testing
    #[arg(long)]
    pub test_fraction: Option<f64>,

    /// Seed for the train/test shuffle
    #[arg(long)]
    pub seed: Option<u64>,
}

impl Config {
    /// Load configuration from TOML file
    pub fn from_file(path: &PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        config.validate()?;
        Ok(config)
    }

    /// Create configuration from command-line arguments
    pub fn from_args(args: &Args) -> Result<Self> {
        let config = Config {
            data_file: args
                .data_file
                .clone()
                .ok_or_else(|| anyhow::anyhow!("data_file is required"))?,
            cache_file: args.cache_file.clone().unwrap_or_else(default_cache_file),
            output_file: args.output_file.clone().unwrap_or_else(default_output_file),
            model_file: args.model_file.clone().unwrap_or_else(default_model_file),
            window_size: args.window_size.unwrap_or_else(default_window_size),
            test_fraction: args.test_fraction.unwrap_or_else(default_test_fraction),
            seed: args.seed.unwrap_or_else(default_seed),
        };

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from either file or command-line arguments
    pub fn load() -> Result<Self> {
        let args = Args::parse();

        if let Some(config_path) = &args.config {
            Self::from_file(config_path)
        } else {
            Self::from_args(&args)
        }
    }

    /// Validate configuration parameters
    pub fn validate(&self) -> Result<()> {
        if self.window_size < 2 {
            anyhow::bail!("window_size must be at least 2, got {}", self.window_size);
        }

        if self.test_fraction <= 0.0 || self.test_fraction >= 1.0 {
            anyhow::bail!(
                "test_fraction must be in range (0, 1), got {}",
                self.test_fraction
            );
        }

        Ok(())
    }
}
