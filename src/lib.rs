pub mod codegen;
pub mod config;
pub mod data;
pub mod dataset;
pub mod evaluation;
pub mod features;
pub mod model;
pub mod model_io;
pub mod tick;

pub use codegen::{scaled_coefficients, stylus_snippet};
pub use config::Config;
pub use data::{load_or_prepare, prepare_dataset, read_raw_file, PreparedRow};
pub use dataset::{build_windows, split_train_test, SplitData, TrainingData};
pub use evaluation::{evaluate_model, r_squared, write_results, EvaluationResult};
pub use features::{derive_features, FeatureTable};
pub use model::LinearModel;
pub use model_io::SavedModel;
pub use tick::{price_to_tick, tick_variation};
