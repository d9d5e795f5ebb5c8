//! Tabular Data Layer
//!
//! Dataset loading, seeded train/test splitting, and a fitted preprocessing
//! pipeline built on Polars.
//!
//! # Overview
//!
//! This library provides the data side of a tabular modeling workflow:
//!
//! - **Sources**: CSV loading with schema inference, plus one-time download
//!   with a local cache
//! - **Splitting**: Seeded random train/test partitions, with optional
//!   stratification by a category column
//! - **Preprocessing**: Correlation filter, centering, and scaling fitted on
//!   training data only and replayed on any compatible frame
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use tabml_data::{load_csv, train_test_split, Preprocessor, PreprocessConfig};
//!
//! let df = load_csv("penguins.csv")?;
//! let split = train_test_split(&df, 0.75, 42)?;
//!
//! let features: Vec<String> = vec!["bill_length_mm".into(), "bill_depth_mm".into()];
//! let fitted = Preprocessor::with_defaults().fit(&split.train, &features)?;
//!
//! let train = fitted.transform(&split.train)?;
//! let test = fitted.transform(&split.test)?;
//! ```
//!
//! Fitted parameters come exclusively from the training frame; transforming
//! the test frame replays them without recomputation.

pub mod config;
pub mod error;
pub mod pipeline;
pub mod source;
pub mod split;
pub mod utils;

// Re-exports for convenient access
pub use config::{
    ConfigValidationError, CorrelationScope, PreprocessConfig, PreprocessConfigBuilder,
};
pub use error::{DataError, Result as DataResult};
pub use pipeline::{ColumnStats, FittedPipeline, Preprocessor};
pub use source::{fetch_csv, load_csv};
pub use split::{
    DEFAULT_TRAIN_FRACTION, Split, group_indices, stratified_split, train_test_split,
};
pub use utils::{column_as_f64, is_numeric_dtype, numeric_column_names};
