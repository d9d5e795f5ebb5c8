//! Tabular Learning Layer
//!
//! Model training, prediction, evaluation, and cross-validation over
//! Polars DataFrames, with the numerical fitting delegated to linfa.
//!
//! # Overview
//!
//! - **Formulas**: name the target and feature columns, resolved against a
//!   concrete schema once at fit time
//! - **Models**: ordinary least squares regression (`linfa-linear`) and a
//!   seeded bootstrap forest of decision trees (`linfa-trees`)
//! - **Metrics**: accuracy and per-class precision/recall/F1, RMSE/MAE/R²,
//!   ROC and cumulative gain curves as plain ordered points
//! - **Cross-validation**: seeded k-fold plans (plain or stratified); each
//!   fold fits its own pipeline and model
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use tabml_learning::{Formula, ModelKind, ModelSpec, Mode, PredictionOutput, Trainer};
//!
//! let spec = ModelSpec::new(
//!     ModelKind::RandomForest,
//!     Mode::Classification,
//!     Formula::new("species", ["petal_length", "petal_width"]),
//! );
//! let model = Trainer::fit(&spec, &train)?;
//! let predicted = model.predict(&test, PredictionOutput::Class)?;
//! ```
//!
//! Trained models are immutable; fitting again produces a new value.

pub mod conversion;
pub mod cross_validation;
pub mod error;
pub mod formula;
pub mod metrics;
pub mod model;
pub mod trainer;

// Re-exports for convenient access
pub use cross_validation::{CvReport, MetricSummary, cross_validate, k_fold, stratified_k_fold};
pub use error::{LearningError, Result as LearningResult};
pub use formula::{FeatureSpec, Formula, ResolvedFormula};
pub use metrics::{
    ClassMetrics, CurvePoint, MetricsReport, compute_classification, compute_regression,
    gain_curve, roc_curve,
};
pub use model::{
    Hyperparameters, Mode, ModelInfo, ModelKind, ModelSpec, PredictionOutput, Predictions,
    TrainedModel,
};
pub use trainer::Trainer;
