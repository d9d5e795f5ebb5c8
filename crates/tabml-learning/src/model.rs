//! Model specifications and trained models.
//!
//! A [`ModelSpec`] says what to fit (kind, mode, hyperparameters, formula);
//! [`Trainer::fit`](crate::Trainer::fit) turns it into an immutable
//! [`TrainedModel`]. Re-fitting always builds a new value.

use crate::conversion::feature_matrix;
use crate::error::{LearningError, Result};
use crate::formula::Formula;
use linfa::prelude::*;
use linfa_linear::FittedLinearRegression;
use linfa_trees::DecisionTree;
use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};

/// Model family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModelKind {
    /// Ordinary least squares linear regression.
    Linear,
    /// Bootstrap-aggregated decision trees.
    RandomForest,
}

impl std::fmt::Display for ModelKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Linear => write!(f, "Linear"),
            Self::RandomForest => write!(f, "RandomForest"),
        }
    }
}

/// Prediction task mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mode {
    Classification,
    Regression,
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Classification => write!(f, "Classification"),
            Self::Regression => write!(f, "Regression"),
        }
    }
}

/// Hyperparameters, with conventional defaults for anything unset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hyperparameters {
    /// Number of trees in a random forest. Default: 100
    pub n_trees: usize,
    /// Maximum tree depth; `None` grows trees until pure. Default: None
    pub max_depth: Option<usize>,
    /// Seed for bootstrap sampling. Default: 42
    pub seed: u64,
}

impl Default for Hyperparameters {
    fn default() -> Self {
        Self {
            n_trees: 100,
            max_depth: None,
            seed: 42,
        }
    }
}

impl Hyperparameters {
    pub fn with_n_trees(mut self, n_trees: usize) -> Self {
        self.n_trees = n_trees;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = Some(max_depth);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// Everything needed to fit a model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelSpec {
    pub kind: ModelKind,
    pub mode: Mode,
    pub hyperparameters: Hyperparameters,
    pub formula: Formula,
}

impl ModelSpec {
    /// A spec with default hyperparameters.
    pub fn new(kind: ModelKind, mode: Mode, formula: Formula) -> Self {
        Self {
            kind,
            mode,
            hyperparameters: Hyperparameters::default(),
            formula,
        }
    }

    pub fn with_hyperparameters(mut self, hyperparameters: Hyperparameters) -> Self {
        self.hyperparameters = hyperparameters;
        self
    }

    /// Check that the kind supports the mode.
    ///
    /// The linear model fits regression only; the random forest fits
    /// classification only. Every other pairing is rejected before any
    /// data is touched.
    pub fn validate(&self) -> Result<()> {
        match (self.kind, self.mode) {
            (ModelKind::Linear, Mode::Regression) => Ok(()),
            (ModelKind::RandomForest, Mode::Classification) => Ok(()),
            (kind, mode) => Err(LearningError::UnsupportedMode {
                kind: kind.to_string(),
                mode: mode.to_string(),
            }),
        }
    }
}

/// What `predict` should emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PredictionOutput {
    /// One label (classification) or value (regression) per input row.
    Class,
    /// One probability column per class, classification only.
    Probability,
}

/// Prediction results, one entry per input row in input order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Predictions {
    /// Decoded class labels.
    Labels(Vec<String>),
    /// Regression values.
    Values(Vec<f64>),
    /// Per-class probabilities; `labels` fixes the column order.
    Probabilities {
        labels: Vec<String>,
        rows: Vec<Vec<f64>>,
    },
}

impl Predictions {
    /// Class labels, if this is a label prediction.
    pub fn as_labels(&self) -> Option<&[String]> {
        match self {
            Self::Labels(labels) => Some(labels),
            _ => None,
        }
    }

    /// Regression values, if this is a value prediction.
    pub fn as_values(&self) -> Option<&[f64]> {
        match self {
            Self::Values(values) => Some(values),
            _ => None,
        }
    }
}

/// The fitted backend behind a trained model.
pub(crate) enum Backend {
    Linear(FittedLinearRegression<f64>),
    Forest(Vec<DecisionTree<f64, usize>>),
}

/// Serializable summary of a trained model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelInfo {
    pub kind: ModelKind,
    pub mode: Mode,
    pub features: Vec<String>,
    pub class_labels: Option<Vec<String>>,
}

/// An immutable fitted model.
///
/// Holds the resolved feature list and, for classification, the sorted
/// class vocabulary fixed at fit time.
pub struct TrainedModel {
    pub(crate) kind: ModelKind,
    pub(crate) mode: Mode,
    pub(crate) features: Vec<String>,
    pub(crate) class_labels: Option<Vec<String>>,
    pub(crate) backend: Backend,
}

impl TrainedModel {
    pub fn kind(&self) -> ModelKind {
        self.kind
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Feature columns the model was fitted on, in matrix order.
    pub fn feature_names(&self) -> &[String] {
        &self.features
    }

    /// Sorted class vocabulary (classification only).
    pub fn class_labels(&self) -> Option<&[String]> {
        self.class_labels.as_deref()
    }

    /// Serializable summary of the fitted model.
    pub fn info(&self) -> ModelInfo {
        ModelInfo {
            kind: self.kind,
            mode: self.mode,
            features: self.features.clone(),
            class_labels: self.class_labels.clone(),
        }
    }

    /// Predict for every row of `df`, in input row order.
    ///
    /// The frame must carry every feature column the model was fitted on;
    /// extra columns are ignored. `Probability` output is classification
    /// only and orders its columns by the class vocabulary fixed at fit.
    pub fn predict(&self, df: &DataFrame, output: PredictionOutput) -> Result<Predictions> {
        let x = feature_matrix(df, &self.features)?;

        match &self.backend {
            Backend::Linear(model) => match output {
                PredictionOutput::Class => Ok(Predictions::Values(model.predict(&x).to_vec())),
                PredictionOutput::Probability => Err(LearningError::UnsupportedMode {
                    kind: self.kind.to_string(),
                    mode: "Probability output".to_string(),
                }),
            },
            Backend::Forest(trees) => {
                let labels = self
                    .class_labels
                    .as_ref()
                    .ok_or_else(|| LearningError::InvalidData("missing class labels".to_string()))?;
                let votes = self.count_votes(trees, &x, labels.len());

                match output {
                    PredictionOutput::Class => {
                        // Ties resolve to the earliest label in vocabulary
                        // order, so repeated calls agree.
                        let decoded = votes
                            .iter()
                            .map(|row| {
                                let mut best = 0;
                                for (class, &count) in row.iter().enumerate() {
                                    if count > row[best] {
                                        best = class;
                                    }
                                }
                                labels[best].clone()
                            })
                            .collect();
                        Ok(Predictions::Labels(decoded))
                    }
                    PredictionOutput::Probability => {
                        let n_trees = trees.len() as f64;
                        let rows = votes
                            .iter()
                            .map(|row| row.iter().map(|&count| count as f64 / n_trees).collect())
                            .collect();
                        Ok(Predictions::Probabilities {
                            labels: labels.clone(),
                            rows,
                        })
                    }
                }
            }
        }
    }

    fn count_votes(
        &self,
        trees: &[DecisionTree<f64, usize>],
        x: &ndarray::Array2<f64>,
        n_classes: usize,
    ) -> Vec<Vec<usize>> {
        let mut votes = vec![vec![0usize; n_classes]; x.nrows()];
        for tree in trees {
            let predicted = tree.predict(x);
            for (row, &class) in predicted.iter().enumerate() {
                if class < n_classes {
                    votes[row][class] += 1;
                }
            }
        }
        votes
    }
}
