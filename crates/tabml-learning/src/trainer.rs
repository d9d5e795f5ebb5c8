//! Model fitting.
//!
//! Translates a DataFrame into ndarray matrices and delegates the numerical
//! fitting: ordinary least squares for the linear model, a seeded bootstrap
//! ensemble of decision trees for the random forest.

use crate::conversion::{class_targets, feature_matrix, numeric_targets};
use crate::error::{LearningError, Result};
use crate::model::{Backend, Mode, ModelKind, ModelSpec, TrainedModel};
use linfa::prelude::*;
use linfa_linear::LinearRegression;
use linfa_trees::{DecisionTree, SplitQuality};
use ndarray::{Array1, Array2, Axis};
use polars::prelude::DataFrame;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use tracing::info;

/// Fits [`ModelSpec`]s into [`TrainedModel`]s.
pub struct Trainer;

impl Trainer {
    /// Fit `spec` on `df`.
    ///
    /// The kind/mode pairing and the formula are validated before any
    /// numerical work; on failure nothing is produced.
    pub fn fit(spec: &ModelSpec, df: &DataFrame) -> Result<TrainedModel> {
        spec.validate()?;
        let resolved = spec.formula.resolve(df)?;
        let x = feature_matrix(df, &resolved.features)?;

        info!(
            "Fitting {} ({}) on {} rows x {} features, target '{}'",
            spec.kind,
            spec.mode,
            x.nrows(),
            x.ncols(),
            resolved.target
        );

        match (spec.kind, spec.mode) {
            (ModelKind::Linear, Mode::Regression) => {
                let y = numeric_targets(df, &resolved.target)?;
                let dataset = Dataset::new(x, y);
                let model = LinearRegression::default()
                    .fit(&dataset)
                    .map_err(|e| LearningError::Backend(e.to_string()))?;
                Ok(TrainedModel {
                    kind: spec.kind,
                    mode: spec.mode,
                    features: resolved.features,
                    class_labels: None,
                    backend: Backend::Linear(model),
                })
            }
            (ModelKind::RandomForest, Mode::Classification) => {
                let (y, labels) = class_targets(df, &resolved.target)?;
                let trees = fit_forest(&x, &y, &spec.hyperparameters)?;
                Ok(TrainedModel {
                    kind: spec.kind,
                    mode: spec.mode,
                    features: resolved.features,
                    class_labels: Some(labels),
                    backend: Backend::Forest(trees),
                })
            }
            // validate() rejected everything else already
            (kind, mode) => Err(LearningError::UnsupportedMode {
                kind: kind.to_string(),
                mode: mode.to_string(),
            }),
        }
    }
}

/// Fit `n_trees` decision trees on bootstrap resamples of the training
/// data.
///
/// Each tree draws its own resample from a ChaCha8 stream seeded with
/// `seed + tree_index`, so the ensemble is reproducible regardless of how
/// the rayon pool schedules the fits.
fn fit_forest(
    x: &Array2<f64>,
    y: &Array1<usize>,
    hp: &crate::model::Hyperparameters,
) -> Result<Vec<DecisionTree<f64, usize>>> {
    let n = x.nrows();
    if n == 0 {
        return Err(LearningError::InvalidData(
            "cannot fit a forest on zero rows".to_string(),
        ));
    }

    (0..hp.n_trees)
        .into_par_iter()
        .map(|tree_index| {
            let mut rng = ChaCha8Rng::seed_from_u64(hp.seed.wrapping_add(tree_index as u64));
            let indices: Vec<usize> = (0..n).map(|_| rng.gen_range(0..n)).collect();

            let x_boot = x.select(Axis(0), &indices);
            let y_boot = y.select(Axis(0), &indices);
            let dataset = Dataset::new(x_boot, y_boot);

            DecisionTree::params()
                .split_quality(SplitQuality::Gini)
                .max_depth(hp.max_depth)
                .fit(&dataset)
                .map_err(|e| LearningError::Backend(e.to_string()))
        })
        .collect()
}
