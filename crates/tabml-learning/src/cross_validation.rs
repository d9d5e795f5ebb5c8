//! K-fold cross-validation.
//!
//! Fold index plans are built once, seeded; each fold then fits its own
//! preprocessing pipeline (when requested) and its own model on its
//! training partition only. Folds run on the rayon pool and collect in
//! fold order.

use crate::conversion::{label_values, numeric_targets};
use crate::error::{LearningError, Result};
use crate::metrics::{MetricsReport, compute_classification, compute_regression};
use crate::model::{Mode, ModelSpec, PredictionOutput, TrainedModel};
use crate::trainer::Trainer;
use polars::prelude::DataFrame;
use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tabml_data::PreprocessConfig;
use tabml_data::group_indices;
use tabml_data::utils::take_rows;
use tracing::{debug, info};

/// Mean and standard deviation of one metric across folds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricSummary {
    pub metric: String,
    pub mean: f64,
    pub std: f64,
}

/// Per-fold reports plus cross-fold aggregates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CvReport {
    pub folds: Vec<MetricsReport>,
    pub aggregates: Vec<MetricSummary>,
}

fn validate_k(k: usize, n_rows: usize) -> Result<()> {
    if k < 2 || k > n_rows {
        return Err(LearningError::InvalidData(format!(
            "k must be between 2 and the row count ({}); got {}",
            n_rows, k
        )));
    }
    Ok(())
}

/// Partition `0..n_rows` into `k` validation index sets of near-equal size.
///
/// Every row lands in exactly one set; the shuffle is deterministic per
/// seed.
pub fn k_fold(n_rows: usize, k: usize, seed: u64) -> Result<Vec<Vec<usize>>> {
    validate_k(k, n_rows)?;

    let mut indices: Vec<usize> = (0..n_rows).collect();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let base = n_rows / k;
    let extra = n_rows % k;
    let mut folds = Vec::with_capacity(k);
    let mut start = 0;
    for fold in 0..k {
        let size = base + usize::from(fold < extra);
        folds.push(indices[start..start + size].to_vec());
        start += size;
    }
    Ok(folds)
}

/// Like [`k_fold`], but rows of each category of `stratify_by` are dealt
/// round-robin across folds so every fold sees roughly the same class mix.
pub fn stratified_k_fold(
    df: &DataFrame,
    stratify_by: &str,
    k: usize,
    seed: u64,
) -> Result<Vec<Vec<usize>>> {
    validate_k(k, df.height())?;

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut folds: Vec<Vec<usize>> = vec![Vec::new(); k];
    for (_, mut indices) in group_indices(df, stratify_by)? {
        indices.shuffle(&mut rng);
        for (position, row) in indices.into_iter().enumerate() {
            folds[position % k].push(row);
        }
    }
    Ok(folds)
}

/// Run k-fold cross-validation of `spec` over `df`.
///
/// Each fold trains on the other k-1 folds (preprocessed by a pipeline
/// fitted on that training partition alone, when `preprocess` is given)
/// and evaluates on its own validation rows. Returns the k fold reports in
/// fold order plus mean/std aggregates per metric.
pub fn cross_validate(
    spec: &ModelSpec,
    preprocess: Option<&PreprocessConfig>,
    df: &DataFrame,
    k: usize,
    stratify_by: Option<&str>,
    seed: u64,
) -> Result<CvReport> {
    spec.validate()?;
    let n = df.height();
    let folds = match stratify_by {
        Some(column) => stratified_k_fold(df, column, k, seed)?,
        None => k_fold(n, k, seed)?,
    };

    info!(
        "Cross-validating {} ({}) with k={} over {} rows",
        spec.kind, spec.mode, k, n
    );

    let reports: Vec<MetricsReport> = folds
        .par_iter()
        .enumerate()
        .map(|(fold, validation)| {
            let mut in_validation = vec![false; n];
            for &row in validation {
                in_validation[row] = true;
            }
            let train_rows: Vec<usize> = (0..n).filter(|&row| !in_validation[row]).collect();

            let train = take_rows(df, &train_rows)?;
            let val = take_rows(df, validation)?;

            let resolved = spec.formula.resolve(&train)?;
            let (train, val) = match preprocess {
                Some(config) => {
                    let fitted = tabml_data::Preprocessor::new(config.clone())
                        .fit(&train, &resolved.features)?;
                    (fitted.transform(&train)?, fitted.transform(&val)?)
                }
                None => (train, val),
            };

            let model = Trainer::fit(spec, &train)?;
            let report = evaluate_fold(spec.mode, &model, &val, &resolved.target)?;
            debug!("Fold {}: {} validation rows", fold, validation.len());
            Ok(report)
        })
        .collect::<Result<_>>()?;

    let aggregates = aggregate(&reports);
    Ok(CvReport {
        folds: reports,
        aggregates,
    })
}

fn evaluate_fold(
    mode: Mode,
    model: &TrainedModel,
    val: &DataFrame,
    target: &str,
) -> Result<MetricsReport> {
    match mode {
        Mode::Regression => {
            let truth = numeric_targets(val, target)?.to_vec();
            let predictions = model.predict(val, PredictionOutput::Class)?;
            let values = predictions
                .as_values()
                .ok_or_else(|| LearningError::InvalidData("expected value predictions".to_string()))?;
            compute_regression(&truth, values)
        }
        Mode::Classification => {
            let truth = label_values(val, target)?;
            let predictions = model.predict(val, PredictionOutput::Class)?;
            let labels = predictions
                .as_labels()
                .ok_or_else(|| LearningError::InvalidData("expected label predictions".to_string()))?;
            compute_classification(&truth, labels)
        }
    }
}

/// Mean and sample standard deviation per metric, over the folds where the
/// metric is present, in first-appearance order.
fn aggregate(folds: &[MetricsReport]) -> Vec<MetricSummary> {
    let mut names: Vec<String> = Vec::new();
    for fold in folds {
        for (name, _) in fold.named_values() {
            if !names.contains(&name) {
                names.push(name);
            }
        }
    }

    names
        .into_iter()
        .map(|metric| {
            let values: Vec<f64> = folds
                .iter()
                .flat_map(|fold| {
                    fold.named_values()
                        .into_iter()
                        .filter(|(name, _)| *name == metric)
                        .map(|(_, value)| value)
                })
                .collect();
            let n = values.len() as f64;
            let mean = values.iter().sum::<f64>() / n;
            let std = if values.len() > 1 {
                (values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0)).sqrt()
            } else {
                0.0
            };
            MetricSummary { metric, mean, std }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formula::Formula;
    use crate::model::{Hyperparameters, ModelKind};
    use polars::prelude::*;

    #[test]
    fn test_k_fold_covers_every_row_once() {
        let folds = k_fold(23, 5, 42).unwrap();
        assert_eq!(folds.len(), 5);

        let sizes: Vec<usize> = folds.iter().map(|f| f.len()).collect();
        assert_eq!(sizes, vec![5, 5, 5, 4, 4]);

        let mut all: Vec<usize> = folds.into_iter().flatten().collect();
        all.sort_unstable();
        assert_eq!(all, (0..23).collect::<Vec<usize>>());
    }

    #[test]
    fn test_k_fold_deterministic_per_seed() {
        assert_eq!(k_fold(30, 3, 7).unwrap(), k_fold(30, 3, 7).unwrap());
        assert_ne!(k_fold(30, 3, 7).unwrap(), k_fold(30, 3, 8).unwrap());
    }

    #[test]
    fn test_invalid_k_rejected() {
        assert!(k_fold(10, 1, 0).is_err());
        assert!(k_fold(10, 11, 0).is_err());
        assert!(k_fold(10, 10, 0).is_ok());
    }

    #[test]
    fn test_stratified_folds_balance_classes() {
        let labels: Vec<String> = (0..30)
            .map(|i| if i < 20 { "a" } else { "b" }.to_string())
            .collect();
        let ids: Vec<i64> = (0..30).collect();
        let df = df!["id" => ids, "label" => labels].unwrap();

        let folds = stratified_k_fold(&df, "label", 5, 3).unwrap();
        assert_eq!(folds.len(), 5);
        for fold in &folds {
            let a = fold.iter().filter(|&&row| row < 20).count();
            let b = fold.len() - a;
            assert_eq!(a, 4);
            assert_eq!(b, 2);
        }

        let mut all: Vec<usize> = folds.into_iter().flatten().collect();
        all.sort_unstable();
        assert_eq!(all, (0..30).collect::<Vec<usize>>());
    }

    #[test]
    fn test_cross_validate_regression_fold_count_and_aggregates() {
        // Noisy-ish line: exact fit is impossible, so fold RMSEs vary.
        let x: Vec<f64> = (0..40).map(|i| i as f64).collect();
        let y: Vec<f64> = x
            .iter()
            .enumerate()
            .map(|(i, v)| 2.0 * v + ((i * 13) % 7) as f64)
            .collect();
        let df = df!["x" => x, "y" => y].unwrap();

        let spec = ModelSpec::new(ModelKind::Linear, Mode::Regression, Formula::new("y", ["x"]));
        let report = cross_validate(&spec, None, &df, 5, None, 42).unwrap();

        assert_eq!(report.folds.len(), 5);
        let rmse = report
            .aggregates
            .iter()
            .find(|s| s.metric == "rmse")
            .unwrap();
        let fold_rmses: Vec<f64> = report.folds.iter().map(|f| f.rmse.unwrap()).collect();
        let min = fold_rmses.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = fold_rmses.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        assert!(rmse.mean >= min && rmse.mean <= max);
        assert!(rmse.std >= 0.0);
    }

    #[test]
    fn test_cross_validate_classification_stratified() {
        let mut a = Vec::new();
        let mut label = Vec::new();
        for i in 0..20 {
            a.push(i as f64 * 0.1);
            label.push("low".to_string());
        }
        for i in 0..20 {
            a.push(5.0 + i as f64 * 0.1);
            label.push("high".to_string());
        }
        let df = df!["a" => a, "label" => label].unwrap();

        let spec = ModelSpec::new(
            ModelKind::RandomForest,
            Mode::Classification,
            Formula::new("label", ["a"]),
        )
        .with_hyperparameters(Hyperparameters::default().with_n_trees(10));

        let report = cross_validate(&spec, None, &df, 4, Some("label"), 1).unwrap();
        assert_eq!(report.folds.len(), 4);
        for fold in &report.folds {
            assert!(fold.accuracy.unwrap() > 0.8);
        }
        assert!(report.aggregates.iter().any(|s| s.metric == "accuracy"));
    }

    #[test]
    fn test_cross_validate_deterministic() {
        let x: Vec<f64> = (0..30).map(|i| i as f64).collect();
        let y: Vec<f64> = x.iter().map(|v| v * 1.5 + 1.0).collect();
        let df = df!["x" => x, "y" => y].unwrap();
        let spec = ModelSpec::new(ModelKind::Linear, Mode::Regression, Formula::new("y", ["x"]));

        let a = cross_validate(&spec, None, &df, 3, None, 9).unwrap();
        let b = cross_validate(&spec, None, &df, 3, None, 9).unwrap();
        for (fa, fb) in a.folds.iter().zip(&b.folds) {
            assert_eq!(fa.rmse, fb.rmse);
        }
    }
}
